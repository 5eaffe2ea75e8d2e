use std::borrow::Cow;
use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{GauntletConfig, GridPoint};
use crate::input::{AnswerKey, RunLog};
use crate::model::alignment::Alignment;
use crate::model::cluster::ScoredCluster;
use crate::model::gold::GoldEntity;
use crate::model::tally::{EvaluationTally, Prf, Tier};
use crate::pipeline::stage1_align::align_clusters;
use crate::pipeline::stage2_interpolate::interpolate;
use crate::pipeline::stage3_select::{SelectionParams, select_candidates};
use crate::pipeline::stage5_evaluate::accumulate_document;

#[derive(Debug, Clone)]
pub struct GauntletInputs<'a> {
    pub log: &'a RunLog,
    pub key: &'a AnswerKey,
    pub config: &'a GauntletConfig,
}

/// Best candidate for one template type at one grid point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeReport {
    pub template_type: String,
    pub best_id: Option<i64>,
    pub correct: usize,
    pub incorrect: usize,
    pub missed: usize,
    pub no_gold_guesses: usize,
    pub unevaluated_gold: usize,
    pub strict: Prf,
    pub all_guessed: Prf,
    pub full_domain: Prf,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridReport {
    pub point: GridPoint,
    pub documents: usize,
    pub candidates: usize,
    pub flagged: usize,
    pub suppressed: usize,
    pub types: Vec<TypeReport>,
}

/// Gold entities per story and template type, built once per run.
type GoldIndex = BTreeMap<String, BTreeMap<String, Vec<GoldEntity>>>;

/// Read-only state shared by every grid point.
struct Prepared {
    alignment: Alignment,
    gold: GoldIndex,
    totals: BTreeMap<String, usize>,
}

/// Brute-force sweep over the configured grid. Grid points share no mutable
/// state, so they may run in parallel; reports always come back in grid
/// order.
pub fn run_gauntlet(inputs: &GauntletInputs<'_>) -> Vec<GridReport> {
    let prepared = prepare(inputs);
    let grid = inputs.config.grid();
    info!(
        grid_points = grid.len(),
        stories = inputs.log.stories.len(),
        parallel = inputs.config.parallel,
        "starting gauntlet"
    );

    if inputs.config.parallel {
        grid.par_iter()
            .map(|point| evaluate_grid_point(inputs, &prepared, point))
            .collect()
    } else {
        grid.iter()
            .map(|point| evaluate_grid_point(inputs, &prepared, point))
            .collect()
    }
}

fn prepare(inputs: &GauntletInputs<'_>) -> Prepared {
    let config = inputs.config;
    let alignment = if config.lambdas.is_empty() {
        Alignment::default()
    } else {
        let alignment = align_clusters(&inputs.log.clusters, &inputs.log.topics);
        info!(
            mapped = alignment.mapped().len(),
            unclaimed_topics = alignment.unclaimed_topics().len(),
            "aligned cluster inventory to topics"
        );
        alignment
    };

    if inputs.key.is_empty() {
        warn!("answer key has no templates; every guess counts as a no-gold guess");
    }
    let mut gold = GoldIndex::new();
    for story in &inputs.log.stories {
        if inputs.key.get_templates(&story.key).is_none() {
            debug!(story = %story.key, "story has no answer-key entry");
        }
        let by_type = config
            .template_types
            .iter()
            .map(|t| {
                (
                    t.clone(),
                    inputs.key.gold_entities(&story.key, t, &config.slots),
                )
            })
            .collect();
        gold.insert(story.key.clone(), by_type);
    }

    let totals = inputs.key.total_gold(&config.template_types, &config.slots);
    Prepared {
        alignment,
        gold,
        totals,
    }
}

fn evaluate_grid_point(
    inputs: &GauntletInputs<'_>,
    prepared: &Prepared,
    point: &GridPoint,
) -> GridReport {
    let config = inputs.config;
    let params = SelectionParams {
        top_doc: point.top_doc,
        top_sent: point.top_sent,
        cutoff: point.cutoff,
    };
    let mut tally = EvaluationTally::new(prepared.totals.clone());

    for story in &inputs.log.stories {
        let doc: Cow<'_, [ScoredCluster]> = match point.lambda {
            Some(lambda) => Cow::Owned(interpolate(
                &story.doc,
                &story.topics,
                lambda,
                &prepared.alignment,
            )),
            None => Cow::Borrowed(story.doc.as_slice()),
        };
        let candidates = select_candidates(&doc, &story.sent, &params);
        let gold = prepared.gold.get(&story.key);

        for candidate in &candidates {
            let guesses = story.guesses_for(candidate.id());
            // A guess counts once towards the review counters however many
            // types it was scored under.
            let mut flagged = vec![false; guesses.len()];
            let mut suppressed = vec![false; guesses.len()];
            for template_type in &config.template_types {
                let entities = gold
                    .and_then(|g| g.get(template_type))
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                let Some(score) =
                    accumulate_document(&mut tally, candidate.id(), template_type, entities, guesses)
                else {
                    continue;
                };
                for (gi, f) in score.guess_flagged.iter().enumerate() {
                    flagged[gi] |= *f;
                }
                for (gi, s) in score.guess_suppressed.iter().enumerate() {
                    suppressed[gi] |= *s;
                }
            }
            tally.flagged += flagged.iter().filter(|&&f| f).count();
            tally.suppressed += suppressed.iter().filter(|&&s| s).count();
        }
    }

    if tally.flagged > 0 {
        warn!(
            grid_point = point.index,
            flagged = tally.flagged,
            "guesses only matched gold after \"of \"; review by hand"
        );
    }

    let types = config
        .template_types
        .iter()
        .map(|t| type_report(&tally, t, config.rank_tier))
        .collect();

    info!(
        grid_point = point.index,
        top_doc = point.top_doc,
        top_sent = point.top_sent,
        cutoff = ?point.cutoff,
        lambda = ?point.lambda,
        "grid point evaluated"
    );

    GridReport {
        point: *point,
        documents: inputs.log.stories.len(),
        candidates: tally.candidates().len(),
        flagged: tally.flagged,
        suppressed: tally.suppressed,
        types,
    }
}

fn type_report(tally: &EvaluationTally, template_type: &str, rank_tier: Tier) -> TypeReport {
    let total = tally.total_gold(template_type);
    let Some((best_id, counts)) = tally.best_for_type(template_type, rank_tier) else {
        return TypeReport {
            template_type: template_type.to_string(),
            best_id: None,
            correct: 0,
            incorrect: 0,
            missed: 0,
            no_gold_guesses: 0,
            unevaluated_gold: total,
            strict: Prf::default(),
            all_guessed: Prf::default(),
            full_domain: Prf::default(),
        };
    };
    TypeReport {
        template_type: template_type.to_string(),
        best_id: Some(best_id),
        correct: counts.correct,
        incorrect: counts.incorrect,
        missed: counts.missed,
        no_gold_guesses: counts.no_gold_guesses,
        unevaluated_gold: total.saturating_sub(counts.evaluated_gold),
        strict: counts.tier(Tier::Strict, total),
        all_guessed: counts.tier(Tier::AllGuessed, total),
        full_domain: counts.tier(Tier::FullDomain, total),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage6_gauntlet.rs"]
mod tests;
