use tracing::debug;

use crate::model::gold::GoldEntity;
use crate::model::tally::EvaluationTally;
use crate::pipeline::stage4_match::{MatchVerdict, match_gold, similar};

/// Outcome of scoring one document's guesses against its gold entities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentScore {
    pub correct: usize,
    pub incorrect: usize,
    pub missed: usize,
    pub guess_matched: Vec<bool>,
    pub gold_matched: Vec<bool>,
    /// Unmatched guesses that only hit the "of " exclusion.
    pub flagged: usize,
    /// Wrong guesses dropped as near-duplicates of an earlier wrong guess.
    pub suppressed: usize,
    pub guess_flagged: Vec<bool>,
    pub guess_suppressed: Vec<bool>,
}

/// Scores `guesses` against de-duplicated `gold`. Every guess is tried
/// against every entity, so one guess can satisfy several entities and one
/// entity several guesses; each entity counts once towards `correct`.
pub fn score_document(gold: &[GoldEntity], guesses: &[String]) -> DocumentScore {
    let mut guess_matched = vec![false; guesses.len()];
    let mut gold_matched = vec![false; gold.len()];
    let mut of_prefixed = vec![false; guesses.len()];

    for (gi, guess) in guesses.iter().enumerate() {
        for (ei, entity) in gold.iter().enumerate() {
            match match_gold(entity, guess) {
                MatchVerdict::Matched(rule) => {
                    guess_matched[gi] = true;
                    gold_matched[ei] = true;
                    debug!(guess = %guess, mentions = ?entity.mentions, ?rule, "guess matched");
                }
                MatchVerdict::OfPrefixed => of_prefixed[gi] = true,
                MatchVerdict::NoMatch => {}
            }
        }
    }

    let correct = gold_matched.iter().filter(|&&m| m).count();
    let missed = gold
        .iter()
        .zip(&gold_matched)
        .filter(|(entity, matched)| !**matched && !entity.optional)
        .count();

    let mut wrong: Vec<&str> = Vec::new();
    let mut guess_flagged = vec![false; guesses.len()];
    let mut guess_suppressed = vec![false; guesses.len()];
    for (gi, guess) in guesses.iter().enumerate() {
        if guess_matched[gi] {
            continue;
        }
        if of_prefixed[gi] {
            guess_flagged[gi] = true;
            debug!(guess = %guess, "guess only matched after \"of \"; left for manual review");
        }
        if wrong.iter().any(|earlier| similar(earlier, guess)) {
            guess_suppressed[gi] = true;
        }
        wrong.push(guess);
    }
    let flagged = guess_flagged.iter().filter(|&&f| f).count();
    let suppressed = guess_suppressed.iter().filter(|&&s| s).count();

    DocumentScore {
        correct,
        incorrect: wrong.len() - suppressed,
        missed,
        guess_matched,
        gold_matched,
        flagged,
        suppressed,
        guess_flagged,
        guess_suppressed,
    }
}

/// Folds one document into the tally for `(candidate, template_type)`.
/// With no gold for the type the guesses only count as volume against
/// precision. Review counters (`flagged`, `suppressed`) are left to the
/// caller, which sees every type a guess was scored under.
pub fn accumulate_document(
    tally: &mut EvaluationTally,
    candidate: i64,
    template_type: &str,
    gold: &[GoldEntity],
    guesses: &[String],
) -> Option<DocumentScore> {
    if gold.is_empty() {
        tally.entry(candidate, template_type).no_gold_guesses += guesses.len();
        return None;
    }

    let score = score_document(gold, guesses);
    let evaluated_gold = gold.iter().filter(|e| !e.optional).count();
    let counts = tally.entry(candidate, template_type);
    counts.correct += score.correct;
    counts.incorrect += score.incorrect;
    counts.missed += score.missed;
    counts.evaluated_gold += evaluated_gold;
    Some(score)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage5_evaluate.rs"]
mod tests;
