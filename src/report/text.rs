use std::fmt::Write;

use crate::model::alignment::Alignment;
use crate::model::cluster::{ScoredCluster, index_by_id};
use crate::pipeline::stage6_gauntlet::GridReport;
use crate::report::{format_f64_4, format_id, format_opt_f64, format_prf};

/// One block per grid point. The best cluster of each type is described by
/// its top `max_tokens` inventory tokens when the inventory has it.
pub fn render_gauntlet_text(
    reports: &[GridReport],
    inventory: &[ScoredCluster],
    max_tokens: usize,
) -> String {
    let by_id = index_by_id(inventory);
    let mut out = String::new();
    out.push_str("Template Gauntlet Report\n");
    out.push_str("========================\n");

    for report in reports {
        let p = &report.point;
        let _ = writeln!(
            out,
            "\n[{}] top_doc={} top_sent={} cutoff={} lambda={}",
            p.index,
            p.top_doc,
            p.top_sent,
            format_opt_f64(p.cutoff),
            format_opt_f64(p.lambda)
        );
        let _ = writeln!(
            out,
            "documents={} candidates={} flagged={} suppressed={}",
            report.documents, report.candidates, report.flagged, report.suppressed
        );
        out.push_str(
            "type\tbest\tc/i/m\tno_gold\tunseen_gold\tstrict\tall_guessed\tfull_domain\ttokens\n",
        );
        for t in &report.types {
            let tokens = t
                .best_id
                .and_then(|id| by_id.get(&id))
                .map(|c| {
                    c.tokens_by_score()
                        .iter()
                        .take(max_tokens)
                        .map(String::as_str)
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "{}\t{}\t{}/{}/{}\t{}\t{}\t{}\t{}\t{}\t{}",
                t.template_type,
                format_id(t.best_id),
                t.correct,
                t.incorrect,
                t.missed,
                t.no_gold_guesses,
                t.unevaluated_gold,
                format_prf(&t.strict),
                format_prf(&t.all_guessed),
                format_prf(&t.full_domain),
                tokens
            );
        }
    }
    out
}

/// One `cluster<TAB>topic<TAB>score` line per cluster; unmapped clusters get
/// topic `-1` and no score.
pub fn render_alignment(alignment: &Alignment) -> String {
    let mut out = String::new();
    for (cluster, topic) in alignment.entries() {
        match alignment.topic_for(cluster).and_then(|t| alignment.best_score(t)) {
            Some(score) => {
                let _ = writeln!(out, "{cluster}\t{topic}\t{}", format_f64_4(score));
            }
            None => {
                let _ = writeln!(out, "{cluster}\t{topic}");
            }
        }
    }
    let unclaimed: Vec<String> = alignment
        .unclaimed_topics()
        .iter()
        .map(|t| t.to_string())
        .collect();
    let unmapped: Vec<String> = alignment
        .unmapped_clusters()
        .iter()
        .map(|c| c.to_string())
        .collect();
    let _ = writeln!(out, "# displacements: {}", alignment.displacements());
    let _ = writeln!(out, "# unmapped clusters: {}", unmapped.join(" "));
    let _ = writeln!(out, "# unclaimed topics: {}", unclaimed.join(" "));
    out
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/text.rs"]
mod tests;
