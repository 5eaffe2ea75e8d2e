pub mod json;
pub mod text;

use crate::model::tally::Prf;

pub fn format_f64_4(v: f64) -> String {
    format!("{:.4}", v)
}

/// `P/R/F1` with four decimals each.
pub fn format_prf(prf: &Prf) -> String {
    format!(
        "{}/{}/{}",
        format_f64_4(prf.precision),
        format_f64_4(prf.recall),
        format_f64_4(prf.f1)
    )
}

pub fn format_id(id: Option<i64>) -> String {
    id.map_or_else(|| "-".to_string(), |id| id.to_string())
}

pub fn format_opt_f64(v: Option<f64>) -> String {
    v.map_or_else(|| "off".to_string(), format_f64_4)
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/mod.rs"]
mod tests;
