use serde::Serialize;

use crate::config::GauntletConfig;
use crate::pipeline::stage6_gauntlet::GridReport;

#[derive(Debug, Serialize)]
struct GauntletSummary<'a> {
    tool: &'static str,
    version: &'static str,
    config: &'a GauntletConfig,
    grid: &'a [GridReport],
}

pub fn render_gauntlet_json(
    config: &GauntletConfig,
    reports: &[GridReport],
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&GauntletSummary {
        tool: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        config,
        grid: reports,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/json.rs"]
mod tests;
