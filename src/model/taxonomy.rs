use serde::{Deserialize, Serialize};

/// Incident types of the MUC-4 template taxonomy, in report order.
pub fn builtin_template_types() -> &'static [&'static str] {
    &[
        "ATTACK",
        "BOMBING",
        "KIDNAPPING",
        "ARSON",
        "ROBBERY",
        "FORCED WORK STOPPAGE",
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    Perpetrator,
    Target,
    Victim,
    Instrument,
}

impl SlotKind {
    pub fn all() -> &'static [SlotKind] {
        &[
            SlotKind::Perpetrator,
            SlotKind::Target,
            SlotKind::Victim,
            SlotKind::Instrument,
        ]
    }

    /// Answer-key fields whose fills belong to this semantic slot.
    pub fn key_fields(self) -> &'static [&'static str] {
        match self {
            SlotKind::Perpetrator => &["PERP: INDIVIDUAL ID", "PERP: ORGANIZATION ID"],
            SlotKind::Target => &["PHYS TGT: ID"],
            SlotKind::Victim => &["HUM TGT: NAME", "HUM TGT: DESCRIPTION"],
            SlotKind::Instrument => &["INCIDENT: INSTRUMENT ID"],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SlotKind::Perpetrator => "perpetrator",
            SlotKind::Target => "target",
            SlotKind::Victim => "victim",
            SlotKind::Instrument => "instrument",
        }
    }

    pub fn parse(value: &str) -> Option<SlotKind> {
        match value.trim().to_ascii_lowercase().as_str() {
            "perpetrator" | "perp" => Some(SlotKind::Perpetrator),
            "target" | "phys" => Some(SlotKind::Target),
            "victim" | "hum" => Some(SlotKind::Victim),
            "instrument" => Some(SlotKind::Instrument),
            _ => None,
        }
    }
}

/// Canonical incident type for a raw `INCIDENT: TYPE` fill. Qualifiers such as
/// `ATTEMPTED` and `THREAT` are dropped and only the first of several
/// alternatives is kept.
pub fn canonical_template_type(raw: &str) -> Option<String> {
    let first = raw.split('/').next()?.trim();
    let first = first.trim_start_matches('?').trim();
    let mut upper = first.to_ascii_uppercase();
    for prefix in ["ATTEMPTED ", "THREAT "] {
        if let Some(rest) = upper.strip_prefix(prefix) {
            upper = rest.trim().to_string();
        }
    }
    if upper.is_empty() || upper == "-" || upper == "*" {
        return None;
    }
    Some(upper)
}
