use std::collections::{BTreeMap, BTreeSet};

use crate::model::taxonomy::SlotKind;

/// A hand-annotated real-world entity: one or more alternative mentions.
/// Two entities are equal when their mention sets are equal.
#[derive(Debug, Clone)]
pub struct GoldEntity {
    pub template_type: String,
    pub mentions: Vec<String>,
    pub optional: bool,
}

impl GoldEntity {
    pub fn new<I, S>(template_type: &str, mentions: I, optional: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            template_type: template_type.to_string(),
            mentions: mentions.into_iter().map(Into::into).collect(),
            optional,
        }
    }

    fn mention_set(&self) -> BTreeSet<&str> {
        self.mentions.iter().map(String::as_str).collect()
    }
}

impl PartialEq for GoldEntity {
    fn eq(&self, other: &Self) -> bool {
        self.mention_set() == other.mention_set()
    }
}

impl Eq for GoldEntity {}

/// One answer-key template: raw slot text keyed by field name.
#[derive(Debug, Clone, Default)]
pub struct GoldTemplate {
    pub story_key: String,
    pub template_type: Option<String>,
    pub optional: bool,
    pub slots: BTreeMap<String, String>,
}

impl GoldTemplate {
    pub fn slot_text(&self, field: &str) -> Option<&str> {
        self.slots.get(field).map(String::as_str)
    }

    /// Entities filling one semantic slot. Template-level optionality is
    /// inherited by every entity.
    pub fn entities(&self, slot: SlotKind) -> Vec<GoldEntity> {
        let Some(template_type) = self.template_type.as_deref() else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for field in slot.key_fields() {
            let Some(text) = self.slot_text(field) else {
                continue;
            };
            for line in text.lines() {
                if let Some((mentions, optional)) = parse_fill(line) {
                    out.push(GoldEntity {
                        template_type: template_type.to_string(),
                        mentions,
                        optional: optional || self.optional,
                    });
                }
            }
        }
        out
    }

    pub fn entities_for(&self, slots: &[SlotKind]) -> Vec<GoldEntity> {
        slots.iter().flat_map(|&s| self.entities(s)).collect()
    }
}

/// Parses one slot fill such as `? "FMLN" / "FARABUNDO MARTI ..."` or
/// `"PEASANTS": "PEASANTS"`. Returns `None` for empty fills (`-`, `*`).
pub fn parse_fill(line: &str) -> Option<(Vec<String>, bool)> {
    let mut text = line.trim();
    let optional = text.starts_with('?');
    if optional {
        text = text[1..].trim_start();
    }
    if text.is_empty() || text == "-" || text == "*" {
        return None;
    }

    let mut mentions = Vec::new();
    let mut quoted = false;
    let mut current = String::new();
    let mut saw_quote = false;
    for ch in text.chars() {
        match ch {
            '"' if quoted => {
                quoted = false;
                let mention = current.trim().to_string();
                if !mention.is_empty() {
                    mentions.push(mention);
                }
                current.clear();
            }
            '"' => {
                quoted = true;
                saw_quote = true;
            }
            ':' if !quoted => break,
            _ if quoted => current.push(ch),
            _ => {}
        }
    }

    if !saw_quote {
        let bare = text.split(':').next().unwrap_or("").trim();
        for alt in bare.split('/') {
            let alt = alt.trim();
            if !alt.is_empty() && alt != "-" && alt != "*" {
                mentions.push(alt.to_string());
            }
        }
    }

    if mentions.is_empty() {
        None
    } else {
        Some((mentions, optional))
    }
}

/// Drops entities whose mention set repeats an earlier one.
pub fn dedup_entities(entities: Vec<GoldEntity>) -> Vec<GoldEntity> {
    let mut out: Vec<GoldEntity> = Vec::with_capacity(entities.len());
    for entity in entities {
        if !out.contains(&entity) {
            out.push(entity);
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/gold.rs"]
mod tests;
