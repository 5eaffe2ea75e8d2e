use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::Path;

use tracing::info;

use crate::input::{InputError, open_maybe_gz};
use crate::model::gold::{GoldEntity, GoldTemplate, dedup_entities};
use crate::model::taxonomy::{SlotKind, canonical_template_type};

const FIELD_MESSAGE_ID: &str = "MESSAGE: ID";
const FIELD_TEMPLATE: &str = "MESSAGE: TEMPLATE";
const FIELD_TYPE: &str = "INCIDENT: TYPE";

/// Gold templates per story, keyed by upper-cased story id.
#[derive(Debug, Clone, Default)]
pub struct AnswerKey {
    templates: BTreeMap<String, Vec<GoldTemplate>>,
}

impl AnswerKey {
    fn insert(&mut self, mut template: GoldTemplate) {
        template.story_key = template.story_key.trim().to_ascii_uppercase();
        self.templates
            .entry(template.story_key.clone())
            .or_default()
            .push(template);
    }

    /// Case-insensitive lookup. `None` means the story is not in the key.
    pub fn get_templates(&self, story_key: &str) -> Option<&[GoldTemplate]> {
        self.templates
            .get(&story_key.trim().to_ascii_uppercase())
            .map(Vec::as_slice)
    }

    pub fn story_keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.templates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// De-duplicated gold entities of one type for one story.
    pub fn gold_entities(
        &self,
        story_key: &str,
        template_type: &str,
        slots: &[SlotKind],
    ) -> Vec<GoldEntity> {
        let Some(templates) = self.get_templates(story_key) else {
            return Vec::new();
        };
        let entities = templates
            .iter()
            .filter(|t| t.template_type.as_deref() == Some(template_type))
            .flat_map(|t| t.entities_for(slots))
            .collect();
        dedup_entities(entities)
    }

    /// Non-optional gold entities per type over every story in the key.
    pub fn total_gold(&self, types: &[String], slots: &[SlotKind]) -> BTreeMap<String, usize> {
        let mut totals = BTreeMap::new();
        for template_type in types {
            let mut n = 0usize;
            for story in self.story_keys() {
                n += self
                    .gold_entities(story, template_type, slots)
                    .iter()
                    .filter(|e| !e.optional)
                    .count();
            }
            totals.insert(template_type.clone(), n);
        }
        totals
    }
}

pub fn read_answer_key(path: &Path) -> Result<AnswerKey, InputError> {
    let reader = open_maybe_gz(path)?;
    let key = parse_answer_key(reader, &path.display().to_string())?;
    info!(path = %path.display(), stories = key.len(), "loaded answer key");
    Ok(key)
}

/// Parses MUC-style keys: numbered `N. FIELD NAME   value` lines, where a
/// `0.` line starts a new template and unnumbered lines continue the
/// previous field with another fill.
pub fn parse_answer_key<R: BufRead>(
    mut reader: R,
    source_name: &str,
) -> Result<AnswerKey, InputError> {
    let mut key = AnswerKey::default();
    let mut current: Option<GoldTemplate> = None;
    let mut last_field: Option<String> = None;
    let mut buf = String::new();
    let mut line_no = 0usize;

    loop {
        buf.clear();
        let read = reader.read_line(&mut buf)?;
        if read == 0 {
            break;
        }
        line_no += 1;
        let line = buf.trim_end();
        if line.trim().is_empty() {
            continue;
        }

        let Some((number, body)) = split_numbered(line) else {
            let (Some(template), Some(field)) = (current.as_mut(), last_field.as_ref()) else {
                return Err(InputError::parse(
                    source_name,
                    line_no,
                    "continuation line before any slot",
                ));
            };
            let slot = template.slots.entry(field.clone()).or_default();
            if !slot.is_empty() {
                slot.push('\n');
            }
            slot.push_str(line.trim());
            continue;
        };

        let (field, value) = split_field(body);
        if !field.contains(':') {
            return Err(InputError::parse(
                source_name,
                line_no,
                format!("slot name '{field}' has no category"),
            ));
        }

        if number == 0 {
            if field != FIELD_MESSAGE_ID {
                return Err(InputError::parse(
                    source_name,
                    line_no,
                    format!("slot 0 must be {FIELD_MESSAGE_ID}"),
                ));
            }
            let story = value.split_whitespace().next().unwrap_or("");
            if story.is_empty() {
                return Err(InputError::parse(source_name, line_no, "empty message id"));
            }
            if let Some(done) = current.take() {
                key.insert(done);
            }
            current = Some(GoldTemplate {
                story_key: story.to_string(),
                ..GoldTemplate::default()
            });
        }

        let Some(template) = current.as_mut() else {
            return Err(InputError::parse(
                source_name,
                line_no,
                "slot line before the first message id",
            ));
        };
        match field {
            FIELD_TEMPLATE => template.optional = value.to_ascii_uppercase().contains("(OPTIONAL)"),
            FIELD_TYPE => template.template_type = canonical_template_type(value),
            _ => {}
        }
        template.slots.insert(field.to_string(), value.to_string());
        last_field = Some(field.to_string());
    }

    if let Some(done) = current {
        key.insert(done);
    }
    Ok(key)
}

fn split_numbered(line: &str) -> Option<(usize, &str)> {
    let trimmed = line.trim_start();
    let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = trimmed[digits..].strip_prefix('.')?;
    let number = trimmed[..digits].parse().ok()?;
    Some((number, rest.trim()))
}

/// Field names use single spaces; the value starts after the first run of
/// two or more spaces or a tab.
fn split_field(body: &str) -> (&str, &str) {
    let bytes = body.as_bytes();
    for i in 0..bytes.len() {
        let gap = bytes[i] == b'\t' || (bytes[i] == b' ' && bytes.get(i + 1) == Some(&b' '));
        if gap {
            return (body[..i].trim(), body[i..].trim());
        }
    }
    (body.trim(), "")
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/answer_key.rs"]
mod tests;
