use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;
use std::io::BufRead;
use std::path::Path;

use tracing::info;

use crate::input::{InputError, open_maybe_gz};
use crate::model::cluster::ScoredCluster;

/// Everything the pipeline recorded for one story.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoryRun {
    pub key: String,
    pub doc: Vec<ScoredCluster>,
    pub sent: Vec<ScoredCluster>,
    pub topics: Vec<ScoredCluster>,
    pub guesses: BTreeMap<i64, Vec<String>>,
}

impl StoryRun {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.trim().to_ascii_uppercase(),
            ..Self::default()
        }
    }

    pub fn guesses_for(&self, cluster_id: i64) -> &[String] {
        self.guesses
            .get(&cluster_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Global cluster/topic inventory followed by per-story records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunLog {
    pub clusters: Vec<ScoredCluster>,
    pub topics: Vec<ScoredCluster>,
    pub stories: Vec<StoryRun>,
}

pub fn read_run_log(path: &Path) -> Result<RunLog, InputError> {
    let reader = open_maybe_gz(path)?;
    let log = parse_run_log(reader, &path.display().to_string())?;
    info!(
        path = %path.display(),
        clusters = log.clusters.len(),
        topics = log.topics.len(),
        stories = log.stories.len(),
        "loaded run log"
    );
    Ok(log)
}

/// Parses the tab-separated run-log grammar. Any malformed line is fatal.
pub fn parse_run_log<R: BufRead>(mut reader: R, source_name: &str) -> Result<RunLog, InputError> {
    let mut log = RunLog::default();
    let mut seen_keys = BTreeSet::new();
    let mut current: Option<StoryRun> = None;
    let mut buf = String::new();
    let mut line_no = 0usize;

    loop {
        buf.clear();
        let read = reader.read_line(&mut buf)?;
        if read == 0 {
            break;
        }
        line_no += 1;
        let line = buf.trim_end_matches(['\n', '\r']);
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        let (tag, rest) = line
            .split_once('\t')
            .ok_or_else(|| InputError::parse(source_name, line_no, "expected <tag>\\t<payload>"))?;
        let record = |text: &str| {
            ScoredCluster::parse_record(text)
                .map_err(|e| InputError::parse(source_name, line_no, e.to_string()))
        };

        match (tag, current.as_mut()) {
            ("story", _) => {
                let story = StoryRun::new(rest);
                if story.key.is_empty() {
                    return Err(InputError::parse(source_name, line_no, "empty story key"));
                }
                if !seen_keys.insert(story.key.clone()) {
                    return Err(InputError::parse(
                        source_name,
                        line_no,
                        format!("story {} appears twice", story.key),
                    ));
                }
                if let Some(done) = current.replace(story) {
                    log.stories.push(done);
                }
            }
            ("cluster", None) => log.clusters.push(record(rest)?),
            ("topic", None) => log.topics.push(record(rest)?),
            ("doc", Some(story)) => story.doc.push(record(rest)?),
            ("sent", Some(story)) => story.sent.push(record(rest)?),
            ("topic", Some(story)) => story.topics.push(record(rest)?),
            ("guess", Some(story)) => {
                let (id, text) = rest.split_once('\t').ok_or_else(|| {
                    InputError::parse(source_name, line_no, "expected guess\\t<id>\\t<text>")
                })?;
                let id = id.trim().parse::<i64>().map_err(|_| {
                    InputError::parse(source_name, line_no, format!("invalid cluster id '{id}'"))
                })?;
                let text = text.trim();
                if text.is_empty() {
                    return Err(InputError::parse(source_name, line_no, "empty guess text"));
                }
                story.guesses.entry(id).or_default().push(text.to_string());
            }
            ("cluster", Some(_)) => {
                return Err(InputError::parse(
                    source_name,
                    line_no,
                    "inventory cluster after the first story",
                ));
            }
            ("doc" | "sent" | "guess", None) => {
                return Err(InputError::parse(
                    source_name,
                    line_no,
                    format!("'{tag}' record outside a story"),
                ));
            }
            (other, _) => {
                return Err(InputError::parse(
                    source_name,
                    line_no,
                    format!("unknown record tag '{other}'"),
                ));
            }
        }
    }

    if let Some(done) = current {
        log.stories.push(done);
    }
    Ok(log)
}

/// Inverse of `parse_run_log`, keeping at most `max_tokens` tokens per record.
pub fn render_run_log(log: &RunLog, max_tokens: usize) -> String {
    let mut out = String::new();
    for cluster in &log.clusters {
        let _ = writeln!(out, "cluster\t{}", cluster.to_record(max_tokens));
    }
    for topic in &log.topics {
        let _ = writeln!(out, "topic\t{}", topic.to_record(max_tokens));
    }
    for story in &log.stories {
        let _ = writeln!(out, "story\t{}", story.key);
        for c in &story.doc {
            let _ = writeln!(out, "doc\t{}", c.to_record(max_tokens));
        }
        for c in &story.sent {
            let _ = writeln!(out, "sent\t{}", c.to_record(max_tokens));
        }
        for c in &story.topics {
            let _ = writeln!(out, "topic\t{}", c.to_record(max_tokens));
        }
        for (id, texts) in &story.guesses {
            for text in texts {
                let _ = writeln!(out, "guess\t{id}\t{text}");
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/run_log.rs"]
mod tests;
