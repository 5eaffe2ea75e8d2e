use std::fs::{self, File};
use std::io::{BufWriter, Cursor, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use flate2::Compression;
use flate2::write::GzEncoder;

use super::*;

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("template_gauntlet_runlog_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

const LOG: &str = "\
# inventory
cluster\t1 0.5 v-explode:0.6 n-bomb:0.4
cluster\t2 0.25 v-kidnap:0.9
topic\t10 0 n-bomb:1

story\tdev-muc3-0001
doc\t1 0.8
sent\t2 0.3 v-kidnap:0.2
sent\t2 0.6
topic\t10 0.4
guess\t1\tthe urban guerrillas
guess\t1\tpower station
guess\t2\tpeasants
story\tDEV-MUC3-0002
doc\t2 0.1
";

fn parse(text: &str) -> Result<RunLog, InputError> {
    parse_run_log(Cursor::new(text.as_bytes()), "test.log")
}

#[test]
fn test_parse_inventory_and_stories() {
    let log = parse(LOG).unwrap();
    assert_eq!(log.clusters.len(), 2);
    assert_eq!(log.topics.len(), 1);
    assert_eq!(log.clusters[0].token_score("v-explode"), Some(0.6));
    assert_eq!(log.stories.len(), 2);

    let s = &log.stories[0];
    assert_eq!(s.key, "DEV-MUC3-0001");
    assert_eq!(s.doc.len(), 1);
    assert_eq!(s.sent.len(), 2);
    assert_eq!(s.topics[0].score(), 0.4);
    assert_eq!(s.guesses_for(1), &["the urban guerrillas", "power station"]);
    assert_eq!(s.guesses_for(2), &["peasants"]);
    assert!(s.guesses_for(99).is_empty());

    let s2 = &log.stories[1];
    assert_eq!(s2.key, "DEV-MUC3-0002");
    assert_eq!(s2.doc[0].id(), 2);
    assert!(s2.guesses.is_empty());
}

#[test]
fn test_render_round_trip() {
    let log = parse(LOG).unwrap();
    let text = render_run_log(&log, 10);
    let back = parse(&text).unwrap();
    assert_eq!(back, log);
}

fn parse_err_line(text: &str) -> usize {
    match parse(text) {
        Err(InputError::Parse { line, .. }) => line,
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn test_malformed_lines_are_fatal() {
    assert_eq!(parse_err_line("story\tA\ndoc\tx 0.1\n"), 2);
    assert_eq!(parse_err_line("doc\t1 0.1\n"), 1);
    assert_eq!(parse_err_line("story\tA\nbogus\t1 0.1\n"), 2);
    assert_eq!(parse_err_line("story\tA\nguess\tseven\tfmln\n"), 2);
    assert_eq!(parse_err_line("story\tA\nguess\t7\n"), 2);
    assert_eq!(parse_err_line("story\tA\nstory\ta\n"), 2);
    assert_eq!(parse_err_line("story\tA\ncluster\t1 0.1\n"), 2);
    assert_eq!(parse_err_line("no tab here\n"), 1);
}

#[test]
fn test_read_plain_and_gz_files() {
    let dir = make_temp_dir();
    let plain = dir.join("run.log");
    let mut f = BufWriter::new(File::create(&plain).unwrap());
    f.write_all(LOG.as_bytes()).unwrap();
    drop(f);

    let gz = dir.join("run.log.gz");
    let mut enc = GzEncoder::new(File::create(&gz).unwrap(), Compression::default());
    enc.write_all(LOG.as_bytes()).unwrap();
    enc.finish().unwrap();

    let a = read_run_log(&plain).unwrap();
    let b = read_run_log(&gz).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.stories.len(), 2);

    assert!(matches!(
        read_run_log(&dir.join("absent.log")),
        Err(InputError::MissingInput(_))
    ));
}
