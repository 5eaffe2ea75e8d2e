use std::io::Cursor;

use super::*;
use crate::input::answer_key::parse_answer_key;
use crate::input::run_log::parse_run_log;

const KEY: &str = "\
0.  MESSAGE: ID                    TST-0001
1.  MESSAGE: TEMPLATE              1
4.  INCIDENT: TYPE                 BOMBING
10. PERP: ORGANIZATION ID          \"URBAN GUERRILLAS\" / \"FMLN\"
12. PHYS TGT: ID                   \"POWER STATION\"
0.  MESSAGE: ID                    TST-0002
1.  MESSAGE: TEMPLATE              1
4.  INCIDENT: TYPE                 KIDNAPPING
19. HUM TGT: DESCRIPTION           \"JOURNALIST\"
0.  MESSAGE: ID                    TST-0003
1.  MESSAGE: TEMPLATE              1
4.  INCIDENT: TYPE                 BOMBING
12. PHYS TGT: ID                   \"BRIDGE\"
";

const LOG: &str = "\
cluster\t1 0 v-explode:1 n-bomb:0.5
cluster\t2 0 v-kidnap:1
topic\t10 0 n-bomb:1
topic\t20 0 v-kidnap:1
story\tTST-0001
doc\t1 0.9
doc\t2 0.5
topic\t10 0.3
guess\t1\tthe fmln
guess\t1\tpower station
guess\t1\tpolice
guess\t2\tjournalist
story\tTST-0002
doc\t2 0.8
doc\t1 0.1
topic\t20 0.6
guess\t2\ta journalist
guess\t1\tbridge
story\tTST-0004
doc\t1 0.7
guess\t1\tbus
";

fn fixtures() -> (RunLog, AnswerKey) {
    let log = parse_run_log(Cursor::new(LOG.as_bytes()), "run.log").unwrap();
    let key = parse_answer_key(Cursor::new(KEY.as_bytes()), "key.txt").unwrap();
    (log, key)
}

fn config(top_doc: Vec<usize>, top_sent: Vec<usize>) -> GauntletConfig {
    GauntletConfig {
        top_doc,
        top_sent,
        cutoffs: vec![None],
        lambdas: Vec::new(),
        template_types: vec!["BOMBING".to_string(), "KIDNAPPING".to_string()],
        rank_tier: Tier::Strict,
        ..GauntletConfig::default()
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_single_point_scores() {
    let (log, key) = fixtures();
    let config = config(vec![1], vec![0]);
    let reports = run_gauntlet(&GauntletInputs {
        log: &log,
        key: &key,
        config: &config,
    });
    assert_eq!(reports.len(), 1);
    let r = &reports[0];
    assert_eq!(r.documents, 3);
    assert_eq!(r.candidates, 2);

    let bombing = &r.types[0];
    assert_eq!(bombing.template_type, "BOMBING");
    assert_eq!(bombing.best_id, Some(1));
    assert_eq!(
        (bombing.correct, bombing.incorrect, bombing.missed),
        (2, 1, 0)
    );
    assert_eq!(bombing.no_gold_guesses, 1);
    assert_eq!(bombing.unevaluated_gold, 1);
    assert!(close(bombing.strict.precision, 2.0 / 3.0));
    assert!(close(bombing.strict.recall, 1.0));
    assert!(close(bombing.all_guessed.precision, 0.5));
    assert!(close(bombing.all_guessed.recall, 1.0));
    assert!(close(bombing.full_domain.precision, 0.5));
    assert!(close(bombing.full_domain.recall, 2.0 / 3.0));

    let kidnapping = &r.types[1];
    assert_eq!(kidnapping.best_id, Some(2));
    assert_eq!(
        (kidnapping.correct, kidnapping.incorrect, kidnapping.missed),
        (1, 0, 0)
    );
    assert!(close(kidnapping.full_domain.f1, 1.0));
}

#[test]
fn test_grid_produces_one_block_per_point() {
    let (log, key) = fixtures();
    let config = config(vec![1, 2], vec![0, 1, 2]);
    let reports = run_gauntlet(&GauntletInputs {
        log: &log,
        key: &key,
        config: &config,
    });
    assert_eq!(reports.len(), 6);
    for (i, r) in reports.iter().enumerate() {
        assert_eq!(r.point.index, i);
        let types: Vec<&str> = r.types.iter().map(|t| t.template_type.as_str()).collect();
        assert_eq!(types, vec!["BOMBING", "KIDNAPPING"]);
    }
}

#[test]
fn test_wider_selection_adds_wrong_guesses() {
    let (log, key) = fixtures();
    let config = config(vec![2], vec![0]);
    let reports = run_gauntlet(&GauntletInputs {
        log: &log,
        key: &key,
        config: &config,
    });
    // Cluster 2 now also guesses on TST-0001, which has no kidnapping gold.
    let bombing = &reports[0].types[0];
    assert_eq!(bombing.best_id, Some(1));
    let kidnapping = &reports[0].types[1];
    assert_eq!(kidnapping.best_id, Some(2));
    assert_eq!(kidnapping.no_gold_guesses, 1);
    assert_eq!(reports[0].candidates, 2);
}

#[test]
fn test_parallel_matches_sequential() {
    let (log, key) = fixtures();
    let sequential = config(vec![1, 2], vec![0, 1]);
    let parallel = GauntletConfig {
        parallel: true,
        ..sequential.clone()
    };
    let a = run_gauntlet(&GauntletInputs {
        log: &log,
        key: &key,
        config: &sequential,
    });
    let b = run_gauntlet(&GauntletInputs {
        log: &log,
        key: &key,
        config: &parallel,
    });
    assert_eq!(a, b);
}

#[test]
fn test_lambda_one_keeps_document_ranking() {
    let (log, key) = fixtures();
    let plain = config(vec![1], vec![0]);
    let mixed = GauntletConfig {
        lambdas: vec![1.0],
        ..plain.clone()
    };
    let a = run_gauntlet(&GauntletInputs {
        log: &log,
        key: &key,
        config: &plain,
    });
    let b = run_gauntlet(&GauntletInputs {
        log: &log,
        key: &key,
        config: &mixed,
    });
    assert_eq!(b[0].point.lambda, Some(1.0));
    assert_eq!(a[0].types, b[0].types);
}

#[test]
fn test_empty_log_reports_every_type() {
    let (_, key) = fixtures();
    let log = RunLog::default();
    let config = config(vec![1], vec![0]);
    let reports = run_gauntlet(&GauntletInputs {
        log: &log,
        key: &key,
        config: &config,
    });
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].types.len(), 2);
    assert!(reports[0].types.iter().all(|t| t.best_id.is_none()));
    assert_eq!(reports[0].types[0].unevaluated_gold, 3);
}

#[test]
fn test_review_counters_count_each_guess_once() {
    let key_text = "\
0.  MESSAGE: ID                    TST-0009
1.  MESSAGE: TEMPLATE              1
4.  INCIDENT: TYPE                 BOMBING
12. PHYS TGT: ID                   \"EMBASSY\"
0.  MESSAGE: ID                    TST-0009
1.  MESSAGE: TEMPLATE              2
4.  INCIDENT: TYPE                 ATTACK
12. PHYS TGT: ID                   \"EMBASSY\"
";
    let log_text = "\
story\tTST-0009
doc\t1 0.9
guess\t1\tmembers of embassy staff
guess\t1\tpolice
guess\t1\tpolices
";
    let key = parse_answer_key(Cursor::new(key_text.as_bytes()), "key.txt").unwrap();
    let log = parse_run_log(Cursor::new(log_text.as_bytes()), "run.log").unwrap();
    let config = GauntletConfig {
        template_types: vec!["BOMBING".to_string(), "ATTACK".to_string()],
        ..config(vec![1], vec![0])
    };
    let reports = run_gauntlet(&GauntletInputs {
        log: &log,
        key: &key,
        config: &config,
    });
    let r = &reports[0];
    assert_eq!(r.flagged, 1);
    assert_eq!(r.suppressed, 1);
    for t in &r.types {
        assert_eq!((t.correct, t.incorrect, t.missed), (0, 2, 1));
    }
}
