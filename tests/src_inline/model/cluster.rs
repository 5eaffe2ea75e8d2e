use super::*;

fn sample() -> ScoredCluster {
    ScoredCluster::with_tokens(
        7,
        0.8125,
        [("v-explode", 0.5), ("n-bomb", 0.25), ("v-kill:s", 0.75)],
    )
}

#[test]
fn test_ordering_follows_token_scores() {
    let mut c = sample();
    assert_eq!(c.tokens_by_score(), &["v-kill:s", "v-explode", "n-bomb"]);

    c.set_token_score("n-bomb", 0.9);
    assert_eq!(c.tokens_by_score(), &["n-bomb", "v-kill:s", "v-explode"]);
    assert_eq!(c.token_score("n-bomb"), Some(0.9));
    assert!(c.contains("v-explode"));
    assert!(!c.contains("v-burn"));
}

#[test]
fn test_ordering_ties_by_token() {
    let c = ScoredCluster::with_tokens(1, 1.0, [("b", 0.5), ("a", 0.5), ("c", 0.1)]);
    assert_eq!(c.tokens_by_score(), &["a", "b", "c"]);
}

#[test]
fn test_record_round_trip() {
    let c = sample();
    let line = c.to_record(10);
    let back = ScoredCluster::parse_record(&line).unwrap();
    assert_eq!(back, c);
    assert_eq!(back.id(), 7);
    assert_eq!(back.score(), 0.8125);
}

#[test]
fn test_record_truncates_to_top_tokens() {
    let c = sample();
    let line = c.to_record(2);
    let back = ScoredCluster::parse_record(&line).unwrap();
    assert_eq!(back.id(), c.id());
    assert_eq!(back.score(), c.score());
    assert_eq!(back.tokens_by_score().len(), 2);
    assert_eq!(back.token_score("v-kill:s"), Some(0.75));
    assert_eq!(back.token_score("v-explode"), Some(0.5));
    assert!(!back.contains("n-bomb"));
}

#[test]
fn test_token_split_on_last_colon() {
    let c = ScoredCluster::parse_record("3 1.5 v-kill:o:0.25").unwrap();
    assert_eq!(c.token_score("v-kill:o"), Some(0.25));
}

#[test]
fn test_malformed_records_rejected() {
    assert_eq!(ScoredCluster::parse_record(""), Err(RecordError::Empty));
    assert_eq!(
        ScoredCluster::parse_record("4"),
        Err(RecordError::MissingScore)
    );
    assert!(matches!(
        ScoredCluster::parse_record("x 1.0"),
        Err(RecordError::BadId(_))
    ));
    assert!(matches!(
        ScoredCluster::parse_record("1 nan"),
        Err(RecordError::BadScore(_))
    ));
    assert!(matches!(
        ScoredCluster::parse_record("1 1.0 bomb"),
        Err(RecordError::BadToken(_))
    ));
    assert!(matches!(
        ScoredCluster::parse_record("1 1.0 bomb:-1"),
        Err(RecordError::NegativeToken(_))
    ));
    assert!(matches!(
        ScoredCluster::parse_record("1 1.0 bomb:1 bomb:2"),
        Err(RecordError::DuplicateToken(_))
    ));
}

#[test]
fn test_dot_product_shared_tokens_only() {
    let a = ScoredCluster::with_tokens(1, 0.0, [("x", 2.0), ("y", 3.0)]);
    let b = ScoredCluster::with_tokens(2, 0.0, [("y", 4.0), ("z", 10.0)]);
    assert_eq!(a.dot(&b), 12.0);
    assert_eq!(b.dot(&a), 12.0);
    assert_eq!(a.dot(&ScoredCluster::new(3, 0.0)), 0.0);
}

#[test]
fn test_with_score_keeps_identity() {
    let c = sample();
    let d = c.with_score(0.1);
    assert_eq!(d.id(), c.id());
    assert_eq!(d.score(), 0.1);
    assert_eq!(d.tokens_by_score(), c.tokens_by_score());
    assert_eq!(c.score(), 0.8125);
}
