use super::*;

#[test]
fn test_prf_zero_denominators() {
    let p = Prf::from_counts(0, 0, 0);
    assert_eq!(p, Prf::default());
    let p = Prf::from_counts(0, 3, 0);
    assert_eq!(p.precision, 0.0);
    assert_eq!(p.recall, 0.0);
    assert_eq!(p.f1, 0.0);
}

#[test]
fn test_prf_values() {
    let p = Prf::from_counts(2, 2, 0);
    assert!((p.precision - 0.5).abs() < 1e-9);
    assert!((p.recall - 1.0).abs() < 1e-9);
    assert!((p.f1 - 2.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_tiers() {
    let counts = Counts {
        correct: 2,
        incorrect: 1,
        missed: 1,
        evaluated_gold: 3,
        no_gold_guesses: 1,
    };
    let strict = counts.tier(Tier::Strict, 5);
    assert!((strict.precision - 2.0 / 3.0).abs() < 1e-9);
    assert!((strict.recall - 2.0 / 3.0).abs() < 1e-9);

    let all = counts.tier(Tier::AllGuessed, 5);
    assert!((all.precision - 0.5).abs() < 1e-9);
    assert!((all.recall - 2.0 / 3.0).abs() < 1e-9);

    let full = counts.tier(Tier::FullDomain, 5);
    assert!((full.precision - 0.5).abs() < 1e-9);
    assert!((full.recall - 0.4).abs() < 1e-9);
}

#[test]
fn test_best_for_type_first_seen_wins_ties() {
    let mut totals = BTreeMap::new();
    totals.insert("ATTACK".to_string(), 2);
    let mut tally = EvaluationTally::new(totals);

    tally.entry(9, "ATTACK").correct = 1;
    tally.entry(9, "ATTACK").missed = 1;
    tally.entry(4, "ATTACK").correct = 1;
    tally.entry(4, "ATTACK").missed = 1;
    tally.entry(7, "BOMBING").incorrect = 3;

    assert_eq!(tally.candidates(), &[9, 4, 7]);
    let (best, counts) = tally.best_for_type("ATTACK", Tier::Strict).unwrap();
    assert_eq!(best, 9);
    assert_eq!(counts.correct, 1);
    assert!(tally.best_for_type("KIDNAPPING", Tier::Strict).is_none());
}

#[test]
fn test_best_for_type_prefers_higher_f1() {
    let mut tally = EvaluationTally::new(BTreeMap::new());
    tally.entry(1, "ARSON").incorrect = 2;
    tally.entry(2, "ARSON").correct = 1;
    let (best, _) = tally.best_for_type("ARSON", Tier::AllGuessed).unwrap();
    assert_eq!(best, 2);
}
