//! Randomized invariants over seeded record sets.
//! Seeds are fixed so failures reproduce.

use confusion_report::domain::full_start;
use confusion_report::{
    compute, MatrixStrategy, NullStrategy, RawValue, Record, ReportConfig,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::BTreeSet;

fn raw(rng: &mut StdRng) -> RawValue {
    match rng.random_range(0..10) {
        0 => RawValue::Null,
        1 => RawValue::Text("junk".into()),
        2 => RawValue::Text(format!("{}", rng.random_range(-2..8))),
        3 => RawValue::Float(rng.random_range(-1.0..7.0)),
        _ => RawValue::Int(rng.random_range(-1..7)),
    }
}

fn sample(rng: &mut StdRng, n: usize) -> Vec<Record> {
    (0..n).map(|_| Record::new(raw(rng), raw(rng))).collect()
}

fn configs(rng: &mut StdRng) -> ReportConfig {
    let strategy = if rng.random_bool(0.5) {
        MatrixStrategy::Full
    } else {
        MatrixStrategy::Sparse
    };
    let null_strategy = if rng.random_bool(0.5) {
        NullStrategy::Discard
    } else {
        NullStrategy::Default
    };
    let mut cfg = ReportConfig::default()
        .with_strategy(strategy)
        .with_null_strategy(null_strategy)
        .with_min_value_filter(rng.random_range(-2..2));
    if rng.random_bool(0.3) {
        cfg = cfg.with_matrix_max(rng.random_range(0..6));
    }
    cfg
}

#[test]
fn matrix_invariants_hold_for_random_inputs() {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for round in 0..200 {
        let n = rng.random_range(1..60);
        let recs = sample(&mut rng, n);
        let cfg = configs(&mut rng);
        let r = compute(&recs, &[], &cfg).unwrap();
        let s = &r.statistics;

        // square, sized by the axis
        assert_eq!(r.size, r.display_values.len(), "round {round}");
        assert_eq!(r.matrix.len(), r.size);
        assert!(r.matrix.iter().all(|row| row.len() == r.size));
        assert_eq!(r.labels.len(), r.size);

        // sum equals the records whose two values are both on the axis
        let axis: BTreeSet<i64> = r.display_values.iter().copied().collect();
        let total: u64 = r.matrix.iter().flatten().sum();
        assert_eq!(total as usize, r.summary.tabulated_count, "round {round}");
        assert_eq!(
            r.summary.tabulated_count + r.summary.out_of_domain_count,
            r.summary.filtered_count
        );
        let back_refs: usize = r.cells.values().map(Vec::len).sum();
        assert_eq!(back_refs, r.summary.tabulated_count);
        for (key, positions) in &r.cells {
            assert!(axis.contains(&key.actual) && axis.contains(&key.predicted));
            assert!(positions.iter().all(|&i| i < recs.len()));
        }

        for i in 0..r.size {
            assert!(s.diagonal[i] <= s.row_sum[i].min(s.col_sum[i]));
            assert!((0.0..=100.0).contains(&s.recall[i]));
            assert!((0.0..=100.0).contains(&s.precision[i]));
        }
        assert!((0.0..=100.0).contains(&s.accuracy));
        assert!((0.0..=100.0).contains(&s.total_recall));
        assert!((0.0..=100.0).contains(&s.total_precision));
        assert_eq!(s.wrong_count, s.total_count - s.correct_count);
    }
}

#[test]
fn axis_matches_strategy_definition() {
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..100 {
        let n = rng.random_range(1..40);
        let recs = sample(&mut rng, n);
        let min = rng.random_range(-2..2);

        let sparse = ReportConfig::default()
            .with_strategy(MatrixStrategy::Sparse)
            .with_min_value_filter(min);
        let r = compute(&recs, &[], &sparse).unwrap();

        // sparse axis == sorted distinct values of the tabulated records
        let mut seen = BTreeSet::new();
        for positions in r.cells.values() {
            for &i in positions {
                for field in [&recs[i].actual, &recs[i].predicted] {
                    let v = confusion_report::normalize::parse_lenient(field)
                        .value()
                        .unwrap_or(0);
                    seen.insert(v);
                }
            }
        }
        assert_eq!(r.display_values, seen.into_iter().collect::<Vec<_>>());
        assert_eq!(r.summary.out_of_domain_count, 0);

        let full = ReportConfig::default()
            .with_strategy(MatrixStrategy::Full)
            .with_min_value_filter(min);
        let r = compute(&recs, &[], &full).unwrap();
        let expected: Vec<i64> = (full_start(min)..=r.summary.matrix_max).collect();
        assert_eq!(r.display_values, expected);
    }
}

#[test]
fn identical_inputs_give_identical_reports() {
    let mut rng = StdRng::seed_from_u64(7);
    let recs = sample(&mut rng, 80);
    let cfg = ReportConfig::default().with_strategy(MatrixStrategy::Sparse);

    let a = compute(&recs, &[], &cfg).unwrap();
    let b = compute(&recs, &[], &cfg).unwrap();
    assert_eq!(a, b);
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}
