//! Evaluator behaviour on small hand-built alignments.

use aligngraph_core::*;
use aligngraph_eval::*;
use approx::assert_abs_diff_eq;
use proptest::prelude::*;

fn simple(a: &str, b: &str) -> Mapping {
    Mapping::equivalence(Expression::class(a), Expression::class(b), 1.0)
}

fn occurrence(p: Expression) -> Expression {
    Expression::occurrence(p, Comparator::GreaterThan, 0)
}

fn restriction(p: &str, c: &str) -> Expression {
    Expression::domain_restriction(Expression::relation(p), Expression::class(c), Quantifier::All)
}

#[test]
fn test_exact_match_ignores_unrelated_reference() {
    let candidate: Alignment = [simple("s:A", "t:B")].into_iter().collect();
    let reference: Alignment = [simple("s:A", "t:B"), simple("s:C", "t:D")]
        .into_iter()
        .collect();
    let sim = LexicalSimilarity::new();

    let eval = Evaluator::new(&sim).evaluate(&candidate, &reference);

    assert_eq!(eval.precision_credit, 1.0);
    assert_eq!(eval.recall_credit, 1.0);
    assert_eq!(eval.best_scores().len(), 1);
    assert_eq!(eval.status_of(&simple("s:A", "t:B")), MappingStatus::Correct);

    let report = eval.report(&candidate, &reference);
    assert_abs_diff_eq!(report.precision, 1.0);
    assert_abs_diff_eq!(report.recall, 0.5);
    assert_abs_diff_eq!(report.f_measure, 2.0 / 3.0, epsilon = 1e-12);
}

#[test]
fn test_exact_match_wins_over_decoy() {
    let target = Mapping::equivalence(
        Expression::class("s:A"),
        occurrence(Expression::relation("t:p")),
        0.4,
    );
    let decoy = Mapping::equivalence(
        Expression::class("s:A"),
        Expression::union([
            occurrence(Expression::relation("t:p")),
            occurrence(Expression::relation("t:q")),
        ])
        .unwrap(),
        1.0,
    );
    let candidate: Alignment = [target.clone()].into_iter().collect();
    // the reference copy carries a different similarity; identity ignores it
    let reference_copy = Mapping::equivalence(
        Expression::class("s:A"),
        occurrence(Expression::relation("t:p")),
        0.9,
    );
    let reference: Alignment = [decoy, reference_copy].into_iter().collect();
    let sim = LexicalSimilarity::new();

    let eval = Evaluator::new(&sim).evaluate(&candidate, &reference);

    assert_eq!(eval.precision_credit, 1.0);
    assert_eq!(eval.status_of(&target), MappingStatus::Correct);
    assert_eq!(eval.best_scores().get(&1), Some(&1.0));
    assert!(!eval.best_scores().contains_key(&0));
}

#[test]
fn test_partial_match_scores_element_overlap() {
    let candidate_mapping = Mapping::equivalence(
        Expression::class("s:A"),
        occurrence(Expression::relation("t:p")),
        0.7,
    );
    let candidate: Alignment = [candidate_mapping.clone()].into_iter().collect();
    let reference: Alignment = [Mapping::equivalence(
        Expression::class("s:A"),
        restriction("t:p", "t:C"),
        1.0,
    )]
    .into_iter()
    .collect();
    let sim = LexicalSimilarity::new();

    let eval = Evaluator::new(&sim).evaluate(&candidate, &reference);

    // shared {s:A, t:p, =} out of 8 distinct elements
    assert_abs_diff_eq!(eval.precision_credit, 3.0 / 8.0, epsilon = 1e-12);
    assert_abs_diff_eq!(eval.recall_credit, 3.0 / 8.0, epsilon = 1e-12);
    assert_eq!(eval.status_of(&candidate_mapping), MappingStatus::Unknown);
}

#[test]
fn test_reference_counted_once_for_recall() {
    let first = Mapping::equivalence(
        Expression::class("s:A"),
        occurrence(Expression::relation("t:p")),
        0.7,
    );
    let second = Mapping::equivalence(
        Expression::class("s:A"),
        occurrence(Expression::inverse(Expression::relation("t:p"))),
        0.7,
    );
    let candidate: Alignment = [first, second].into_iter().collect();
    let reference: Alignment = [Mapping::equivalence(
        Expression::class("s:A"),
        restriction("t:p", "t:C"),
        1.0,
    )]
    .into_iter()
    .collect();
    let sim = LexicalSimilarity::new();

    let eval = Evaluator::new(&sim).evaluate(&candidate, &reference);

    assert_abs_diff_eq!(eval.precision_credit, 3.0 / 8.0 + 3.0 / 9.0, epsilon = 1e-12);
    assert_abs_diff_eq!(eval.recall_credit, 3.0 / 8.0, epsilon = 1e-12);
}

#[test]
fn test_unrelated_candidate_stays_unverified() {
    let stray = Mapping::equivalence(
        Expression::class("s:Z"),
        occurrence(Expression::relation("t:p")),
        0.7,
    );
    let candidate: Alignment = [stray.clone()].into_iter().collect();
    let reference: Alignment = [Mapping::equivalence(
        Expression::class("s:A"),
        restriction("t:p", "t:C"),
        1.0,
    )]
    .into_iter()
    .collect();
    let sim = LexicalSimilarity::new();

    let eval = Evaluator::new(&sim).evaluate(&candidate, &reference);

    assert_eq!(eval.precision_credit, 0.0);
    assert_eq!(eval.recall_credit, 0.0);
    assert_eq!(eval.status_of(&stray), MappingStatus::Unverified);
}

#[test]
fn test_simple_evaluation_counts_conflicts() {
    let candidate: Alignment = [
        simple("s:A", "t:B"),
        simple("s:A", "t:C"),
        simple("s:A", "t:D"),
    ]
    .into_iter()
    .collect();
    let reference: Alignment = [
        simple("s:A", "t:B"),
        Mapping::new(
            Expression::class("s:A"),
            Expression::class("t:C"),
            MappingRelation::Incompatible,
            1.0,
        ),
    ]
    .into_iter()
    .collect();
    let sim = LexicalSimilarity::new();

    let eval = Evaluator::new(&sim).evaluate_simple(&candidate, &reference);

    assert_eq!(eval.precision_credit, 1.0);
    assert_eq!(eval.conflicts, 1);
    assert_eq!(eval.count_status(MappingStatus::Correct), 1);
    assert_eq!(eval.count_status(MappingStatus::Incorrect), 2);

    // the incompatible entry is not expected to be found
    let report = eval.report(&candidate, &reference);
    assert_abs_diff_eq!(report.recall, 1.0);
    assert_abs_diff_eq!(report.precision, 1.0 / 3.0, epsilon = 1e-12);
}

// ============================================================================
// Properties
// ============================================================================

fn mapping_strategy() -> impl Strategy<Value = Mapping> {
    let source = prop::sample::select(vec!["s:A", "s:B", "s:C"]);
    let relation = prop::sample::select(vec!["t:p", "t:q"]);
    let class = prop::sample::select(vec!["t:X", "t:Y"]);
    let target = prop_oneof![
        class.clone().prop_map(Expression::class),
        relation.clone().prop_map(|p| occurrence(Expression::relation(p))),
        (relation, class).prop_map(|(p, c)| restriction(p, c)),
    ];
    let relationship = prop::sample::select(vec![
        MappingRelation::Equivalence,
        MappingRelation::Subsumes,
    ]);
    (source, target, relationship, 0.0..=1.0f64)
        .prop_map(|(s, t, r, v)| Mapping::new(Expression::class(s), t, r, v))
}

fn alignment_strategy() -> impl Strategy<Value = Alignment> {
    prop::collection::vec(mapping_strategy(), 0..8).prop_map(|v| v.into_iter().collect())
}

proptest! {
    #[test]
    fn recall_never_exceeds_precision(
        candidate in alignment_strategy(),
        reference in alignment_strategy(),
    ) {
        let sim = LexicalSimilarity::new();
        let eval = Evaluator::new(&sim).evaluate(&candidate, &reference);

        prop_assert!(eval.recall_credit <= eval.precision_credit + 1e-9);
        prop_assert!(eval.recall_credit <= reference.len() as f64 + 1e-9);
        let sum: f64 = eval.best_scores().values().sum();
        prop_assert!((sum - eval.recall_credit).abs() < 1e-9);
        for (pos, score) in eval.best_scores() {
            prop_assert!(*pos < reference.len());
            prop_assert!((0.0..=1.0).contains(score));
        }
    }

    #[test]
    fn exact_members_are_correct(
        candidate in alignment_strategy(),
        reference in alignment_strategy(),
    ) {
        let sim = LexicalSimilarity::new();
        let eval = Evaluator::new(&sim).evaluate(&candidate, &reference);

        for mapping in &candidate {
            if reference.contains(mapping) {
                prop_assert_eq!(eval.status_of(mapping), MappingStatus::Correct);
                let pos = reference.position(mapping.key()).unwrap();
                prop_assert_eq!(eval.best_scores().get(&pos), Some(&1.0));
            } else {
                prop_assert_ne!(eval.status_of(mapping), MappingStatus::Correct);
            }
        }
    }
}
