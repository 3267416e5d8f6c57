//! Restriction composition across derivation chains.

use espalier_foundation::{ErrorKind, RangeBound, RangeExpr, RangePart};
use espalier_types::{Builtin, DerivedType, Pattern, Restrictions, TypeBase};

fn ranged(parts: &[(i128, i128)]) -> Restrictions {
    Restrictions {
        range: Some(RangeExpr::new(
            parts
                .iter()
                .map(|&(lo, hi)| RangePart::new(RangeBound::Value(lo), RangeBound::Value(hi)))
                .collect(),
        )),
        ..Restrictions::default()
    }
}

// =============================================================================
// Range narrowing
// =============================================================================

#[test]
fn each_link_narrows_within_its_base() {
    let base = DerivedType::compose(
        None,
        TypeBase::Builtin(Builtin::Uint8),
        &ranged(&[(10, 20)]),
    )
    .unwrap();
    let narrow =
        DerivedType::compose(None, TypeBase::Derived(base), &ranged(&[(12, 15)])).unwrap();

    assert_eq!(narrow.effective_ranges(), vec![(12, 15)]);
    assert!(narrow.accepts_value(12));
    assert!(!narrow.accepts_value(11));
}

#[test]
fn widening_a_base_range_is_a_constraint_violation() {
    let base = DerivedType::compose(
        None,
        TypeBase::Builtin(Builtin::Uint8),
        &ranged(&[(10, 20)]),
    )
    .unwrap();
    let err = DerivedType::compose(None, TypeBase::Derived(base), &ranged(&[(25, 30)]))
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Constraint(_)));
}

#[test]
fn min_max_resolve_against_the_immediate_base() {
    let base = DerivedType::compose(
        None,
        TypeBase::Builtin(Builtin::Int16),
        &ranged(&[(-100, 100)]),
    )
    .unwrap();
    // "min..0" re-anchors to the base's boundaries, not the builtin's.
    let delta = Restrictions {
        range: Some(RangeExpr::new(vec![RangePart::new(
            RangeBound::Min,
            RangeBound::Value(0),
        )])),
        ..Restrictions::default()
    };
    let narrowed = DerivedType::compose(None, TypeBase::Derived(base), &delta).unwrap();
    assert_eq!(narrowed.effective_ranges(), vec![(-100, 0)]);
}

#[test]
fn undeclared_links_inherit_the_nearest_restriction() {
    let restricted = DerivedType::compose(
        None,
        TypeBase::Builtin(Builtin::Uint16),
        &ranged(&[(1, 1024)]),
    )
    .unwrap();
    let passthrough = DerivedType::compose(
        None,
        TypeBase::Derived(restricted),
        &Restrictions::default(),
    )
    .unwrap();
    assert_eq!(passthrough.effective_ranges(), vec![(1, 1024)]);
    assert_eq!(passthrough.chain_depth(), 2);
}

#[test]
fn range_does_not_apply_to_string() {
    let err = DerivedType::compose(
        None,
        TypeBase::Builtin(Builtin::Str),
        &ranged(&[(1, 10)]),
    )
    .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Constraint(_)));
}

// =============================================================================
// Patterns
// =============================================================================

#[test]
fn patterns_accumulate_conjunctively() {
    let first = Restrictions {
        patterns: vec![Pattern::of("[a-z]+")],
        ..Restrictions::default()
    };
    let second = Restrictions {
        patterns: vec![Pattern::of("[a-m]+"), Pattern::inverted("forbidden")],
        ..Restrictions::default()
    };
    let base = DerivedType::compose(None, TypeBase::Builtin(Builtin::Str), &first).unwrap();
    let derived = DerivedType::compose(None, TypeBase::Derived(base), &second).unwrap();

    let effective = derived.effective_patterns();
    assert_eq!(effective.len(), 3, "every link's patterns apply");
    assert_eq!(effective[0], Pattern::of("[a-z]+"));
    assert!(effective[2].invert);
}

// =============================================================================
// Leafref and identityref carriers
// =============================================================================

#[test]
fn require_instance_defaults_true_and_inherits() {
    let leafref = DerivedType::compose(
        None,
        TypeBase::Builtin(Builtin::Leafref),
        &Restrictions {
            path: Some("../config/name".into()),
            ..Restrictions::default()
        },
    )
    .unwrap();
    assert!(leafref.require_instance());
    assert_eq!(leafref.path_expr().as_deref(), Some("../config/name"));

    let relaxed = DerivedType::compose(
        None,
        TypeBase::Derived(leafref),
        &Restrictions {
            require_instance: Some(false),
            ..Restrictions::default()
        },
    )
    .unwrap();
    assert!(!relaxed.require_instance());
    assert_eq!(
        relaxed.path_expr().as_deref(),
        Some("../config/name"),
        "path inherits through the chain"
    );
}
