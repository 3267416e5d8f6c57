//! Enumeration and bits member composition.

use espalier_foundation::ErrorKind;
use espalier_types::{Builtin, DerivedType, Restrictions, TypeBase};

fn enums(members: &[(&str, Option<i64>)]) -> Restrictions {
    Restrictions {
        enums: members
            .iter()
            .map(|(name, value)| ((*name).into(), *value))
            .collect(),
        ..Restrictions::default()
    }
}

fn bits(members: &[(&str, Option<u64>)]) -> Restrictions {
    Restrictions {
        bits: members
            .iter()
            .map(|(name, position)| ((*name).into(), *position))
            .collect(),
        ..Restrictions::default()
    }
}

// =============================================================================
// Enumerations
// =============================================================================

#[test]
fn defining_link_auto_assigns_values() {
    let derived = DerivedType::compose(
        None,
        TypeBase::Builtin(Builtin::Enumeration),
        &enums(&[("up", None), ("down", Some(10)), ("testing", None)]),
    )
    .unwrap();

    let members = derived.effective_enums().unwrap();
    let values: Vec<(&str, i64)> = members
        .iter()
        .map(|m| (m.name.as_ref(), m.value))
        .collect();
    assert_eq!(values, vec![("up", 0), ("down", 10), ("testing", 11)]);
}

#[test]
fn restricting_link_selects_a_subset() {
    let base = DerivedType::compose(
        None,
        TypeBase::Builtin(Builtin::Enumeration),
        &enums(&[("up", None), ("down", None), ("testing", None)]),
    )
    .unwrap();
    let subset = DerivedType::compose(
        None,
        TypeBase::Derived(base),
        &enums(&[("up", None), ("down", None)]),
    )
    .unwrap();

    let members = subset.effective_enums().unwrap();
    assert_eq!(members.len(), 2);
    assert_eq!(members[1].value, 1, "inherited value survives the subset");
}

#[test]
fn restricting_link_may_reassign_values() {
    let base = DerivedType::compose(
        None,
        TypeBase::Builtin(Builtin::Enumeration),
        &enums(&[("up", None), ("down", None)]),
    )
    .unwrap();
    let reassigned =
        DerivedType::compose(None, TypeBase::Derived(base), &enums(&[("up", Some(7))]))
            .unwrap();
    assert_eq!(reassigned.effective_enums().unwrap()[0].value, 7);
}

#[test]
fn unknown_member_in_subset_is_rejected() {
    let base = DerivedType::compose(
        None,
        TypeBase::Builtin(Builtin::Enumeration),
        &enums(&[("up", None)]),
    )
    .unwrap();
    let err = DerivedType::compose(
        None,
        TypeBase::Derived(base),
        &enums(&[("sideways", None)]),
    )
    .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Constraint(_)));
}

#[test]
fn duplicate_member_at_definition_is_rejected() {
    let err = DerivedType::compose(
        None,
        TypeBase::Builtin(Builtin::Enumeration),
        &enums(&[("up", None), ("up", Some(3))]),
    )
    .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Constraint(_)));
}

#[test]
fn enums_do_not_apply_to_integers() {
    let err = DerivedType::compose(
        None,
        TypeBase::Builtin(Builtin::Uint8),
        &enums(&[("up", None)]),
    )
    .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Constraint(_)));
}

// =============================================================================
// Bits
// =============================================================================

#[test]
fn bit_positions_auto_assign_like_enum_values() {
    let derived = DerivedType::compose(
        None,
        TypeBase::Builtin(Builtin::Bits),
        &bits(&[("ro", None), ("rw", Some(4)), ("x", None)]),
    )
    .unwrap();

    let members = derived.effective_bits().unwrap();
    let positions: Vec<(&str, u64)> = members
        .iter()
        .map(|m| (m.name.as_ref(), m.position))
        .collect();
    assert_eq!(positions, vec![("ro", 0), ("rw", 4), ("x", 5)]);
}

#[test]
fn bits_subset_must_come_from_the_base() {
    let base = DerivedType::compose(
        None,
        TypeBase::Builtin(Builtin::Bits),
        &bits(&[("ro", None), ("rw", None)]),
    )
    .unwrap();
    let subset =
        DerivedType::compose(None, TypeBase::Derived(base.clone()), &bits(&[("ro", None)]))
            .unwrap();
    assert_eq!(subset.effective_bits().unwrap().len(), 1);

    let err = DerivedType::compose(None, TypeBase::Derived(base), &bits(&[("wx", None)]))
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Constraint(_)));
}
