//! Type restriction composition engine for Espalier.
//!
//! Builds a [`DerivedType`] from a base type plus an ordered restriction
//! delta, validating that every restriction narrows its base. Chains are
//! immutable base-linked records; effective constraints are flattened on
//! demand by the `effective_*` queries.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod builtin;
mod constraint;
mod derived;

pub use builtin::Builtin;
pub use constraint::{
    BitMember, EnumMember, Pattern, Restrictions, display_parts, parts_contain, resolve_ranges,
};
pub use derived::{DerivedType, TypeBase};
