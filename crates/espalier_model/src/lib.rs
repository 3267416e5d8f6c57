//! Immutable output models for Espalier.
//!
//! Two views of a build come out of the reactor: the [`DeclaredModel`]
//! (statements exactly as written) and the [`EffectiveModel`] (the fully
//! resolved schema the rest of the world consumes). Both are persistent
//! trees: cloning is O(1) and nothing in them can be mutated.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod declared;
mod effective;

pub use declared::{DeclaredModel, DeclaredStmt};
pub use effective::{EffectiveModel, EffectiveStmt};
