//! Statement vocabulary for Espalier.
//!
//! Maps statement keywords to the capability records the reactor consults:
//! argument parsing ([`ArgRule`]), substatement cardinality, inheritance
//! behavior ([`CopyPolicy`]), and namespace registration ([`DefKind`]).
//! The [`Vocabulary`] registry is closed but extensible: the vanilla set
//! ships complete, and callers may register further kinds.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod keyword;
mod parse;
mod support;
mod vocabulary;

pub use keyword::Keyword;
pub use parse::{ArgRule, PrefixScope};
pub use support::{Cardinality, CopyPolicy, DefKind, StatementSupport};
pub use vocabulary::Vocabulary;
