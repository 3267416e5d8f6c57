//! Core identifiers, argument values, and error types for Espalier.
//!
//! This crate provides:
//! - [`Span`] / [`SourceRef`] - Source positions for diagnostics
//! - [`QName`] / [`SchemaPath`] - Qualified statement identity
//! - [`Arg`] - The resolved (typed) statement argument value
//! - [`Error`] / [`BuildFailure`] - The build error taxonomy and the
//!   aggregated failure report

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod arg;
mod error;
mod ident;
mod span;

pub use arg::{Arg, DeviateKind, OrderedBy, RangeBound, RangeExpr, RangePart, RefArg, Status};
pub use error::{BuildFailure, Error, ErrorKind, Result};
pub use ident::{QName, SchemaPath};
pub use span::{SourceRef, Span};
