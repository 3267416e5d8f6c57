//! Statement-event sources for the Espalier reactor.
//!
//! The reactor never parses text. An external lexer/parser supplies each
//! source as a recursive tree of [`StatementEvent`]s (keyword text,
//! optional raw argument, span, ordered children) wrapped in a named
//! [`Source`]. This crate defines that input contract and a chaining
//! builder for assembling sources programmatically.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod event;

pub use event::{Source, StatementEvent};
