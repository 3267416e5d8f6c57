//! The Espalier resolution reactor.
//!
//! Turns parsed statement sources into the immutable effective model:
//! five lockstep phases, an action queue with typed preconditions, and
//! round-based fixpoint iteration in place of any dependency graph.
//! Stalls classify themselves into the error taxonomy instead of hanging.
//!
//! The public surface is deliberately small: configure a [`Reactor`],
//! open a [`BuildSession`], feed it sources, and take the model.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod action;
mod config;
mod context;
mod copy;
mod define;
mod executor;
mod linkage;
mod materialize;
mod namespace;
mod overlay;
mod phase;
mod session;
mod typeres;
mod uses;

pub use config::ReactorLimits;
pub use phase::Phase;
pub use session::{BuildSession, Reactor};
