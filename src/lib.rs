//! Espalier - Statement resolution reactor
//!
//! This crate re-exports all layers of the Espalier system for convenient
//! access. For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: espalier_reactor    - Phase executor, namespaces, copy
//!                                machinery, materializer
//! Layer 2: espalier_model      - Declared and effective output models
//!          espalier_types      - Builtin types, restriction composition
//! Layer 1: espalier_vocab      - Statement vocabulary and argument rules
//!          espalier_source     - Statement-event sources
//! Layer 0: espalier_foundation - Core types (QName, Arg, Error)
//! ```

pub use espalier_foundation as foundation;
pub use espalier_model as model;
pub use espalier_reactor as reactor;
pub use espalier_source as source;
pub use espalier_types as types;
pub use espalier_vocab as vocab;
