//! Whole-build integration tests.
//!
//! Multi-source builds exercising linkage, expansion, type resolution,
//! and overlays together, plus the failure-reporting guarantees.

mod failures;
mod full_build;
