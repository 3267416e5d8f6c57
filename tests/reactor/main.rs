//! Integration tests for the resolution reactor.
//!
//! Tests for linkage, grouping expansion, type resolution, and the
//! augment/deviation overlays, driving the public session API only.

mod expansion;
mod overlays;
mod resolution;
mod util;
