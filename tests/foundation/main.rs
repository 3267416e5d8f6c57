//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: QName, SchemaPath, Arg, and the error report.

mod idents;
