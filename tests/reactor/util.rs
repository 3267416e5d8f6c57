//! Shared builders for reactor tests.

use espalier_foundation::QName;
use espalier_source::{Source, StatementEvent};

/// A module preamble: name, namespace URI, prefix.
pub fn module(name: &str, prefix: &str) -> StatementEvent {
    StatementEvent::new("module", name)
        .with(StatementEvent::new("namespace", format!("urn:{name}")))
        .with(StatementEvent::new("prefix", prefix))
}

/// A leaf with its mandatory type.
pub fn leaf(name: &str, type_name: &str) -> StatementEvent {
    StatementEvent::new("leaf", name).with(StatementEvent::new("type", type_name))
}

/// Wraps a root statement into a source named after its argument.
pub fn src(root: StatementEvent) -> Source {
    let name = root
        .argument
        .as_deref()
        .map_or_else(|| "unnamed.esp".to_string(), |n| format!("{n}.esp"));
    Source::new(name, root)
}

/// Shorthand for a qualified name.
pub fn qn(module: &str, name: &str) -> QName {
    QName::new(module, name)
}
