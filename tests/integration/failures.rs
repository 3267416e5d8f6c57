//! Failure aggregation and kill-switch behavior.

use espalier_foundation::ErrorKind;
use espalier_reactor::{Reactor, ReactorLimits};
use espalier_source::StatementEvent;

use crate::util::{leaf, module, src};

// =============================================================================
// Aggregation
// =============================================================================

#[test]
fn independent_failures_surface_together() {
    let alpha = module("acme-alpha", "a").with(leaf("x", "no-such-type"));
    let beta = module("acme-beta", "b").with(leaf("y", "also-missing"));

    let failure = Reactor::vanilla()
        .new_build()
        .add_source(src(alpha))
        .add_source(src(beta))
        .build_effective()
        .unwrap_err();

    assert!(failure.len() >= 2, "got: {failure}");
    assert!(failure.any(|k| matches!(k, ErrorKind::CrossReference(_))));
}

#[test]
fn one_bad_source_fails_the_whole_build() {
    let good = module("acme-good", "g").with(leaf("fine", "string"));
    let bad = module("acme-bad", "b").with(
        StatementEvent::new("import", "acme-nowhere")
            .with(StatementEvent::new("prefix", "n")),
    );

    let failure = Reactor::vanilla()
        .new_build()
        .add_source(src(good))
        .add_source(src(bad))
        .build_effective()
        .unwrap_err();
    assert!(failure.any(|k| matches!(k, ErrorKind::CrossReference(_))));
}

// =============================================================================
// Round limit
// =============================================================================

#[test]
fn runaway_augment_chains_hit_the_round_limit() {
    // Declared in reverse order, each augment resolves one round after
    // the one that produces its target, so the chain needs one round
    // per link even though every round makes progress.
    let chained = module("acme-chain", "c")
        .with(StatementEvent::new("container", "a"))
        .with(StatementEvent::new("augment", "/c:a/b/d").with(leaf("tail", "string")))
        .with(
            StatementEvent::new("augment", "/c:a/b")
                .with(StatementEvent::new("container", "d")),
        )
        .with(
            StatementEvent::new("augment", "/c:a")
                .with(StatementEvent::new("container", "b")),
        );

    let reactor = Reactor::vanilla().with_limits(ReactorLimits::default().with_max_rounds(2));
    let failure = reactor
        .new_build()
        .add_source(src(chained))
        .build_effective()
        .unwrap_err();
    assert!(failure.any(|k| matches!(k, ErrorKind::Limit(_))), "got: {failure}");
}

#[test]
fn the_same_chain_finishes_under_a_generous_limit() {
    let chained = module("acme-chain", "c")
        .with(StatementEvent::new("container", "a"))
        .with(
            StatementEvent::new("augment", "/c:a/b")
                .with(StatementEvent::new("container", "d")),
        )
        .with(
            StatementEvent::new("augment", "/c:a")
                .with(StatementEvent::new("container", "b")),
        );

    let model = Reactor::vanilla()
        .new_build()
        .add_source(src(chained))
        .build_effective()
        .unwrap();
    let a = model
        .module("acme-chain")
        .unwrap()
        .data_child(&crate::util::qn("acme-chain", "a"))
        .unwrap();
    assert!(a
        .data_child(&crate::util::qn("acme-chain", "b"))
        .unwrap()
        .data_child(&crate::util::qn("acme-chain", "d"))
        .is_some());
}
