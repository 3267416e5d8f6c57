//! Grouping expansion, use-site independence, refines, cycles.

use espalier_foundation::ErrorKind;
use espalier_reactor::{Reactor, ReactorLimits};
use espalier_source::StatementEvent;
use espalier_vocab::Keyword;

use crate::util::{leaf, module, qn, src};

fn endpoint_grouping() -> StatementEvent {
    StatementEvent::new("grouping", "endpoint")
        .with(leaf("host", "string"))
        .with(leaf("port", "uint16"))
}

// =============================================================================
// Expansion
// =============================================================================

#[test]
fn uses_copies_grouping_content_rebound_to_the_use_site() {
    let lib = module("acme-lib", "al").with(endpoint_grouping());
    let site = module("acme-site", "as")
        .with(StatementEvent::new("import", "acme-lib").with(StatementEvent::new("prefix", "lib")))
        .with(
            StatementEvent::new("container", "server")
                .with(StatementEvent::new("uses", "lib:endpoint")),
        );

    let model = Reactor::vanilla()
        .new_build()
        .add_source(src(lib))
        .add_source(src(site))
        .build_effective()
        .unwrap();

    let server = model
        .module("acme-site")
        .unwrap()
        .data_child(&qn("acme-site", "server"))
        .unwrap();
    // Copies take the using module's namespace, not the grouping's.
    let host = server.data_child(&qn("acme-site", "host")).unwrap();
    assert_eq!(host.path().last(), Some(&qn("acme-site", "host")));
    assert!(server.data_child(&qn("acme-lib", "host")).is_none());
    // The uses marker survives next to the expansion.
    assert!(server.child_by_keyword(&Keyword::Uses).is_some());
}

#[test]
fn nested_groupings_expand_transitively() {
    let source = module("acme-net", "an")
        .with(
            StatementEvent::new("grouping", "address").with(leaf("ip", "string")),
        )
        .with(
            StatementEvent::new("grouping", "interface")
                .with(StatementEvent::new("uses", "address"))
                .with(leaf("mtu", "uint16")),
        )
        .with(
            StatementEvent::new("container", "eth0")
                .with(StatementEvent::new("uses", "interface")),
        );

    let model = Reactor::vanilla()
        .new_build()
        .add_source(src(source))
        .build_effective()
        .unwrap();

    let eth0 = model
        .module("acme-net")
        .unwrap()
        .data_child(&qn("acme-net", "eth0"))
        .unwrap();
    assert!(eth0.data_child(&qn("acme-net", "mtu")).is_some());
    assert!(
        eth0.data_child(&qn("acme-net", "ip")).is_some(),
        "inner grouping content reaches the outer use site"
    );
}

#[test]
fn grouping_references_resolve_at_the_definition_site() {
    // The grouping's leaf uses a typedef that exists only next to the
    // grouping, not at the use site.
    let lib = module("acme-lib", "al")
        .with(
            StatementEvent::new("typedef", "tiny")
                .with(StatementEvent::new("type", "uint8").with(
                    StatementEvent::new("range", "0..15"),
                )),
        )
        .with(StatementEvent::new("grouping", "knob").with(leaf("level", "tiny")));
    let site = module("acme-site", "as")
        .with(StatementEvent::new("import", "acme-lib").with(StatementEvent::new("prefix", "lib")))
        .with(StatementEvent::new("uses", "lib:knob"));

    let model = Reactor::vanilla()
        .new_build()
        .add_source(src(lib))
        .add_source(src(site))
        .build_effective()
        .unwrap();

    let level = model
        .module("acme-site")
        .unwrap()
        .data_child(&qn("acme-site", "level"))
        .unwrap();
    assert_eq!(
        level.leaf_type().unwrap().effective_ranges(),
        vec![(0, 15)]
    );
}

#[test]
fn expansion_colliding_with_a_declared_sibling_is_a_duplicate() {
    let source = module("acme-site", "as")
        .with(endpoint_grouping())
        .with(
            StatementEvent::new("container", "server")
                .with(leaf("host", "string"))
                .with(StatementEvent::new("uses", "endpoint")),
        );

    let failure = Reactor::vanilla()
        .new_build()
        .add_source(src(source))
        .build_effective()
        .unwrap_err();
    assert!(failure.any(|k| matches!(k, ErrorKind::Duplicate(_))), "got: {failure}");
}

// =============================================================================
// Use-site independence and refines
// =============================================================================

#[test]
fn refine_edits_one_site_without_touching_the_other() {
    let source = module("acme-site", "as")
        .with(endpoint_grouping())
        .with(
            StatementEvent::new("container", "plain")
                .with(StatementEvent::new("uses", "endpoint")),
        )
        .with(
            StatementEvent::new("container", "tuned").with(
                StatementEvent::new("uses", "endpoint").with(
                    StatementEvent::new("refine", "port")
                        .with(StatementEvent::new("default", "8080")),
                ),
            ),
        );

    let model = Reactor::vanilla()
        .new_build()
        .add_source(src(source))
        .build_effective()
        .unwrap();

    let site = model.module("acme-site").unwrap();
    let tuned_port = site
        .data_child(&qn("acme-site", "tuned"))
        .unwrap()
        .data_child(&qn("acme-site", "port"))
        .unwrap();
    let refined_default = tuned_port.child_by_keyword(&Keyword::Default).unwrap();
    assert_eq!(
        refined_default.arg().and_then(|a| a.as_str()).map(AsRef::as_ref),
        Some("8080")
    );

    let plain_port = site
        .data_child(&qn("acme-site", "plain"))
        .unwrap()
        .data_child(&qn("acme-site", "port"))
        .unwrap();
    assert!(
        plain_port.child_by_keyword(&Keyword::Default).is_none(),
        "the other use site is untouched"
    );
}

#[test]
fn refine_rejects_properties_foreign_to_the_target() {
    let source = module("acme-site", "as")
        .with(endpoint_grouping())
        .with(
            StatementEvent::new("uses", "endpoint").with(
                StatementEvent::new("refine", "host")
                    .with(StatementEvent::new("presence", "up")),
            ),
        );

    let failure = Reactor::vanilla()
        .new_build()
        .add_source(src(source))
        .build_effective()
        .unwrap_err();
    assert!(failure.any(|k| matches!(k, ErrorKind::Constraint(_))));
}

// =============================================================================
// Cycles
// =============================================================================

#[test]
fn mutually_recursive_groupings_report_circular() {
    let source = module("acme-loop", "lp")
        .with(
            StatementEvent::new("grouping", "a").with(StatementEvent::new("uses", "b")),
        )
        .with(
            StatementEvent::new("grouping", "b").with(StatementEvent::new("uses", "a")),
        )
        .with(StatementEvent::new("uses", "a"));

    let failure = Reactor::vanilla()
        .new_build()
        .add_source(src(source))
        .build_effective()
        .unwrap_err();
    assert!(failure.any(|k| matches!(k, ErrorKind::Circular(_))));
    assert!(
        !failure.any(|k| matches!(k, ErrorKind::Limit(_))),
        "cycles are classified, not burned through the round limit"
    );
}

#[test]
fn self_recursive_grouping_reports_circular_within_tight_limits() {
    let source = module("acme-loop", "lp").with(
        StatementEvent::new("grouping", "relay").with(StatementEvent::new("uses", "relay")),
    );

    // A handful of rounds suffices: the stall is detected, not iterated.
    let failure = Reactor::vanilla()
        .with_limits(ReactorLimits::default().with_max_rounds(8))
        .new_build()
        .add_source(src(source))
        .build_effective()
        .unwrap_err();
    assert!(failure.any(|k| matches!(k, ErrorKind::Circular(_))));
    assert!(!failure.any(|k| matches!(k, ErrorKind::Limit(_))));
}

#[test]
fn unknown_grouping_reports_cross_reference() {
    let source =
        module("acme-site", "as").with(StatementEvent::new("uses", "nonexistent"));

    let failure = Reactor::vanilla()
        .new_build()
        .add_source(src(source))
        .build_effective()
        .unwrap_err();
    assert!(failure.any(|k| matches!(k, ErrorKind::CrossReference(_))));
}
