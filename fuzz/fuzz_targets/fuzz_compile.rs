#![no_main]

use dg_core::{LayoutSettings, NodeId};
use dg_layout::{layout_diagram_with_settings, longest_chain_within};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };

    let first = dg_parser::compile(source);
    assert_eq!(first, dg_parser::compile(source));

    let Ok(graph) = first else {
        return;
    };
    for (from, to) in graph.edges() {
        assert!(from.0 < graph.len() && to.0 < graph.len());
    }

    let settings = LayoutSettings {
        chain_search_step_limit: 10_000,
        ..LayoutSettings::default()
    };
    let layout = layout_diagram_with_settings(&graph, &settings);
    assert_eq!(layout.placement.len(), graph.len());

    if let Some(chain) = longest_chain_within(&graph, NodeId(0), settings.chain_search_step_limit) {
        assert_eq!(chain.first().copied(), Some(NodeId(0)));
        assert_eq!(layout.stats.chain_length, chain.len());
    }
});
