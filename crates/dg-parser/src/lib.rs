#![forbid(unsafe_code)]

mod grammar;
mod graph_builder;
mod scanner;

use dg_core::{DiagramError, Enclosure, Graph};
use serde_json::json;
use tracing::{debug, trace};

pub use grammar::{
    Chain, ChainElement, Declaration, ElementKind, Statement, deepest_of, parse_chain,
    parse_declaration, parse_statement,
};
pub use graph_builder::{EdgeTable, ResolvedKey, VariableTable, literal_name};
pub use scanner::{
    ScanError, ScanResult, scan_enclosed_literal, scan_enclosed_reference, scan_letters,
    scan_quoted, skip_blank, strip_comment,
};

/// Compiles diagram source into a graph.
///
/// Lines are handled in order; the first syntax or duplicate-declaration error
/// aborts the compile. References are resolved once every line has been read,
/// so a declaration may follow its first use.
///
/// # Errors
///
/// Returns the first [`DiagramError`] encountered; no partial graph is kept.
pub fn compile(input: &str) -> Result<Graph, DiagramError> {
    let mut builder = graph_builder::GraphBuilder::new();

    for (index, raw_line) in input.lines().enumerate() {
        let line_number = index + 1;
        let Some((line, indent)) = significant_line(raw_line) else {
            continue;
        };

        let statement = parse_statement(&line).map_err(|err| DiagramError::Syntax {
            line: line_number,
            col: indent + err.pos + 1,
            message: err.message.to_string(),
        })?;

        match statement {
            Statement::Declaration(declaration) => builder.declare(&declaration, line_number)?,
            Statement::Chain(chain) => builder.add_chain(&chain, line_number)?,
        }
    }

    debug!(
        variables = builder.variable_count(),
        edges = builder.edge_count(),
        "parsed diagram source"
    );

    let graph = builder.finish()?;
    debug!(
        nodes = graph.len(),
        edges = graph.edge_count(),
        "built diagram graph"
    );
    Ok(graph)
}

/// Trimmed, comment-free chars of a line plus the count of leading blanks,
/// or `None` for blank and comment-only lines.
fn significant_line(raw_line: &str) -> Option<(Vec<char>, usize)> {
    let trimmed = raw_line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        trace!(line = raw_line, "skipping line");
        return None;
    }
    let indent = raw_line
        .chars()
        .take_while(|ch| ch.is_whitespace())
        .count();
    let chars: Vec<char> = trimmed.chars().collect();
    Some((strip_comment(&chars).to_vec(), indent))
}

#[must_use]
pub fn compile_evidence_json(graph: &Graph) -> String {
    let count = |enclosure: Enclosure| {
        graph
            .nodes()
            .iter()
            .filter(|node| node.enclosure() == enclosure)
            .count()
    };
    json!({
        "node_count": graph.len(),
        "edge_count": graph.edge_count(),
        "rectangle_count": count(Enclosure::Rectangle),
        "rounded_rectangle_count": count(Enclosure::RoundedRectangle),
        "parallelogram_count": count(Enclosure::Parallelogram),
        "other_count": count(Enclosure::Other),
    })
    .to_string()
}
