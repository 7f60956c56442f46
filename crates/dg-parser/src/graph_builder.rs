use dg_core::{DiagramError, Enclosure, Graph, NodeId};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

use crate::grammar::{Chain, ChainElement, Declaration, ElementKind};

const LITERAL_PRIME: u64 = 307;
const LITERAL_MODULUS: u64 = 87_178_291_199;

/// Variable name synthesized for an inline literal.
///
/// Polynomial hash of `text` followed by the enclosure opener:
/// `sum(code_point(s[i]) * 307^i) mod 87178291199`, in decimal.
#[must_use]
pub fn literal_name(text: &str, enclosure: Enclosure) -> String {
    let mut hash = 0_u64;
    let mut power = 1_u64;
    for ch in text.chars().chain(std::iter::once(enclosure.opener())) {
        hash = (hash + u64::from(ch) * power) % LITERAL_MODULUS;
        power = power * LITERAL_PRIME % LITERAL_MODULUS;
    }
    hash.to_string()
}

/// Name → value bindings for one compile, declared and synthesized alike.
#[derive(Debug, Clone, Default)]
pub struct VariableTable {
    values: FxHashMap<String, String>,
}

impl VariableTable {
    /// Returns `false` when `name` is already bound.
    pub fn declare(&mut self, name: &str, value: &str) -> bool {
        if self.values.contains_key(name) {
            return false;
        }
        self.values.insert(name.to_string(), value.to_string());
        true
    }

    /// Binds a synthesized literal name. Rebinding to the same text is a
    /// no-op; returns `false` only when the name already holds other text.
    pub fn bind_literal(&mut self, name: &str, text: &str) -> bool {
        match self.values.get(name) {
            Some(existing) => existing == text,
            None => {
                self.values.insert(name.to_string(), text.to_string());
                true
            }
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Node identity before ids are assigned: enclosure plus resolved name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedKey {
    pub enclosure: Enclosure,
    pub name: String,
}

/// Source key → destinations, in first-seen source order and per-line
/// insertion order. Duplicate edges are kept. Every key carries the line it
/// was added on.
#[derive(Debug, Clone, Default)]
pub struct EdgeTable {
    entries: Vec<EdgeEntry>,
    index_by_source: FxHashMap<ResolvedKey, usize>,
}

#[derive(Debug, Clone)]
struct EdgeEntry {
    source: ResolvedKey,
    line: usize,
    destinations: Vec<(ResolvedKey, usize)>,
}

impl EdgeTable {
    pub fn push(&mut self, source: ResolvedKey, destination: ResolvedKey, line: usize) {
        let slot = self.source_slot(source, line);
        self.entries[slot].destinations.push((destination, line));
    }

    /// Registers `source` without adding an edge.
    pub fn touch(&mut self, source: ResolvedKey, line: usize) {
        let _ = self.source_slot(source, line);
    }

    fn source_slot(&mut self, source: ResolvedKey, line: usize) -> usize {
        if let Some(slot) = self.index_by_source.get(&source).copied() {
            return slot;
        }
        let slot = self.entries.len();
        self.index_by_source.insert(source.clone(), slot);
        self.entries.push(EdgeEntry {
            source,
            line,
            destinations: Vec::new(),
        });
        slot
    }

    /// `((source, line), destinations)` per source, where the line is the one
    /// the source was first seen on.
    pub fn iter(
        &self,
    ) -> impl Iterator<Item = ((&ResolvedKey, usize), &[(ResolvedKey, usize)])> {
        self.entries
            .iter()
            .map(|entry| ((&entry.source, entry.line), entry.destinations.as_slice()))
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.entries.iter().map(|entry| entry.destinations.len()).sum()
    }
}

/// Accumulates statements line by line and resolves them into a [`Graph`].
pub(crate) struct GraphBuilder {
    variables: VariableTable,
    edges: EdgeTable,
    /// First line each referenced name appeared on, in encounter order.
    references: Vec<(String, usize)>,
    seen_references: FxHashSet<String>,
}

impl GraphBuilder {
    pub(crate) fn new() -> Self {
        Self {
            variables: VariableTable::default(),
            edges: EdgeTable::default(),
            references: Vec::new(),
            seen_references: FxHashSet::default(),
        }
    }

    pub(crate) fn declare(
        &mut self,
        declaration: &Declaration,
        line: usize,
    ) -> Result<(), DiagramError> {
        if !self.variables.declare(&declaration.name, &declaration.value) {
            return Err(DiagramError::DuplicateDeclaration {
                line,
                name: declaration.name.clone(),
            });
        }
        trace!(line, name = %declaration.name, "declared variable");
        Ok(())
    }

    pub(crate) fn add_chain(&mut self, chain: &Chain, line: usize) -> Result<(), DiagramError> {
        let keys = chain
            .elements
            .iter()
            .map(|element| self.resolve(element, line))
            .collect::<Result<Vec<_>, _>>()?;

        if let [only] = keys.as_slice() {
            self.edges.touch(only.clone(), line);
            return Ok(());
        }

        for (pair, operator) in keys.windows(2).zip(&chain.operators) {
            let (source, destination) = operator.orient(&pair[0], &pair[1]);
            self.edges.push(source.clone(), destination.clone(), line);
        }
        trace!(line, links = chain.operators.len(), "added chain");
        Ok(())
    }

    fn resolve(
        &mut self,
        element: &ChainElement,
        line: usize,
    ) -> Result<ResolvedKey, DiagramError> {
        let name = match element.kind {
            ElementKind::Literal => {
                let name = literal_name(&element.text, element.enclosure);
                if !self.variables.bind_literal(&name, &element.text) {
                    return Err(DiagramError::LiteralCollision {
                        line,
                        text: element.text.clone(),
                    });
                }
                name
            }
            ElementKind::Reference => {
                if self.seen_references.insert(element.text.clone()) {
                    self.references.push((element.text.clone(), line));
                }
                element.text.clone()
            }
        };
        Ok(ResolvedKey {
            enclosure: element.enclosure,
            name,
        })
    }

    pub(crate) fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub(crate) fn edge_count(&self) -> usize {
        self.edges.edge_count()
    }

    /// Checks every reference is bound, then creates nodes lazily in edge-table
    /// order. Ids come from the graph under construction, so they always start
    /// at zero for a fresh builder.
    pub(crate) fn finish(self) -> Result<Graph, DiagramError> {
        if let Some((name, line)) = self
            .references
            .iter()
            .find(|(name, _)| self.variables.get(name).is_none())
        {
            return Err(DiagramError::UndefinedVariable {
                line: *line,
                name: name.clone(),
            });
        }

        let mut graph = Graph::new();
        let mut node_by_key: FxHashMap<&ResolvedKey, NodeId> = FxHashMap::default();

        for ((source, source_line), destinations) in self.edges.iter() {
            let from = self.intern(&mut graph, &mut node_by_key, source, source_line)?;
            for (destination, line) in destinations {
                let to = self.intern(&mut graph, &mut node_by_key, destination, *line)?;
                let linked = graph.link(from, to);
                debug_assert!(linked, "builder produced an unknown node id");
            }
        }

        Ok(graph)
    }

    fn intern<'a>(
        &self,
        graph: &mut Graph,
        node_by_key: &mut FxHashMap<&'a ResolvedKey, NodeId>,
        key: &'a ResolvedKey,
        line: usize,
    ) -> Result<NodeId, DiagramError> {
        if let Some(id) = node_by_key.get(key).copied() {
            return Ok(id);
        }
        let Some(value) = self.variables.get(&key.name) else {
            debug_assert!(false, "`{}` was not caught by the reference check", key.name);
            return Err(DiagramError::UndefinedVariable {
                line,
                name: key.name.clone(),
            });
        };
        let id = graph.add_node(key.name.as_str(), value, key.enclosure);
        node_by_key.insert(key, id);
        Ok(id)
    }
}
