#![forbid(unsafe_code)]

mod config;

pub use config::{DiagramConfig, LayoutSettings};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bracket pair wrapping a chain element; selects the rendered shape.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Enclosure {
    /// `[...]`
    Rectangle,
    /// `(...)`
    RoundedRectangle,
    /// `/.../`
    Parallelogram,
    /// `<...>`, recognized but not tied to a shape yet.
    Other,
}

impl Enclosure {
    pub const ALL: [Self; 4] = [
        Self::Rectangle,
        Self::RoundedRectangle,
        Self::Parallelogram,
        Self::Other,
    ];

    #[must_use]
    pub const fn from_opener(ch: char) -> Option<Self> {
        match ch {
            '[' => Some(Self::Rectangle),
            '(' => Some(Self::RoundedRectangle),
            '/' => Some(Self::Parallelogram),
            '<' => Some(Self::Other),
            _ => None,
        }
    }

    #[must_use]
    pub const fn opener(self) -> char {
        match self {
            Self::Rectangle => '[',
            Self::RoundedRectangle => '(',
            Self::Parallelogram => '/',
            Self::Other => '<',
        }
    }

    #[must_use]
    pub const fn closer(self) -> char {
        match self {
            Self::Rectangle => ']',
            Self::RoundedRectangle => ')',
            Self::Parallelogram => '/',
            Self::Other => '>',
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::RoundedRectangle => "rounded-rectangle",
            Self::Parallelogram => "parallelogram",
            Self::Other => "other",
        }
    }
}

/// Edge direction marker between two chain elements.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum LinkOperator {
    /// `->`
    Forward,
    /// `<-`
    Backward,
}

impl LinkOperator {
    #[must_use]
    pub fn from_token(token: &[char]) -> Option<Self> {
        match token {
            ['-', '>'] => Some(Self::Forward),
            ['<', '-'] => Some(Self::Backward),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Forward => "->",
            Self::Backward => "<-",
        }
    }

    /// Returns `(source, destination)` for `left <op> right`.
    #[must_use]
    pub fn orient<T>(self, left: T, right: T) -> (T, T) {
        match self {
            Self::Forward => (left, right),
            Self::Backward => (right, left),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NodeId(pub usize);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A graph vertex. Value and enclosure are fixed at creation; adjacency only
/// grows while the owning graph is being built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Node {
    id: NodeId,
    varname: String,
    value: String,
    enclosure: Enclosure,
    adjacents: Vec<NodeId>,
}

impl Node {
    fn new(id: NodeId, varname: String, value: String, enclosure: Enclosure) -> Self {
        Self {
            id,
            varname,
            value,
            enclosure,
            adjacents: Vec::new(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    #[must_use]
    pub fn varname(&self) -> &str {
        &self.varname
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub const fn enclosure(&self) -> Enclosure {
        self.enclosure
    }

    #[must_use]
    pub fn adjacents(&self) -> &[NodeId] {
        &self.adjacents
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} -> {}, {}",
            self.id,
            self.varname,
            self.value,
            self.enclosure.as_str()
        )
    }
}

/// The compiled diagram. Node ids are dense and equal to their index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Graph {
    nodes: Vec<Node>,
}

impl Graph {
    #[must_use]
    pub const fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Appends a node and returns its id, the next integer after the last one.
    pub fn add_node(
        &mut self,
        varname: impl Into<String>,
        value: impl Into<String>,
        enclosure: Enclosure,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes
            .push(Node::new(id, varname.into(), value.into(), enclosure));
        id
    }

    /// Appends `to` to the adjacency of `from`. Returns `false` when either id
    /// is not part of this graph.
    pub fn link(&mut self, from: NodeId, to: NodeId) -> bool {
        if to.0 >= self.nodes.len() {
            return false;
        }
        match self.nodes.get_mut(from.0) {
            Some(node) => {
                node.adjacents.push(to);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|node| node.adjacents.len()).sum()
    }

    /// All `(source, destination)` pairs in adjacency order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.nodes
            .iter()
            .flat_map(|node| node.adjacents.iter().map(move |adj| (node.id, *adj)))
    }

    #[must_use]
    pub fn find_node(&self, varname: &str, enclosure: Enclosure) -> Option<&Node> {
        self.nodes
            .iter()
            .find(|node| node.varname == varname && node.enclosure == enclosure)
    }
}

impl std::fmt::Display for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "NODES")?;
        for node in &self.nodes {
            writeln!(f, "{node}")?;
        }
        writeln!(f, "\nLINKS")?;
        for node in &self.nodes {
            let targets: Vec<String> = node.adjacents.iter().map(ToString::to_string).collect();
            writeln!(f, "{} -> [{}]", node.id, targets.join(", "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DiagramErrorCode {
    Syntax,
    DuplicateDeclaration,
    UndefinedVariable,
    LiteralCollision,
}

impl DiagramErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Syntax => "diagram/error/syntax",
            Self::DuplicateDeclaration => "diagram/error/duplicate-declaration",
            Self::UndefinedVariable => "diagram/error/undefined-variable",
            Self::LiteralCollision => "diagram/error/literal-collision",
        }
    }
}

/// A compile failure. Lines and columns are 1-indexed.
#[derive(Debug, Clone, Serialize, Deserialize, Error, PartialEq, Eq)]
pub enum DiagramError {
    #[error("SyntaxError<Line {line}, Col {col}>: {message}")]
    Syntax {
        line: usize,
        col: usize,
        message: String,
    },
    #[error("SemanticError: variable '{name}' already defined")]
    DuplicateDeclaration { line: usize, name: String },
    #[error("SemanticError: variable '{name}' is not defined")]
    UndefinedVariable { line: usize, name: String },
    #[error("SemanticError: literal '{text}' collides with an existing literal")]
    LiteralCollision { line: usize, text: String },
}

impl DiagramError {
    #[must_use]
    pub const fn code(&self) -> DiagramErrorCode {
        match self {
            Self::Syntax { .. } => DiagramErrorCode::Syntax,
            Self::DuplicateDeclaration { .. } => DiagramErrorCode::DuplicateDeclaration,
            Self::UndefinedVariable { .. } => DiagramErrorCode::UndefinedVariable,
            Self::LiteralCollision { .. } => DiagramErrorCode::LiteralCollision,
        }
    }

    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::Syntax { line, .. }
            | Self::DuplicateDeclaration { line, .. }
            | Self::UndefinedVariable { line, .. }
            | Self::LiteralCollision { line, .. } => *line,
        }
    }

    /// Only syntax errors carry a column.
    #[must_use]
    pub const fn column(&self) -> Option<usize> {
        match self {
            Self::Syntax { col, .. } => Some(*col),
            _ => None,
        }
    }
}
