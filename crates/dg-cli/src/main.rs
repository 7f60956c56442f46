#![forbid(unsafe_code)]

//! Chain-diagram CLI.
//!
//! # Commands
//!
//! - `compile`: Output the compiled graph as JSON or text
//! - `chain`: Print the longest chain from a start node
//! - `layout`: Output the single-column layout as JSON
//! - `validate`: Check input and report the first error

use std::io::{self, Read};
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use dg_core::{DiagramConfig, DiagramError, Graph, NodeId};
use dg_layout::{layout_diagram_with_settings, longest_chain_from};
use dg_parser::{compile, compile_evidence_json};
use serde::Serialize;
use tracing::{debug, info};

/// Chain-diagram CLI - compile diagram source into graphs and layouts.
#[derive(Debug, Parser)]
#[command(
    name = "dg-cli",
    version,
    about = "Compile chain-diagram source into graphs, chains, and layouts",
    long_about = "Compiles line-oriented diagram source such as\n\n    \
        start := \"Begin\"\n    [start] -> (\"Work\") -> /\"Output\"/\n\n\
        into a directed graph of shaped nodes."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging (can be repeated for more detail: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compile source and print the graph.
    Compile {
        /// Input file path, "-" for stdin, or inline source.
        #[arg(default_value = "-")]
        input: String,

        /// Output the full graph instead of a summary
        #[arg(long)]
        full: bool,

        /// Print the NODES / LINKS text listing
        #[arg(long, conflicts_with = "full")]
        text: bool,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Print the longest chain of nodes from a start node.
    Chain {
        /// Input file path, "-" for stdin, or inline source.
        #[arg(default_value = "-")]
        input: String,

        /// Id of the node the chain starts from
        #[arg(short, long, default_value_t = 0)]
        start: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Lay the graph out in a single column and print it as JSON.
    Layout {
        /// Input file path, "-" for stdin, or inline source.
        #[arg(default_value = "-")]
        input: String,

        /// TOML file with a [layout] section
        #[arg(short, long)]
        config: Option<String>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Validate source and report the first error.
    Validate {
        /// Input file path, "-" for stdin, or inline source.
        #[arg(default_value = "-")]
        input: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Result of deriving a chain.
#[derive(Debug, Serialize)]
struct ChainResult {
    start: usize,
    length: usize,
    node_ids: Vec<NodeId>,
    values: Vec<String>,
}

/// Result of validating diagram source.
#[derive(Debug, Serialize)]
struct ValidateResult {
    valid: bool,
    node_count: usize,
    edge_count: usize,
    error: Option<ValidationError>,
    compile_time_ms: f64,
}

#[derive(Debug, Serialize)]
struct ValidationError {
    code: String,
    message: String,
    line: usize,
    column: Option<usize>,
}

impl From<&DiagramError> for ValidationError {
    fn from(err: &DiagramError) -> Self {
        Self {
            code: err.code().as_str().to_string(),
            message: err.to_string(),
            line: err.line(),
            column: err.column(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Command::Compile {
            input,
            full,
            text,
            pretty,
        } => cmd_compile(&input, full, text, pretty),

        Command::Chain { input, start, json } => cmd_chain(&input, start, json),

        Command::Layout {
            input,
            config,
            pretty,
        } => cmd_layout(&input, config.as_deref(), pretty),

        Command::Validate { input, json } => cmd_validate(&input, json),
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_writer(io::stderr)
        .try_init();
}

fn load_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else if Path::new(input).exists() {
        std::fs::read_to_string(input).context(format!("Failed to read file: {input}"))
    } else {
        // Treat as inline diagram source
        Ok(input.to_string())
    }
}

fn load_config(path: Option<&str>) -> Result<DiagramConfig> {
    let Some(path) = path else {
        return Ok(DiagramConfig::default());
    };
    let raw = std::fs::read_to_string(path).context(format!("Failed to read config: {path}"))?;
    let config: DiagramConfig =
        toml::from_str(&raw).context(format!("Invalid config file: {path}"))?;
    info!("Loaded config from: {path}");
    Ok(config)
}

fn compile_source(input: &str) -> Result<Graph> {
    let source = load_input(input)?;
    let graph = compile(&source)?;
    Ok(graph)
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let output = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(output)
}

// =============================================================================
// Command: compile
// =============================================================================

fn cmd_compile(input: &str, full: bool, text: bool, pretty: bool) -> Result<()> {
    let graph = compile_source(input)?;

    if text {
        print!("{graph}");
        return Ok(());
    }

    let output = if full {
        to_json(&graph, pretty)?
    } else if pretty {
        let value: serde_json::Value = serde_json::from_str(&compile_evidence_json(&graph))?;
        serde_json::to_string_pretty(&value)?
    } else {
        compile_evidence_json(&graph)
    };

    println!("{output}");
    Ok(())
}

// =============================================================================
// Command: chain
// =============================================================================

fn cmd_chain(input: &str, start: usize, json_output: bool) -> Result<()> {
    let graph = compile_source(input)?;
    let result = chain_result(&graph, start)?;

    if json_output {
        println!("{}", to_json(&result, true)?);
    } else {
        println!("{}", result.values.join(" -> "));
    }
    Ok(())
}

fn chain_result(graph: &Graph, start: usize) -> Result<ChainResult> {
    if start >= graph.len() {
        bail!(
            "start node {start} does not exist (graph has {} nodes)",
            graph.len()
        );
    }

    let chain = longest_chain_from(graph, NodeId(start));
    let values = chain
        .iter()
        .filter_map(|id| graph.get_node(*id))
        .map(|node| node.value().to_string())
        .collect();
    debug!(start, length = chain.len(), "derived chain");

    Ok(ChainResult {
        start,
        length: chain.len(),
        node_ids: chain,
        values,
    })
}

// =============================================================================
// Command: layout
// =============================================================================

fn cmd_layout(input: &str, config_path: Option<&str>, pretty: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let graph = compile_source(input)?;
    let layout = layout_diagram_with_settings(&graph, &config.layout);
    println!("{}", to_json(&layout, pretty)?);
    Ok(())
}

// =============================================================================
// Command: validate
// =============================================================================

fn cmd_validate(input: &str, json_output: bool) -> Result<()> {
    let source = load_input(input)?;
    let result = validate_source(&source);

    if json_output {
        println!("{}", to_json(&result, true)?);
    } else if let Some(err) = &result.error {
        println!("✗ Invalid diagram");
        println!("{}", describe_error(err));
    } else {
        println!("✓ Valid diagram");
        println!("  Nodes: {}", result.node_count);
        println!("  Edges: {}", result.edge_count);
    }

    if !result.valid {
        std::process::exit(1);
    }

    Ok(())
}

fn describe_error(err: &ValidationError) -> String {
    format!("  line {}: [{}] {}", err.line, err.code, err.message)
}

fn validate_source(source: &str) -> ValidateResult {
    let started = Instant::now();
    let compiled = compile(source);
    let compile_time_ms = started.elapsed().as_secs_f64() * 1000.0;

    match compiled {
        Ok(graph) => ValidateResult {
            valid: true,
            node_count: graph.len(),
            edge_count: graph.edge_count(),
            error: None,
            compile_time_ms,
        },
        Err(err) => ValidateResult {
            valid: false,
            node_count: 0,
            edge_count: 0,
            error: Some(ValidationError::from(&err)),
            compile_time_ms,
        },
    }
}

// =============================================================================
// Tests
// =============================================================================
