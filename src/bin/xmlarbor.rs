//! Command-line front end: parse markup files, search them, and print the
//! resulting trees.

use std::fs;
use std::io::{self, Read, Write};
use std::process::ExitCode;

use clap::Parser;
use log::{debug, error, LevelFilter};

use xmlarbor::error::ErrorKind;
use xmlarbor::parser::{parse_bytes_with_options, ParseOptions};
use xmlarbor::serial::{
    serialize_content_with_options, serialize_node_with_options, SerializeOptions,
};
use xmlarbor::{Document, NodeId, SearchQuery, TreeError};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// xmlarbor -- parse, search, and re-serialize markup files.
#[derive(Parser, Debug)]
#[command(name = "xmlarbor", version, about, long_about = None)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Files to process (use `-` for stdin).
    #[arg(required = true)]
    files: Vec<String>,

    /// Log progress to stderr (repeat for more detail).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    // -- Parsing options ---------------------------------------------------
    /// Drop whitespace-only text between tags.
    #[arg(long)]
    noblanks: bool,

    /// Maximum element nesting depth.
    #[arg(long, value_name = "N", default_value_t = xmlarbor::parser::DEFAULT_MAX_DEPTH)]
    max_depth: u32,

    // -- Search ------------------------------------------------------------
    /// Print only elements with this tag name found below the root.
    #[arg(long, value_name = "NAME")]
    search: Option<String>,

    /// Print only elements whose attribute KEY equals VALUE.
    #[arg(long, value_name = "KEY=VALUE", value_parser = parse_key_value)]
    attr: Option<(String, String)>,

    /// With --search or --attr, print only the first match.
    #[arg(long)]
    first: bool,

    // -- Output options ----------------------------------------------------
    /// Print text and attribute values without escaping.
    #[arg(long)]
    raw: bool,

    /// Print only the content of each node, without its own tag.
    #[arg(long)]
    content: bool,

    /// Start the output with an XML declaration.
    #[arg(long)]
    declaration: bool,

    /// Do not print anything; only check that the input parses.
    #[arg(long)]
    noout: bool,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got `{s}`"))
}

// ---------------------------------------------------------------------------
// Exit codes
// ---------------------------------------------------------------------------

const EXIT_SUCCESS: u8 = 0;
const EXIT_PARSE_ERROR: u8 = 1;
const EXIT_IO_ERROR: u8 = 2;

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .init();

    let mut worst_exit = EXIT_SUCCESS;
    for file in &cli.files {
        let exit = match process_file(&cli, file) {
            Ok(()) => EXIT_SUCCESS,
            Err(err) => {
                error!("{file}: {err}");
                match err.kind {
                    ErrorKind::Io => EXIT_IO_ERROR,
                    _ => EXIT_PARSE_ERROR,
                }
            }
        };
        worst_exit = worst_exit.max(exit);
    }

    ExitCode::from(worst_exit)
}

/// Parses one input and writes the requested output to stdout.
fn process_file(cli: &Cli, filename: &str) -> Result<(), TreeError> {
    let bytes = read_input(filename)?;
    let options = ParseOptions::default()
        .no_blanks(cli.noblanks)
        .max_depth(cli.max_depth);
    let doc = parse_bytes_with_options(&bytes, &options)?;
    debug!("{filename}: {} nodes", doc.node_count());

    if cli.noout {
        return Ok(());
    }
    let Some(root) = doc.root_element() else {
        return Ok(());
    };

    let serialize_options = SerializeOptions::default()
        .escape(!cli.raw)
        .declaration(cli.declaration);
    let mut stdout = io::stdout().lock();
    for node in selected_nodes(cli, &doc, root) {
        let text = if cli.content {
            serialize_content_with_options(&doc, node, &serialize_options)
        } else {
            serialize_node_with_options(&doc, node, &serialize_options)
        };
        writeln!(stdout, "{text}")?;
    }
    Ok(())
}

/// The root itself, or the search results when a search was requested.
fn selected_nodes(cli: &Cli, doc: &Document, root: NodeId) -> Vec<NodeId> {
    if cli.search.is_none() && cli.attr.is_none() {
        return vec![root];
    }

    let mut query = SearchQuery::new();
    if let Some(name) = &cli.search {
        query = query.element(name);
    }
    if let Some((key, value)) = &cli.attr {
        query = query.attribute(key, value);
    }

    if cli.first {
        doc.search_first(root, &query).into_iter().collect()
    } else {
        doc.search(root, &query)
    }
}

fn read_input(filename: &str) -> Result<Vec<u8>, TreeError> {
    if filename == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        fs::read(filename)
            .map_err(|e| TreeError::new(ErrorKind::Io, format!("cannot read {filename}: {e}")))
    }
}
