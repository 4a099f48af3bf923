//! CLI argument parsing using clap.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// PDF question answering
#[derive(Parser)]
#[command(
    name = "pdfqa",
    version = env!("CARGO_PKG_VERSION"),
    about = "Upload PDFs and ask questions about them",
    long_about = "Extract text from PDF files, store it, and answer questions about it with a hosted language model.",
    next_line_help = true,
    styles = clap_cargo_style()
)]
pub struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Initialize project
    #[command(about = "Set up .pdfqa directory with default configuration")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Show current configuration settings
    #[command(about = "Display active settings")]
    Config,

    /// Start the HTTP API
    #[command(
        about = "Start HTTP server",
        after_help = "Examples:\n  pdfqa serve\n  pdfqa serve --bind 0.0.0.0:8000"
    )]
    Serve {
        /// Address to bind (overrides server.bind)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Print the text extracted from a PDF
    #[command(about = "Extract and print text from a PDF without storing it")]
    Extract {
        /// PDF file to read
        #[arg(value_name = "PDF")]
        path: PathBuf,
    },

    /// Store a local PDF
    #[command(about = "Copy a PDF into the upload directory and store its text")]
    Add {
        /// PDF file to add
        #[arg(value_name = "PDF")]
        path: PathBuf,
    },

    /// List stored documents
    #[command(about = "List stored documents")]
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove a stored document
    #[command(about = "Delete a document and its stored file")]
    Remove {
        /// Document id
        id: i64,
    },

    /// Ask a question about a stored document
    #[command(
        about = "Answer a question from a document's text",
        after_help = "Examples:\n  pdfqa ask 3 \"What is the main conclusion?\""
    )]
    Ask {
        /// Document id
        id: i64,

        /// Question text
        question: String,
    },

    /// Suggest questions for a stored document
    #[command(about = "Suggest questions a reader might ask about a document")]
    Suggest {
        /// Document id
        id: i64,
    },

    /// Check the document database
    #[command(about = "Verify database connectivity, table, and columns")]
    CheckDb {
        /// Create the table and index if missing
        #[arg(long)]
        repair: bool,
    },
}
