//! Tsuzuri command-line inspector.
//!
//! ## Usage
//!
//! ```bash
//! # Show an entry's blocks with session dividers recomputed
//! tsuzuri dividers entry.json
//!
//! # Replay the last session (or session N) with added words marked [+ … +]
//! tsuzuri replay entry.json
//! tsuzuri replay entry.json --index 0
//!
//! # Use a RON config for thresholds and time format
//! tsuzuri --config journal.ron dividers entry.json
//! ```
//!
//! Logs go to stderr; set `RUST_LOG=tsuzuri=debug` for engine detail.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use tsuzuri_doc::Tree;
use tsuzuri_journal::{ChangeKind, DiffFrame, Journal, JournalConfig, JournalEntry};
use tsuzuri_types::NodeKind;

#[derive(Parser, Debug)]
#[command(name = "tsuzuri")]
#[command(about = "Inspect session-attributed journal entries")]
struct Args {
    /// RON config file (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the entry's blocks with dividers brought up to date
    Dividers {
        /// Entry JSON file
        entry: PathBuf,
    },
    /// Print the replay frame for one session
    Replay {
        /// Entry JSON file
        entry: PathBuf,
        /// Session position (0-based); defaults to the last session
        #[arg(long)]
        index: Option<usize>,
    },
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => JournalConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => JournalConfig::default(),
    };

    match args.command {
        Command::Dividers { entry } => {
            let journal = Journal::open(load_entry(&entry)?, config)?;
            for line in outline(&journal.tree()) {
                println!("{line}");
            }
        }
        Command::Replay { entry, index } => {
            let journal = Journal::open(load_entry(&entry)?, config)?;
            let mut tt = journal.time_travel();
            if tt.is_empty() {
                bail!("entry has no sessions to replay");
            }
            if let Some(index) = index {
                if index >= tt.len() {
                    bail!("session index {index} out of range (entry has {})", tt.len());
                }
                tt.jump_to(index as f64);
            }
            let frame = tt.frame().context("no frame for the selected session")?;
            println!("{}", render_frame(&frame));
        }
    }
    Ok(())
}

fn load_entry(path: &Path) -> Result<JournalEntry> {
    tracing::debug!(path = %path.display(), "loading entry");
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    JournalEntry::from_json(&json).with_context(|| format!("failed to parse {}", path.display()))
}

/// One line per top-level block.
fn outline(tree: &Tree) -> Vec<String> {
    tree.blocks()
        .iter()
        .filter_map(|id| {
            let kind = tree.kind(*id)?;
            let text = tree.text_content(*id).replace('\n', " ⏎ ");
            Some(match kind {
                NodeKind::Divider(label) => {
                    format!("── session {} · {} ──", label.session_index, label.display())
                }
                NodeKind::Paragraph { session_id: Some(s) } => format!("[s{s}] {text}"),
                NodeKind::Paragraph { session_id: None } => format!("[--] {text}"),
                other => format!("[{}] {text}", other.node_type()),
            })
        })
        .collect()
}

/// Header line, then the snapshot text with added runs wrapped in `[+ +]`.
fn render_frame(frame: &DiffFrame) -> String {
    let mut header = format!("session {} · {}", frame.session_index, frame.time_label);
    if !frame.duration_label.is_empty() {
        header.push_str(&format!(" · {}", frame.duration_label));
    }

    let body: String = frame
        .segments
        .iter()
        .map(|s| match s.kind {
            ChangeKind::Added => format!("[+{}+]", s.text),
            ChangeKind::Unchanged => s.text.clone(),
        })
        .collect();
    format!("{header}\n\n{body}")
}

// ============================================================================
// Tests
// ============================================================================
