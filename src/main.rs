//! issuebook — maintain a markdown troubleshooting knowledge base.
//!
//! The knowledge base is a directory with `quick-reference/`,
//! `platform-specific/` and `detailed-guides/` folders of markdown documents
//! and a `README.md` index. Subcommands:
//!
//! - **add**: append a templated issue section and bump the index counter
//! - **search**: substring search by term or tag, with grep-style excerpts
//! - **stats**: recount issues and rewrite the index statistics
//! - **toc**: insert or refresh a table of contents in markdown files

mod append;
mod error;
mod index;
mod layout;
mod model;
mod parser;
mod prompt;
mod render;
mod search;
mod slug;
mod store;
mod toc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::append::{AppendRequest, IndexMode};
use crate::index::IndexUpdate;
use crate::layout::Layout;
use crate::search::{SearchOptions, SearchOutcome, SearchPlan};
use crate::store::Store;
use crate::toc::{TocOptions, TocUpdate};

#[derive(Parser)]
#[command(
    name = "issuebook",
    version,
    about = "Append, search and index issues in a markdown troubleshooting knowledge base"
)]
struct Cli {
    /// Knowledge base root (holds README.md and the issue directories)
    #[arg(long, global = true, env = "ISSUEBOOK_ROOT", default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Append a new issue section to a document
    Add(AddArgs),
    /// Search documents by free text or tag
    Search(SearchArgs),
    /// Recount issues and rewrite the statistics in README.md
    Stats,
    /// Insert or refresh a table of contents in markdown files
    Toc(TocArgs),
}

#[derive(Args)]
struct AddArgs {
    /// Issue title (the problem statement)
    #[arg(required_unless_present = "interactive")]
    title: Option<String>,

    /// Target document; relative paths start at the knowledge base root
    #[arg(short = 'f', long = "file")]
    file: Option<PathBuf>,

    /// Category used to pick the document when --file is not given
    #[arg(short = 'c', long)]
    category: Option<String>,

    /// Tags, comma separated or repeated. E.g. -t '#docker,#ports'
    #[arg(short = 't', long = "tags", value_delimiter = ',')]
    tags: Vec<String>,

    /// Prompt for every field not given on the command line
    #[arg(short = 'i', long)]
    interactive: bool,

    /// Recompute all statistics instead of incrementing Total Issues
    #[arg(long)]
    recount: bool,
}

#[derive(Args)]
struct SearchArgs {
    /// Free-text term (case-insensitive substring by default)
    term: Option<String>,

    /// Search for a tag instead of a term; '#' is added when missing
    #[arg(short = 't', long, conflicts_with = "term")]
    tag: Option<String>,

    /// Only search documents whose path contains this category
    #[arg(short = 'c', long)]
    category: Option<String>,

    /// Print matching file paths only
    #[arg(short = 'l', long)]
    files_only: bool,

    /// Print matching files with hit counts but no excerpts
    #[arg(short = 'n', long)]
    no_content: bool,

    /// Match case exactly
    #[arg(short = 's', long)]
    case_sensitive: bool,
}

#[derive(Args)]
struct TocArgs {
    /// Markdown file or directory
    path: PathBuf,

    /// Deepest heading level to include
    #[arg(long, default_value_t = 6)]
    max_depth: usize,

    /// Shallowest heading level to include
    #[arg(long, default_value_t = 1)]
    min_depth: usize,

    /// Insert a new table of contents after this text
    #[arg(long)]
    insert_after: Option<String>,

    /// Process markdown files in subdirectories too
    #[arg(short = 'r', long)]
    recursive: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let store = Store::new(Layout::new(&cli.root));
    match cli.command {
        Command::Add(args) => run_add(&store, args),
        Command::Search(args) => run_search(&store, args),
        Command::Stats => run_stats(&store),
        Command::Toc(args) => run_toc(&args),
    }
}

/// Warnings and diagnostics go to stderr; `RUST_LOG` overrides the default
/// `warn` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .init();
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

fn run_add(store: &Store, args: AddArgs) -> Result<()> {
    let mut request = AppendRequest {
        title: args.title.unwrap_or_default(),
        target: args.file,
        category: args.category,
        tags: args.tags,
        index_mode: if args.recount {
            IndexMode::Recount
        } else {
            IndexMode::Increment
        },
    };

    if args.interactive {
        let stdin = io::stdin();
        prompt::fill_request(&mut request, &mut stdin.lock(), &mut io::stdout())
            .context("failed to read interactive input")?;
    }

    let outcome = append::append(store, &request, today())?;
    let layout = store.layout();
    println!(
        "{} '{}' to {} (id: {})",
        if outcome.created { "Created document and added" } else { "Added" },
        request.title.trim(),
        layout.display_path(&outcome.path),
        outcome.id
    );
    match outcome.index {
        IndexUpdate::Incremented { from, to } => println!("Total Issues: {} -> {}", from, to),
        IndexUpdate::Recounted(stats) => println!(
            "Statistics recounted: {} total, {} quick fixes, {} detailed guides",
            stats.total(),
            stats.quick_fixes,
            stats.detailed_guides
        ),
        // The section is written; only the index was left as it was.
        IndexUpdate::Skipped(e) => warn!("{}", e),
    }
    Ok(())
}

fn run_search(store: &Store, args: SearchArgs) -> Result<()> {
    let options = SearchOptions {
        term: args.term,
        tag: args.tag,
        category: args.category,
        files_only: args.files_only,
        no_content: args.no_content,
        case_sensitive: args.case_sensitive,
    };

    let scan = match search::plan(store, &options)? {
        SearchPlan::Suggest(examples) => {
            println!("Give a search term or --tag. Examples:\n");
            for example in examples {
                println!("  {}", example);
            }
            return Ok(());
        }
        SearchPlan::Scan(scan) => scan,
    };

    let layout = store.layout();
    let outcome = scan.drain(|m| {
        let shown = layout.display_path(&m.path);
        if options.files_only {
            println!("{}", shown);
        } else if options.no_content {
            println!("{} ({} matching lines)", shown, m.hits);
        } else {
            println!("==> {} <==", shown);
            for line in &m.excerpt {
                if line.gap_before {
                    println!("--");
                }
                let sep = if line.is_match { ':' } else { '-' };
                println!("{}{}{}", line.number, sep, line.text);
            }
            println!();
        }
    });

    let summary = match outcome {
        SearchOutcome::Found { documents, scanned } => format!(
            "Found {} matching documents ({} searched)",
            documents, scanned
        ),
        SearchOutcome::NoResults { scanned } => format!(
            "No results found for '{}' ({} documents searched)",
            scan.needle(),
            scanned
        ),
    };
    // Keep stdout a plain path list in files-only mode.
    if options.files_only {
        eprintln!("{}", summary);
    } else {
        println!("{}", summary);
    }
    Ok(())
}

fn run_stats(store: &Store) -> Result<()> {
    let stats = index::recount(store, today())?;
    println!("Total Issues: {}", stats.total());
    println!("Quick Fixes: {}", stats.quick_fixes);
    println!("Detailed Guides: {}", stats.detailed_guides);
    println!("Platform Notes: {}", stats.platform_notes);
    Ok(())
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("md"))
}

/// Markdown files directly in `dir`, or anywhere below it with `recursive`.
fn markdown_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let base = dir
        .to_str()
        .with_context(|| format!("path is not valid UTF-8: {}", dir.display()))?;
    let suffix = if recursive { "**/*.md" } else { "*.md" };
    let pattern = format!("{}/{}", glob::Pattern::escape(base), suffix);
    let mut files: Vec<PathBuf> = glob::glob(&pattern)
        .with_context(|| format!("invalid glob pattern: {}", pattern))?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    Ok(files)
}

fn run_toc(args: &TocArgs) -> Result<()> {
    let options = TocOptions {
        min_depth: args.min_depth,
        max_depth: args.max_depth,
        insert_after: args.insert_after.clone(),
    };
    let path = args.path.as_path();

    let files = if path.is_file() {
        if !is_markdown(path) {
            anyhow::bail!("not a markdown file: {}", path.display());
        }
        vec![path.to_path_buf()]
    } else if path.is_dir() {
        let files = markdown_files(path, args.recursive)?;
        if files.is_empty() {
            warn!(dir = %path.display(), "no markdown files found");
            return Ok(());
        }
        println!("Found {} markdown files", files.len());
        files
    } else {
        anyhow::bail!("path does not exist: {}", path.display());
    };

    let mut updated = 0;
    for file in &files {
        match toc::update_file(file, &options) {
            Ok(TocUpdate::Replaced) => {
                println!("Updated table of contents in {}", file.display());
                updated += 1;
            }
            Ok(TocUpdate::Inserted) => {
                println!("Added table of contents to {}", file.display());
                updated += 1;
            }
            Ok(TocUpdate::NoHeaders) => warn!(file = %file.display(), "no headers found"),
            Err(e) => warn!(error = %e, "table of contents not updated"),
        }
    }
    println!("Processed: {}/{} files", updated, files.len());
    Ok(())
}
