use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser};
use plum_statespace::config::{parse_storage_mb, ExplorerConfig, DEFAULT_MAX_STORAGE_MB};
use plum_statespace::explorer::tree_browser::TreeBrowser;
use plum_statespace::game_state::position::Position;
use plum_statespace::logging::init_tracing;
use plum_statespace::move_generation::legal_move_generator::LegalMoveGenerator;
use plum_statespace::search::orchestrator::explore;
use plum_statespace::search::run_report::{DepthSummary, ExplorationObserver};
use plum_statespace::search::threading::CancellationToken;
use plum_statespace::storage::state_store::StateStore;

#[derive(Parser, Debug)]
#[command(name = "plum_statespace")]
#[command(about = "Enumerate and store every chess position reachable from a root", long_about = None)]
struct Args {
    /// SQLite database holding the state graph
    #[arg(long, default_value = "statespace.db")]
    db: PathBuf,

    /// Plies to explore from the root
    #[arg(long, default_value_t = 3)]
    max_depth: u32,

    /// Storage ceiling in MB; prompted for when absent
    #[arg(long)]
    max_storage_mb: Option<u64>,

    /// Frontier entries kept in memory per depth
    #[arg(long, default_value_t = 10_000)]
    frontier_capacity: usize,

    /// Frontier entries per worker unit
    #[arg(long, default_value_t = 100)]
    batch_size: usize,

    /// Worker threads; 0 uses every available core
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// Root position (board and side fields); defaults to the starting position
    #[arg(long)]
    fen: Option<String>,

    /// Replace an existing database
    #[arg(long)]
    overwrite: bool,

    /// Skip exploration and browse an existing database
    #[arg(long, conflicts_with_all = ["overwrite", "no_browse"])]
    browse: bool,

    /// Exit after exploring instead of opening the browser
    #[arg(long)]
    no_browse: bool,

    /// More log output (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Less log output (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    quiet: u8,
}

struct ConsoleObserver;

impl ExplorationObserver for ConsoleObserver {
    fn on_depth_complete(&self, summary: &DepthSummary) {
        println!(
            "depth {:>2}: expanded {:>9}  new {:>9}  spilled {:>8}  drained {:>8}  skipped {:>5}",
            summary.depth,
            summary.processed,
            summary.produced,
            summary.spilled,
            summary.drained,
            summary.skipped
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let verbosity = (i16::from(args.verbose) - i16::from(args.quiet)).clamp(-2, 2) as i8;
    init_tracing(verbosity);

    if args.browse {
        return browse(&args.db);
    }

    if args.db.exists() {
        if !args.overwrite {
            return Err(format!(
                "{} already exists; pass --overwrite to replace it or --browse to open it",
                args.db.display()
            )
            .into());
        }
        StateStore::remove_files(&args.db)?;
    }

    let max_storage_mb = match args.max_storage_mb {
        Some(mb) => mb,
        None => prompt_storage_mb()?,
    };
    let root = match &args.fen {
        Some(fen) => Position::from_fen(fen)?,
        None => Position::starting(),
    };

    let config = ExplorerConfig::default()
        .with_db_path(&args.db)
        .with_max_depth(args.max_depth)
        .with_max_storage_mb(max_storage_mb)
        .with_frontier_capacity(args.frontier_capacity)
        .with_batch_size(args.batch_size)
        .with_worker_threads(args.threads);

    let store = StateStore::open(&config.db_path, config.busy_timeout_ms)?;
    let report = explore(
        &store,
        &root,
        &config,
        &CancellationToken::new(),
        &LegalMoveGenerator,
        &ConsoleObserver,
    )?;

    println!(
        "stopped: {} after {} ms; {} states, {} edges, complete to depth {}",
        report.outcome.describe(),
        report.elapsed_ms(),
        report.total_states,
        report.total_edges,
        report.deepest_closed_depth
    );

    if args.no_browse {
        return Ok(());
    }
    run_browser(&store)
}

fn prompt_storage_mb() -> io::Result<u64> {
    print!("Maximum storage in MB [{DEFAULT_MAX_STORAGE_MB}]: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let (mb, fell_back) = parse_storage_mb(&line);
    if fell_back {
        println!("Using the default of {DEFAULT_MAX_STORAGE_MB} MB.");
    }
    Ok(mb)
}

fn browse(db: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !db.exists() {
        return Err(format!("{} does not exist; run an exploration first", db.display()).into());
    }
    let store = StateStore::open(db, ExplorerConfig::default().busy_timeout_ms)?;
    run_browser(&store)
}

fn run_browser(store: &StateStore) -> Result<(), Box<dyn std::error::Error>> {
    let stdin = io::stdin();
    let mut browser = TreeBrowser::open(store.connect()?, stdin.lock(), io::stdout())?;
    browser.run()?;
    Ok(())
}
