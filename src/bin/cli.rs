//! astroscrape CLI - harvest arXiv listings and scan paper text for software mentions
//!
//! Usage: astroscrape [OPTIONS] <COMMAND>
//!
//! `harvest` fills `ids/`, `run` fills `text/` and `search/`. Both are safe to rerun.

use astroscrape_lib::classification::{classify, KEYWORDS};
use astroscrape_lib::corpus::Corpus;
use astroscrape_lib::harvest::{HarvestOutcome, Harvester};
use astroscrape_lib::papers::resolver::TextResolver;
use astroscrape_lib::remote_client::RemoteClient;
use astroscrape_lib::settings::Settings;
use astroscrape_lib::store::{read_text_file, Store};
use astroscrape_lib::tools::SystemTools;
use astroscrape_lib::utils::safe_truncate;
use astroscrape_lib::Error;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Logging Infrastructure
// ============================================================================

/// Install the stderr subscriber; `RUST_LOG` wins over the flags
fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

// ============================================================================
// Main CLI Structure
// ============================================================================

#[derive(Parser)]
#[command(name = "astroscrape")]
#[command(version, about = "arXiv listing harvester and full-text keyword scanner", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Settings file (default: <config dir>/astroscrape/settings.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory holding ids/, text/ and search/ (overrides settings)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Output as JSON for scripting
    #[arg(long, global = true)]
    json: bool,

    /// Suppress progress output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Detailed logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch monthly listings and store their identifiers
    Harvest {
        /// Years to harvest (default: first_year..=last_year from settings)
        #[arg(long, short = 'y')]
        year: Vec<i32>,

        /// Months to harvest (default: 1..=12)
        #[arg(long, short = 'm')]
        month: Vec<u32>,

        /// Re-fetch months that already have a listing
        #[arg(long)]
        overwrite: bool,
    },
    /// Acquire and classify text for every harvested identifier
    Run {
        /// Only identifiers from this year's listings
        #[arg(long, short = 'y')]
        year: Option<i32>,

        /// Reprocess identifiers that already have text
        #[arg(long)]
        overwrite: bool,
    },
    /// Run a single acquisition strategy for one identifier
    Fetch {
        /// arXiv identifier, e.g. 2401.00185
        id: String,

        /// Strategy: html, source or pdf
        #[arg(long, short = 'm', default_value = "html")]
        method: String,

        /// Bytes of text to print
        #[arg(long, default_value = "500")]
        preview: usize,
    },
    /// Classify a text file (plain or .gz)
    Classify {
        file: PathBuf,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() {
    // Ignore SIGPIPE so piping through head/tail doesn't kill the process.
    #[cfg(unix)]
    unsafe { libc::signal(libc::SIGPIPE, libc::SIG_IGN); }

    // println! still panics on a closed pipe with SIGPIPE ignored; exit quietly instead.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        if is_broken_pipe(&info.to_string()) {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if let Err(e) = run_cli(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn is_broken_pipe(panic_message: &str) -> bool {
    panic_message.contains("Broken pipe")
}

fn run_cli(cli: Cli) -> Result<(), Error> {
    // Handle completions first (no settings needed)
    if let Commands::Completions { shell } = &cli.command {
        generate(*shell, &mut Cli::command(), "astroscrape", &mut std::io::stdout());
        return Ok(());
    }

    let config_path = cli.config.clone().unwrap_or_else(Settings::default_path);
    let mut settings = Settings::load(&config_path)?;
    if let Some(dir) = cli.data_dir.clone() {
        settings.data_dir = dir;
    }
    tracing::debug!("settings from {}, data in {}", config_path.display(), settings.data_dir.display());

    match cli.command {
        Commands::Harvest { year, month, overwrite } => handle_harvest(&settings, year, month, overwrite, cli.json),
        Commands::Run { year, overwrite } => handle_run(&settings, year, overwrite, cli.json),
        Commands::Fetch { id, method, preview } => handle_fetch(&settings, &id, &method, preview),
        Commands::Classify { file } => handle_classify(&file, cli.json),
        Commands::Completions { .. } => unreachable!(),
    }
}

// ============================================================================
// Command Handlers
// ============================================================================

fn handle_harvest(
    settings: &Settings,
    years: Vec<i32>,
    months: Vec<u32>,
    overwrite: bool,
    json: bool,
) -> Result<(), Error> {
    let years = if years.is_empty() {
        (settings.first_year..=settings.last_year).collect()
    } else {
        years
    };
    let months = if months.is_empty() { (1..=12).collect() } else { months };

    let store = Store::open(&settings.data_dir)?;
    let client = RemoteClient::new(settings)?;
    let harvester = Harvester::new(&client, &store, settings)?;

    let outcomes = harvester.harvest_range(&years, &months, overwrite, |year, month, outcome| {
        if !json {
            match outcome {
                HarvestOutcome::Fetched(count) => println!("{:04} {:02} {}", year, month, count),
                HarvestOutcome::Failed => println!("{:04} {:02} failed", year, month),
                HarvestOutcome::Cached => {}
            }
        }
    })?;

    let fetched: usize = outcomes
        .iter()
        .filter_map(|(_, _, o)| match o {
            HarvestOutcome::Fetched(n) => Some(*n),
            _ => None,
        })
        .sum();
    let failed = outcomes.iter().filter(|(_, _, o)| *o == HarvestOutcome::Failed).count();
    let cached = outcomes.iter().filter(|(_, _, o)| *o == HarvestOutcome::Cached).count();

    if json {
        let items: Vec<_> = outcomes
            .iter()
            .map(|(year, month, outcome)| serde_json::json!({ "year": year, "month": month, "outcome": outcome }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        println!("\n{} months: {} ids fetched, {} cached, {} failed", outcomes.len(), fetched, cached, failed);
    }
    Ok(())
}

fn handle_run(settings: &Settings, year: Option<i32>, overwrite: bool, json: bool) -> Result<(), Error> {
    let store = Store::open(&settings.data_dir)?;
    let client = RemoteClient::new(settings)?;
    let tools = SystemTools;
    let resolver = TextResolver::new(&client, &tools, settings)?;
    let mut corpus = Corpus::new(&store, resolver);

    let report = corpus.run(year, overwrite)?;

    if json {
        let out = serde_json::json!({ "report": report, "stats": corpus.stats() });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("\n{} ids: {} acquired, {} skipped, {} failed",
            report.identifiers, report.acquired, report.skipped, report.failed);
        println!("Python ecosystem: {}  Julia: {}", report.python_ecosystem, report.julia);
        corpus.stats().print_summary();
    }
    Ok(())
}

fn handle_fetch(settings: &Settings, id: &str, method: &str, preview: usize) -> Result<(), Error> {
    let client = RemoteClient::new(settings)?;
    let tools = SystemTools;
    let mut resolver = TextResolver::new(&client, &tools, settings)?;

    match resolver.acquire_named(id, method)? {
        Some(text) => {
            println!("{}", safe_truncate(&text, preview));
            if text.len() > preview {
                println!("... ({} bytes total)", text.len());
            }
            Ok(())
        }
        None => {
            eprintln!("No text for {} via {}", id, method);
            std::process::exit(1);
        }
    }
}

fn handle_classify(file: &Path, json: bool) -> Result<(), Error> {
    let text = read_text_file(file)?;
    let result = classify(&text);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        for keyword in KEYWORDS {
            let found = result.get(keyword).unwrap_or(false);
            println!("  {:8} {}", keyword, if found { "yes" } else { "-" });
        }
        println!("\npython ecosystem: {}  julia: {}", result.is_python_ecosystem(), result.is_julia());
    }
    Ok(())
}
