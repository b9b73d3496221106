//! Backstory consistency checker.
//!
//! Checks character backstories against the canon of the novel they belong
//! to and writes a 0/1 verdict with a rationale per record.
//!
//! ```bash
//! cargo run -p canon -- run --input data/test.json --output results.json \
//!     --data-dir data --policy strict
//! ```

mod commands;

use canon_core::AggregationPolicy;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "canon")]
#[command(about = "Check character backstories against novel canon")]
#[command(version)]
struct Args {
    /// Default log filter when RUST_LOG is unset (debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check every record of an input file and write the results
    Run {
        /// Input records (JSON array of {id, book_name, char, content})
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write {id, prediction, rationale} records
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Check a single backstory
    Check {
        #[arg(long)]
        character: String,

        #[arg(long)]
        book: String,

        #[arg(long)]
        backstory: String,

        /// Print the decision and evidence for every claim
        #[arg(long)]
        explain: bool,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Load and chunk one novel, then print index statistics
    Index {
        #[arg(long)]
        book: String,

        /// Directory holding the novel text files
        #[arg(long, env = "CANON_DATA_DIR")]
        data_dir: PathBuf,
    },

    /// Summarize an input file
    Inspect {
        #[arg(short, long)]
        input: PathBuf,
    },
}

/// Options shared by every command that runs the pipeline.
#[derive(clap::Args, Debug)]
struct PipelineArgs {
    /// Directory holding the novel text files
    #[arg(long, env = "CANON_DATA_DIR")]
    data_dir: PathBuf,

    /// How claim decisions become a verdict
    #[arg(long, value_enum)]
    policy: PolicyArg,

    /// Canon rule file replacing the built-in tables
    #[arg(long)]
    canon: Option<PathBuf>,

    /// Evidence chunks consulted per claim
    #[arg(long, default_value_t = canon_core::evidence::DEFAULT_TOP_K)]
    top_k: usize,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PolicyArg {
    /// Any contradicted claim fails the backstory
    Strict,
    /// Two contradictions fail; strong support outweighs one
    Graduated,
}

impl From<PolicyArg> for AggregationPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Strict => AggregationPolicy::Strict,
            PolicyArg::Graduated => AggregationPolicy::Graduated,
        }
    }
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level);

    let ok = match args.command {
        Command::Run {
            input,
            output,
            pipeline,
        } => commands::run(&input, &output, &pipeline).await?,
        Command::Check {
            character,
            book,
            backstory,
            explain,
            pipeline,
        } => commands::check(&character, &book, &backstory, explain, &pipeline).await?,
        Command::Index { book, data_dir } => commands::index(&book, &data_dir)?,
        Command::Inspect { input } => commands::inspect(&input).await?,
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
