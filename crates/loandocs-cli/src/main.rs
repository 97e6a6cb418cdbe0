mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "loandocs",
    version,
    about = "Submission deadlines for housing-loan supporting documents"
)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive document deadlines and submission status for every record
    Annotate {
        /// Path to an xlsx, xls, xlsb, ods or csv upload
        input_file: PathBuf,

        #[command(flatten)]
        rules: commands::RuleArgs,

        /// Reference date for year-less dates (default: today)
        #[arg(long, value_name = "DATE")]
        today: Option<String>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write the annotated table to FILE (.xlsx or .csv), or into a directory
        /// as <input>_deadlines.xlsx
        #[arg(short = 'O', long = "out", value_name = "PATH")]
        out: Option<PathBuf>,
    },
    /// List records with a deadline inside the upcoming window
    Imminent {
        /// Path to an annotated upload, or a raw one with --evaluate
        input_file: PathBuf,

        #[command(flatten)]
        rules: commands::RuleArgs,

        /// First day of the window (default: today)
        #[arg(long, value_name = "DATE")]
        today: Option<String>,

        /// Window length in calendar months
        #[arg(long, default_value_t = loandocs_core::imminent::DEFAULT_WINDOW_MONTHS)]
        months: u32,

        /// Derive deadlines before filtering (for uploads without deadline columns)
        #[arg(long)]
        evaluate: bool,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write the listing to FILE (.xlsx or .csv), or into a directory as
        /// imminent_submissions.xlsx
        #[arg(short = 'O', long = "out", value_name = "PATH")]
        out: Option<PathBuf>,
    },
    /// Show how date cells are read
    Date {
        /// Raw values, e.g. "2024년 11월" or "Nov-30"
        #[arg(required = true)]
        values: Vec<String>,

        /// Reference date for year-less values (default: today)
        #[arg(long, value_name = "DATE")]
        today: Option<String>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Manage and inspect rulesets
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },
}

#[derive(Subcommand)]
enum RulesAction {
    /// List predefined rulesets
    List,
    /// Explain a ruleset in plain language
    Explain {
        /// Preset name (e.g., "housing-loan")
        preset: String,
    },
    /// Print the JSON schema with field descriptions and example
    Schema,
    /// Validate a custom rule file
    Validate {
        /// Path to JSON rule file
        file: PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Annotate {
            input_file,
            rules,
            today,
            output,
            out,
        } => commands::annotate::run(input_file, &rules, today.as_deref(), &output, out),
        Commands::Imminent {
            input_file,
            rules,
            today,
            months,
            evaluate,
            output,
            out,
        } => commands::imminent::run(
            input_file,
            &rules,
            today.as_deref(),
            months,
            evaluate,
            &output,
            out,
        ),
        Commands::Date {
            values,
            today,
            output,
        } => commands::date::run(&values, today.as_deref(), &output),
        Commands::Rules { action } => match action {
            RulesAction::List => commands::rules::list(),
            RulesAction::Explain { preset } => commands::rules::explain(&preset),
            RulesAction::Schema => commands::rules::schema(),
            RulesAction::Validate { file } => commands::rules::validate(&file),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
