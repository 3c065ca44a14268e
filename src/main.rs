use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use codefence::export::Framework;
use codefence::{commands, diagnostics, error, watch};

#[derive(Parser)]
#[command(name = "codefence", about = "Code-fence extraction and project materialization for AI markdown")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare the projects materialized from two markdown files (exit 1 on changes)
    Diff {
        /// Earlier markdown file
        old: PathBuf,
        /// Later markdown file
        new: PathBuf,
        /// Print changes as JSON
        #[arg(long)]
        json: bool,
        /// Skip the imported-by annotation
        #[arg(long)]
        no_dependents: bool,
        /// Template identifier, overriding .codefence.toml
        #[arg(long)]
        template: Option<String>,
    },
    /// Write a materialized project out as a framework app
    Export {
        /// Markdown file to materialize
        file: PathBuf,
        /// Target framework
        #[arg(long, value_enum, default_value = "vite")]
        framework: Framework,
        /// Output directory
        #[arg(long)]
        out: PathBuf,
        /// Package name (defaults to the file stem)
        #[arg(long)]
        name: Option<String>,
        /// Template identifier, overriding .codefence.toml
        #[arg(long)]
        template: Option<String>,
    },
    /// Materialize a markdown file into a project and print it
    Extract {
        /// Markdown file to materialize
        file: PathBuf,
        /// Print the project as JSON
        #[arg(long)]
        json: bool,
        /// Template identifier, overriding .codefence.toml
        #[arg(long)]
        template: Option<String>,
    },
    /// Show version navigation and change history for a conversation
    History {
        /// Conversation JSON file, or a directory of *.md turns
        conversation: PathBuf,
        /// Turn id to display, or `live`
        #[arg(long)]
        select: Option<String>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
        /// Template identifier, overriding the conversation and .codefence.toml
        #[arg(long)]
        template: Option<String>,
    },
    /// Split a markdown file into text and code segments
    Split {
        /// Markdown file to scan
        file: PathBuf,
        /// Print segments as JSON
        #[arg(long)]
        json: bool,
    },
    /// Re-materialize a growing markdown file on every change
    Watch {
        /// Markdown file being streamed into
        file: PathBuf,
        /// Template identifier, overriding .codefence.toml
        #[arg(long)]
        template: Option<String>,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    return match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::from(2)
        },
    };
}

/// Dispatch a parsed command.
///
/// # Errors
///
/// Returns whatever error the command produced.
fn run(command: Commands) -> Result<ExitCode, error::Error> {
    return match command {
        Commands::Diff { old, new, json, no_dependents, template } => {
            commands::diff(&old, &new, json, !no_dependents, template.as_deref())
        },
        Commands::Export { file, framework, out, name, template } => {
            commands::export(&file, framework, &out, name.as_deref(), template.as_deref())?;
            Ok(ExitCode::SUCCESS)
        },
        Commands::Extract { file, json, template } => {
            commands::extract(&file, json, template.as_deref())?;
            Ok(ExitCode::SUCCESS)
        },
        Commands::History { conversation, select, json, template } => {
            commands::history(&conversation, select.as_deref(), json, template.as_deref())?;
            Ok(ExitCode::SUCCESS)
        },
        Commands::Split { file, json } => {
            commands::split(&file, json)?;
            Ok(ExitCode::SUCCESS)
        },
        Commands::Watch { file, template } => watch::run(&file, template.as_deref()),
    };
}
