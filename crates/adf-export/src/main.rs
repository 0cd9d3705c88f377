//! Command-line entry point.
//!
//! Usage:
//!  adf-export sprint [--sprint <id>] [--output <dir>] [--config <file>]
//!  adf-export convert <input.json|-> [--output <file.md|->]

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use adf_export::settings::SETTINGS_FILE;
use adf_export::{save, ExportError, JiraClient, Loader, Result, SprintExporter};
use adf_markdown::AdfConverter;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[clap(name = "adf-export", version, about = "Export Jira issues and convert ADF documents to Markdown")]
struct Cli {
    /// Settings file to use instead of ./adf-export.toml
    #[clap(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Export every issue of a sprint as JSON and Markdown
    Sprint {
        /// Sprint to export (overrides JIRA_SPRINT_ID)
        #[clap(long, value_name = "ID")]
        sprint: Option<String>,

        /// Output directory (overrides JIRA_OUTPUT_FOLDER)
        #[clap(long, short, value_name = "DIR")]
        output: Option<String>,
    },

    /// Convert a single ADF JSON document to Markdown
    Convert {
        /// ADF document to read, `-` for stdin
        #[clap(value_name = "INPUT")]
        input: String,

        /// Markdown file to write, `-` or omitted for stdout
        #[clap(long, short, value_name = "OUTPUT")]
        output: Option<String>,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Sprint { sprint, output } => run_sprint(cli.config.as_deref(), sprint, output),
        Command::Convert { input, output } => run_convert(&input, output.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run_sprint(config: Option<&Path>, sprint: Option<String>, output: Option<String>) -> Result<()> {
    let mut loader = match config {
        Some(path) => Loader::new().with_file(path),
        None => Loader::new().with_optional_file(SETTINGS_FILE),
    }
    .with_env();

    if let Some(sprint) = sprint {
        loader = loader.set_override("jira_sprint_id", sprint)?;
    }
    if let Some(output) = output {
        loader = loader.set_override("jira_output_folder", output)?;
    }

    let settings = loader.build()?;
    settings.validate()?;
    log::debug!("Running in {} mode", settings.environment);

    let client = JiraClient::new(
        &settings.jira_url,
        &settings.jira_email,
        &settings.jira_api_token,
    )?;
    let summary =
        SprintExporter::new(client, &settings.jira_sprint_id, &settings.jira_output_folder).run()?;

    if summary.failed > 0 {
        log::warn!("{} issues could not be exported", summary.failed);
    }
    Ok(())
}

fn run_convert(input: &str, output: Option<&str>) -> Result<()> {
    let source = if input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|source| io_error("<stdin>", source))?;
        buffer
    } else {
        fs::read_to_string(input).map_err(|source| io_error(input, source))?
    };

    let document: serde_json::Value = serde_json::from_str(&source)?;
    let conversion = AdfConverter::new().convert_with_report(&document)?;
    if !conversion.issues.is_empty() {
        log::warn!(
            "{} node(s) were replaced by placeholders",
            conversion.issues.len()
        );
    }

    match output {
        None | Some("-") => io::stdout()
            .write_all(conversion.markdown.as_bytes())
            .map_err(|source| io_error("<stdout>", source)),
        Some(path) => save(path, &conversion.markdown),
    }
}

fn io_error(path: &str, source: io::Error) -> ExportError {
    ExportError::Io {
        path: PathBuf::from(path),
        source,
    }
}
