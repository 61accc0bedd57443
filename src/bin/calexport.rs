use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use calexport::{CalendarExporter, ExportError, ExporterOptions};

/// Export calendar data from a CalDAV server.
///
/// Calendars are exported to a directory, as one .ics file per calendar, and optionally as one .ics file per event.
#[derive(Debug, Parser)]
#[command(name = "calexport", version, after_help = "\
Examples:
  calexport username@example.com /path/to/export --save-separate
  calexport username@example.com /path/to/export --password yourpassword --save-separate
  calexport username@example.com /path/to/export --server https://dav.example.com --summary")]
struct Cli {
    /// Account username (e.g. user@example.com)
    username: String,

    /// Directory to save the exported .ics files
    destination: PathBuf,

    /// URL of the CalDAV server
    #[arg(long, value_name = "URL")]
    server: Option<String>,

    /// Password of the account. Asked for interactively when missing
    #[arg(long)]
    password: Option<String>,

    /// Save each event as a separate .ics file
    #[arg(long)]
    save_separate: bool,

    /// Do not write the one-file-per-calendar export
    #[arg(long)]
    no_combined: bool,

    /// Print the calendars and their number of events and tasks before exporting
    #[arg(long)]
    summary: bool,

    /// Print the summary and the export report as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<(), ExportError> {
    let options = ExporterOptions {
        username: cli.username.clone(),
        password: cli.password.clone(),
        url: cli.server.clone(),
        autoconnect: true,
    };
    let mut exporter = CalendarExporter::new(options).await?;
    if cli.json == false {
        println!("Connected to CalDAV for {}.", exporter.display_name().unwrap_or(cli.username.as_str()));
    }

    let summary = if cli.summary {
        if cli.json {
            Some(exporter.summarize().await?)
        } else {
            Some(exporter.show_summary().await?)
        }
    } else {
        None
    };

    let report = exporter.export(&cli.destination, cli.save_separate, cli.no_combined == false).await?;

    if cli.json {
        let output = serde_json::json!({
            "summary": summary,
            "report": report,
        });
        let text = serde_json::to_string_pretty(&output)?;
        println!("{}", text);
    } else {
        println!("{}", report);
        println!("Export complete. Files saved to {}", cli.destination.display());
    }
    Ok(())
}
