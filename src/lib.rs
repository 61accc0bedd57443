//! This crate exports the calendars of a CalDAV account to `.ics` files.
//!
//! The entry point is the [`CalendarExporter`], that connects to the server, lists the calendars of the user,
//! and writes them either as one combined file per calendar, as one file per item, or both.
//!
//! The exporter only reads from the server. Items are written as the server sent them.
//!
//! ```no_run
//! # async fn run() -> Result<(), calexport::ExportError> {
//! use calexport::{CalendarExporter, ExporterOptions};
//!
//! let mut options = ExporterOptions::new("john.doe");
//! options.password = Some("secret".to_string());
//! options.url = Some("https://dav.example.com".to_string());
//!
//! let mut exporter = CalendarExporter::new(options).await?;
//! exporter.show_summary().await?;
//! exporter.export("backup", true, true).await?;
//! # Ok(())
//! # }
//! ```

pub mod calendar;
mod item;
pub use item::{Item, ItemId, ItemKind};
mod resource;
pub use resource::Resource;
mod error;
pub use error::ExportError;
pub mod exporter;
pub use exporter::{CalendarExporter, CalendarSummary, ExportReport, ExporterOptions, PasswordPrompt, TerminalPrompt};

pub mod client;
pub mod ical;

pub mod config;
pub mod utils;
