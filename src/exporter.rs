//! Export the calendars of a CalDAV account to `.ics` files

use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use serde::Serialize;
use url::Url;

use crate::calendar::remote_calendar::RemoteCalendar;
use crate::client::Client;
use crate::config::{DAV_PATH_TEMPLATE, DEFAULT_URL};
use crate::error::ExportError;
use crate::item::ItemKind;
use crate::utils::{file_stem, UniqueNames};


/// Something that can ask the user for their password
pub trait PasswordPrompt {
    fn ask_password(&self, username: &str) -> Result<String, ExportError>;
}

/// Asks for the password on the terminal, without echoing it
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl PasswordPrompt for TerminalPrompt {
    fn ask_password(&self, username: &str) -> Result<String, ExportError> {
        cliclack::password(format!("Enter the password for {}", username))
            .mask('▪')
            .interact()
            .map_err(ExportError::Prompt)
    }
}


/// How to build a [`CalendarExporter`]
#[derive(Clone, Debug)]
pub struct ExporterOptions {
    pub username: String,
    /// When `None`, the password is asked for when connecting
    pub password: Option<String>,
    /// The CalDAV server. Defaults to [`DEFAULT_URL`]
    pub url: Option<String>,
    /// Whether to connect as soon as the exporter is created
    pub autoconnect: bool,
}

impl ExporterOptions {
    pub fn new<S: ToString>(username: S) -> Self {
        Self {
            username: username.to_string(),
            password: None,
            url: None,
            autoconnect: true,
        }
    }
}


/// What a calendar holds
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CalendarSummary {
    pub name: String,
    pub url: String,
    pub supported_components: Vec<ItemKind>,
    pub event_count: usize,
    pub todo_count: usize,
}

impl Display for CalendarSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let components: Vec<&str> = self.supported_components.iter().map(|k| k.component_name()).collect();
        writeln!(f, "Calendar Name: {}", self.name)?;
        writeln!(f, "Supported Components: {}", components.join(", "))?;
        writeln!(f, " - VEVENT (Events): {} items", self.event_count)?;
        write!(f, " - VTODO (Tasks): {} items", self.todo_count)
    }
}


/// The files an export has written
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ExportReport {
    pub directory: PathBuf,
    pub calendars: usize,
    pub items: usize,
    /// One file per calendar
    pub combined_files: Vec<PathBuf>,
    /// One file per item
    pub item_files: Vec<PathBuf>,
    /// URLs of the items that could not be parsed, and are missing from the combined files
    pub left_out: Vec<String>,
}

impl ExportReport {
    fn new(directory: &Path) -> Self {
        Self { directory: directory.to_path_buf(), ..Self::default() }
    }

    /// Every file that has been written
    pub fn files(&self) -> impl Iterator<Item = &PathBuf> {
        self.combined_files.iter().chain(self.item_files.iter())
    }

    pub fn file_count(&self) -> usize {
        self.combined_files.len() + self.item_files.len()
    }
}

impl Display for ExportReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Exported {} items from {} calendars into {} files in {}",
            self.items, self.calendars, self.file_count(), self.directory.display())?;
        if self.left_out.is_empty() == false {
            write!(f, " ({} items could not be added to the combined calendars)", self.left_out.len())?;
        }
        Ok(())
    }
}


struct Session {
    client: Client,
    display_name: String,
}

/// Exports the calendars of a CalDAV account.
///
/// An exporter only ever reads from the server.
pub struct CalendarExporter {
    username: String,
    password: Option<String>,
    url: Url,
    prompt: Box<dyn PasswordPrompt>,

    session: Option<Session>,
}

impl CalendarExporter {
    /// Create an exporter, that asks for the password on the terminal if needed.
    ///
    /// This connects to the server right away if `options.autoconnect` is set.
    pub async fn new(options: ExporterOptions) -> Result<Self, ExportError> {
        Self::with_prompt(options, Box::new(TerminalPrompt)).await
    }

    /// Create an exporter that uses `prompt` if it needs to ask for the password
    pub async fn with_prompt(options: ExporterOptions, prompt: Box<dyn PasswordPrompt>) -> Result<Self, ExportError> {
        let username = options.username.trim().to_string();
        if username.is_empty() {
            return Err(ExportError::InvalidArgument("A username is required".to_string()));
        }
        let url = resolve_url(options.url.as_deref().unwrap_or(DEFAULT_URL), &username)?;

        let mut exporter = Self {
            username,
            password: options.password,
            url,
            prompt,
            session: None,
        };

        if options.autoconnect {
            exporter.connect().await?;
        }
        Ok(exporter)
    }

    pub fn username(&self) -> &str { &self.username }

    /// The URL the discovery starts from
    pub fn url(&self) -> &Url { &self.url }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// The display name of the connected user
    pub fn display_name(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.display_name.as_str())
    }

    /// Open a session on the server. This does nothing if a session is already open.
    pub async fn connect(&mut self) -> Result<(), ExportError> {
        if self.session.is_some() {
            log::debug!("Already connected to {}", self.url);
            return Ok(());
        }

        let (password, prompted) = match &self.password {
            Some(p) => (p.clone(), false),
            None => (self.prompt.ask_password(&self.username)?, true),
        };

        log::info!("Connecting to {} as {}...", self.url, self.username);
        let mut client = Client::new(self.url.clone(), &self.username, &password);
        match client.connect().await {
            Ok(display_name) => {
                log::info!("Connected to CalDAV for {}", display_name);
                self.password = Some(password);
                self.session = Some(Session { client, display_name });
                Ok(())
            },
            Err(err) => {
                if prompted {
                    log::debug!("The password will be asked again on the next attempt");
                }
                Err(err)
            },
        }
    }

    fn session_mut(&mut self) -> Result<&mut Session, ExportError> {
        self.session.as_mut().ok_or(ExportError::NotConnected)
    }

    /// The calendars of the connected user
    pub async fn calendars(&mut self) -> Result<Vec<RemoteCalendar>, ExportError> {
        self.session_mut()?.client.get_calendars().await
    }

    /// Describe every calendar, without printing anything
    pub async fn summarize(&mut self) -> Result<Vec<CalendarSummary>, ExportError> {
        let calendars = self.calendars().await?;

        let mut summaries = Vec::new();
        for calendar in &calendars {
            summaries.push(CalendarSummary {
                name: calendar.name().to_string(),
                url: calendar.id().to_string(),
                supported_components: calendar.supported_components().kinds(),
                event_count: calendar.count_items(ItemKind::Event).await?,
                todo_count: calendar.count_items(ItemKind::Todo).await?,
            });
        }
        Ok(summaries)
    }

    /// Print a summary of every calendar (name, supported components, number of events and tasks), and return it
    pub async fn show_summary(&mut self) -> Result<Vec<CalendarSummary>, ExportError> {
        let summaries = self.summarize().await?;
        for summary in &summaries {
            println!("{}", summary);
        }
        Ok(summaries)
    }

    /// Export every calendar into `path`.
    ///
    /// * `save_combined_calendar` writes one `<calendar>.ics` file per calendar, that contains all of its items
    /// * `save_single_events` writes one `<calendar>_<item>.ics` file per item
    ///
    /// When both are `false`, nothing is written (not even the directory).
    pub async fn export<P: AsRef<Path>>(&mut self, path: P, save_single_events: bool, save_combined_calendar: bool) -> Result<ExportReport, ExportError> {
        let path = path.as_ref();
        self.session_mut()?;

        let mut report = ExportReport::new(path);
        if save_single_events == false && save_combined_calendar == false {
            log::warn!("Neither combined calendars nor single events were requested, nothing to export");
            return Ok(report);
        }

        std::fs::create_dir_all(path).map_err(|err| ExportError::file_system(path, err))?;

        let calendars = self.calendars().await?;
        let mut file_names = UniqueNames::new();
        // Calendars claim their names before any item does, so that combined files are named the same whatever the flags
        let calendar_stems: Vec<String> = calendars.iter()
            .map(|calendar| file_names.claim(&file_stem(calendar.name(), "calendar")))
            .collect();

        for (calendar, calendar_stem) in calendars.iter().zip(&calendar_stems) {
            let items = calendar.get_items().await?;

            if save_combined_calendar {
                let combined = crate::ical::build_combined(calendar.name(), &items);
                let file = path.join(format!("{}.ics", calendar_stem));
                write_file(&file, &combined.content)?;
                report.combined_files.push(file);
                report.left_out.extend(combined.left_out.iter().map(|id| id.to_string()));
            }

            if save_single_events {
                for item in &items {
                    let item_stem = file_stem(&item.identifier(), "item");
                    let stem = file_names.claim(&format!("{}_{}", calendar_stem, item_stem));
                    let file = path.join(format!("{}.ics", stem));
                    write_file(&file, item.ical())?;
                    report.item_files.push(file);
                }
            }

            report.calendars += 1;
            report.items += items.len();
        }

        log::info!("{}", report);
        Ok(report)
    }
}

fn write_file(path: &Path, content: &str) -> Result<(), ExportError> {
    log::debug!("Writing {}", path.display());
    std::fs::write(path, content).map_err(|err| ExportError::file_system(path, err))
}

/// Parse the server URL. A URL without a path gets the default DAV path of the user
fn resolve_url(url: &str, username: &str) -> Result<Url, ExportError> {
    let mut url = Url::parse(url)?;
    if url.path().trim_matches('/').is_empty() {
        url.set_path(&DAV_PATH_TEMPLATE.replace("{username}", username));
    }
    Ok(url)
}
