//! CalDAV items (events, todos, journals...)

use std::fmt::{Display, Formatter};

use ical::parser::ical::component::IcalCalendar;
use serde::Serialize;
use url::Url;

use crate::resource::Resource;


/// The kinds of iCalendar components a calendar item can hold
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ItemKind {
    /// An event, such as a calendar meeting
    #[serde(rename = "VEVENT")]
    Event,
    /// A to-do item, such as a reminder
    #[serde(rename = "VTODO")]
    Todo,
    /// A journal entry
    #[serde(rename = "VJOURNAL")]
    Journal,
}

impl ItemKind {
    /// The iCalendar component name (e.g. `VEVENT`)
    pub fn component_name(&self) -> &'static str {
        match self {
            ItemKind::Event => "VEVENT",
            ItemKind::Todo => "VTODO",
            ItemKind::Journal => "VJOURNAL",
        }
    }

    pub fn from_component_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "VEVENT" => Some(ItemKind::Event),
            "VTODO" => Some(ItemKind::Todo),
            "VJOURNAL" => Some(ItemKind::Journal),
            _ => None,
        }
    }
}

impl Display for ItemKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.component_name())
    }
}


/// A calendar object, as stored on the server.
///
/// The iCalendar payload is kept exactly as the server sent it.
#[derive(Clone, Debug)]
pub struct Item {
    id: ItemId,
    uid: Option<String>,
    calendar: Option<IcalCalendar>,
    ical: String,
}

impl Item {
    /// Wrap a payload downloaded from the server.
    ///
    /// The payload is parsed to find its UID and components. A payload that cannot be parsed is still kept, without them.
    pub fn new(id: ItemId, ical: String) -> Self {
        let calendar = match crate::ical::parse(&ical, &id) {
            Ok(calendar) => Some(calendar),
            Err(err) => {
                log::warn!("{}. Its content will be exported as-is", err);
                None
            },
        };
        let uid = calendar.as_ref().and_then(crate::ical::find_uid);

        Self { id, uid, calendar, ical }
    }

    pub fn id(&self) -> &ItemId { &self.id }
    /// The parsed payload, if it could be parsed
    pub fn calendar(&self) -> Option<&IcalCalendar> { self.calendar.as_ref() }
    /// The raw iCalendar text
    pub fn ical(&self) -> &str { &self.ical }

    /// A name for this item, that is stable between two exports: its UID, or the last part of its URL if it has no UID
    pub fn identifier(&self) -> String {
        match &self.uid {
            Some(uid) if uid.trim().is_empty() == false => uid.clone(),
            _ => self.id.file_stem(),
        }
    }
}


/// The URL of an item on the server
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ItemId {
    content: Url,
}
impl ItemId {
    /// The last segment of the URL path, without its `.ics` extension
    pub fn file_stem(&self) -> String {
        let last_segment = self.content
            .path_segments()
            .and_then(|segments| segments.filter(|s| s.is_empty() == false).last())
            .unwrap_or("");

        let stem = match last_segment.len().checked_sub(4) {
            Some(cut) if last_segment.is_char_boundary(cut) && last_segment[cut..].eq_ignore_ascii_case(".ics") => &last_segment[..cut],
            _ => last_segment,
        };
        stem.to_string()
    }
}
impl From<Url> for ItemId {
    fn from(url: Url) -> Self {
        Self { content: url }
    }
}
impl From<&Resource> for ItemId {
    fn from(resource: &Resource) -> Self {
        Self { content: resource.url().clone() }
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.content)
    }
}
