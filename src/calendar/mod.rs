pub mod remote_calendar;

use std::convert::TryFrom;

use bitflags::bitflags;

use crate::error::ExportError;
use crate::item::ItemKind;

bitflags! {
    pub struct SupportedComponents: u8 {
        /// An event, such as a calendar meeting
        const EVENT = 1;
        /// A to-do item, such as a reminder
        const TODO = 2;
        /// A journal entry
        const JOURNAL = 4;
    }
}

impl SupportedComponents {
    /// The item kinds these flags stand for
    pub fn kinds(&self) -> Vec<ItemKind> {
        let mut kinds = Vec::new();
        if self.contains(Self::EVENT) { kinds.push(ItemKind::Event); }
        if self.contains(Self::TODO) { kinds.push(ItemKind::Todo); }
        if self.contains(Self::JOURNAL) { kinds.push(ItemKind::Journal); }
        kinds
    }
}

impl From<ItemKind> for SupportedComponents {
    fn from(kind: ItemKind) -> Self {
        match kind {
            ItemKind::Event => Self::EVENT,
            ItemKind::Todo => Self::TODO,
            ItemKind::Journal => Self::JOURNAL,
        }
    }
}

impl TryFrom<&minidom::Element> for SupportedComponents {
    type Error = ExportError;

    /// Create an instance from an XML <supported-calendar-component-set> element
    fn try_from(element: &minidom::Element) -> Result<Self, Self::Error> {
        if element.name() != "supported-calendar-component-set" {
            return Err(ExportError::InvalidResponse("Element must be a <supported-calendar-component-set>".into()));
        }

        let mut flags = Self::empty();
        for child in element.children() {
            match child.attr("name").and_then(ItemKind::from_component_name) {
                Some(kind) => flags.insert(Self::from(kind)),
                None => {
                    log::debug!("Unsupported component type: {:?}. Ignoring it", child.attr("name"));
                    continue
                },
            };
        }

        Ok(flags)
    }
}


/// Flags to tell which items should be retrieved
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SearchFilter {
    /// Return all items
    All,
    /// Return only items of a given kind
    Kind(ItemKind),
}


pub type CalendarId = url::Url;
