//! This module handles iCal files
//!
//! Payloads are parsed with the `ical` crate, and combined calendars are written with the `ics` crate

mod parser;
pub use parser::{find_uid, parse};
mod builder;
pub use builder::{build_combined, CombinedCalendar};
