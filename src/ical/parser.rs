//! A module to parse ICal files

use ical::parser::ical::component::IcalCalendar;
use ical::property::Property;

use crate::error::ExportError;
use crate::item::ItemId;


/// Parse the iCal file of an item.
///
/// Some servers send bare components (e.g. a `VEVENT` with no `VCALENDAR` around it). These are parsed as if they were wrapped in a calendar.
pub fn parse(content: &str, item_id: &ItemId) -> Result<IcalCalendar, ExportError> {
    match parse_single_calendar(content, item_id) {
        Err(err) if has_calendar_header(content) == false => {
            log::debug!("Item {} has no VCALENDAR, parsing it as a bare component", item_id);
            let wrapped = format!("BEGIN:VCALENDAR\r\n{}\r\nEND:VCALENDAR\r\n", content.trim());
            parse_single_calendar(&wrapped, item_id).map_err(|_| err)
        },
        result => result,
    }
}

fn parse_single_calendar(content: &str, item_id: &ItemId) -> Result<IcalCalendar, ExportError> {
    let mut reader = ical::IcalParser::new(content.as_bytes());
    let parsed_item = match reader.next() {
        None => return Err(ExportError::InvalidResponse(format!("Invalid iCal data to parse for item {}", item_id))),
        Some(item) => match item {
            Err(err) => return Err(ExportError::InvalidResponse(format!("Unable to parse iCal data for item {}: {}", item_id, err))),
            Ok(item) => item,
        }
    };

    if reader.next().is_some() {
        return Err(ExportError::InvalidResponse(format!("Item {} contains several calendars, this is not supported", item_id)));
    }

    Ok(parsed_item)
}

fn has_calendar_header(content: &str) -> bool {
    content.trim_start()
        .get(.."BEGIN:VCALENDAR".len())
        .map(|header| header.eq_ignore_ascii_case("BEGIN:VCALENDAR"))
        .unwrap_or(false)
}

/// The UID of a calendar object.
///
/// A calendar object resource may hold several components (e.g. a recurring event and its overridden instances), that all share the same UID.
pub fn find_uid(calendar: &IcalCalendar) -> Option<String> {
    let first_properties = calendar.events.iter().map(|c| &c.properties)
        .chain(calendar.todos.iter().map(|c| &c.properties))
        .chain(calendar.journals.iter().map(|c| &c.properties))
        .next()?;
    find_property(first_properties, "UID")
}

pub(crate) fn find_property(properties: &[Property], name: &str) -> Option<String> {
    properties.iter()
        .find(|prop| prop.name.eq_ignore_ascii_case(name))
        .and_then(|prop| prop.value.clone())
}


#[cfg(test)]
mod test {
    const EXAMPLE_ICAL: &str = r#"BEGIN:VCALENDAR
VERSION:2.0
PRODID:-//Nextcloud Tasks v0.13.6
BEGIN:VTODO
UID:0633de27-8c32-42be-bcb8-63bc879c6185
CREATED:20210321T001600
LAST-MODIFIED:20210321T001600
DTSTAMP:20210321T001600
SUMMARY:Do not forget to do this
END:VTODO
END:VCALENDAR
"#;

    const EXAMPLE_RECURRING_EVENT: &str = r#"BEGIN:VCALENDAR
VERSION:2.0
PRODID:-//grommunio//EN
BEGIN:VEVENT
UID:weekly-sync@example.com
DTSTAMP:20240101T090000Z
DTSTART:20240108T090000Z
RRULE:FREQ=WEEKLY
SUMMARY:Weekly sync
END:VEVENT
BEGIN:VEVENT
UID:weekly-sync@example.com
DTSTAMP:20240101T090000Z
RECURRENCE-ID:20240115T090000Z
DTSTART:20240115T100000Z
SUMMARY:Weekly sync (moved)
END:VEVENT
END:VCALENDAR
"#;

    const EXAMPLE_BARE_EVENT: &str = "BEGIN:VEVENT\nUID:bare-1\nSUMMARY:No calendar around me\nEND:VEVENT\n";

    const EXAMPLE_MULTIPLE_ICAL: &str = r#"BEGIN:VCALENDAR
VERSION:2.0
PRODID:-//Nextcloud Tasks v0.13.6
BEGIN:VTODO
UID:0633de27-8c32-42be-bcb8-63bc879c6185
SUMMARY:Call Mom
END:VTODO
END:VCALENDAR
BEGIN:VCALENDAR
BEGIN:VTODO
UID:0633de27-8c32-42be-bcb8-63bc879c6185
SUMMARY:Buy a gift for Mom
END:VTODO
END:VCALENDAR
"#;

    const EXAMPLE_BROKEN_SECOND_ICAL: &str = r#"BEGIN:VCALENDAR
VERSION:2.0
PRODID:-//Nextcloud Tasks v0.13.6
BEGIN:VTODO
UID:0633de27-8c32-42be-bcb8-63bc879c6185
SUMMARY:Call Mom
END:VTODO
END:VCALENDAR
BEGIN:VCALENDAR
BEGIN:VTODO
UID:0633de27-8c32-42be-bcb8-63bc879c6185
"#;

    use super::*;
    use url::Url;

    fn item_id() -> ItemId {
        ItemId::from(Url::parse("http://some.id/for/testing").unwrap())
    }

    #[test]
    fn test_ical_parsing() {
        let calendar = parse(EXAMPLE_ICAL, &item_id()).unwrap();

        assert_eq!(calendar.todos.len(), 1);
        assert_eq!(find_uid(&calendar).as_deref(), Some("0633de27-8c32-42be-bcb8-63bc879c6185"));
    }

    #[test]
    fn test_recurring_event() {
        let calendar = parse(EXAMPLE_RECURRING_EVENT, &item_id()).unwrap();

        assert_eq!(calendar.events.len(), 2);
        assert_eq!(find_uid(&calendar).as_deref(), Some("weekly-sync@example.com"));
    }

    #[test]
    fn test_bare_component() {
        let calendar = parse(EXAMPLE_BARE_EVENT, &item_id()).unwrap();

        assert_eq!(calendar.events.len(), 1);
        assert_eq!(find_uid(&calendar).as_deref(), Some("bare-1"));
    }

    #[test]
    fn test_multiple_items_in_ical() {
        assert!(parse(EXAMPLE_MULTIPLE_ICAL, &item_id()).is_err());
    }

    #[test]
    fn test_broken_second_calendar_in_ical() {
        assert!(parse(EXAMPLE_BROKEN_SECOND_ICAL, &item_id()).is_err());
    }

    #[test]
    fn test_garbage() {
        assert!(parse("this is not iCalendar", &item_id()).is_err());
    }
}
