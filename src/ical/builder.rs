//! A module to build ICal files

use std::borrow::Cow;
use std::collections::HashSet;

use ical::parser::ical::component::{IcalAlarm, IcalTimeZone, IcalTimeZoneTransitionType};
use ical::property::Property as IcalProperty;
use ics::components::{Component, Parameter, Property};
use ics::{escape_text, ICalendar};

use crate::ical::parser::find_property;
use crate::item::{Item, ItemId};


/// A calendar file built from several items
#[derive(Clone, Debug)]
pub struct CombinedCalendar {
    /// The iCal text
    pub content: String,
    /// Items that could not be parsed, and whose components are missing from `content`
    pub left_out: Vec<ItemId>,
}

/// Create a single iCal file that holds every component of every item.
///
/// `VTIMEZONE` components are kept only once per `TZID`, and come first.
/// The top-level properties of each item (`VERSION`, `PRODID`...) are replaced by the ones of the combined calendar.
pub fn build_combined(calendar_name: &str, items: &[Item]) -> CombinedCalendar {
    let mut calendar = ICalendar::new("2.0", crate::config::prod_id());
    calendar.push(Property::new("X-WR-CALNAME", escape_text(calendar_name)));

    let mut left_out = Vec::new();
    let mut seen_tzids = HashSet::new();
    let mut components = Vec::new();
    for item in items {
        let parsed = match item.calendar() {
            Some(parsed) => parsed,
            None => {
                log::warn!("Item {} could not be parsed, it is left out of the combined calendar of {}", item.id(), calendar_name);
                left_out.push(item.id().clone());
                continue;
            },
        };

        for timezone in &parsed.timezones {
            let is_new = match find_property(&timezone.properties, "TZID") {
                Some(tzid) => seen_tzids.insert(tzid),
                None => true,
            };
            if is_new {
                calendar.add_component(timezone_component(timezone));
            }
        }

        components.extend(parsed.events.iter().map(|event| component("VEVENT", &event.properties, alarm_components(&event.alarms))));
        components.extend(parsed.todos.iter().map(|todo| component("VTODO", &todo.properties, alarm_components(&todo.alarms))));
        components.extend(parsed.journals.iter().map(|journal| component("VJOURNAL", &journal.properties, Vec::new())));
        components.extend(parsed.free_busys.iter().map(|free_busy| component("VFREEBUSY", &free_busy.properties, Vec::new())));
    }

    for component in components {
        calendar.add_component(component);
    }

    CombinedCalendar {
        content: calendar.to_string(),
        left_out,
    }
}

fn timezone_component(timezone: &IcalTimeZone) -> Component<'_> {
    let transitions = timezone.transitions.iter()
        .map(|transition| {
            let name = match transition.transition {
                IcalTimeZoneTransitionType::STANDARD => "STANDARD",
                IcalTimeZoneTransitionType::DAYLIGHT => "DAYLIGHT",
            };
            component(name, &transition.properties, Vec::new())
        })
        .collect();
    component("VTIMEZONE", &timezone.properties, transitions)
}

fn alarm_components(alarms: &[IcalAlarm]) -> Vec<Component<'_>> {
    alarms.iter()
        .map(|alarm| component("VALARM", &alarm.properties, Vec::new()))
        .collect()
}

fn component<'a>(name: &'static str, properties: &'a [IcalProperty], subcomponents: Vec<Component<'a>>) -> Component<'a> {
    let mut built = Component::new(name);
    for prop in properties {
        built.add_property(property(prop));
    }
    for subcomponent in subcomponents {
        built.add_component(subcomponent);
    }
    built
}

/// Values are copied as they were parsed, i.e. still escaped
fn property(prop: &IcalProperty) -> Property<'_> {
    let mut built = Property::new(prop.name.as_str(), prop.value.as_deref().unwrap_or(""));
    for (key, values) in prop.params.iter().flatten() {
        let values: Vec<Cow<str>> = values.iter().map(|value| quote_param_value(value)).collect();
        built.add(Parameter::new(key.as_str(), values.join(",")));
    }
    built
}

/// Parameter values that hold a `:`, `;` or `,` must be quoted (RFC 5545, section 3.1)
fn quote_param_value(value: &str) -> Cow<'_, str> {
    if value.starts_with('"') == false && value.contains(|c| c == ':' || c == ';' || c == ',') {
        Cow::Owned(format!("\"{}\"", value))
    } else {
        Cow::Borrowed(value)
    }
}
