use std::collections::HashSet;

use crate::calendar::{CalendarId, SearchFilter, SupportedComponents};
use crate::error::ExportError;
use crate::item::{Item, ItemId, ItemKind};
use crate::resource::Resource;
use crate::utils::find_elem;


/// The body of a `calendar-query` REPORT.
///
/// Etags are always requested, the calendar data only when `with_data` is set
fn calendar_query_body(filter: SearchFilter, with_data: bool) -> String {
    let data_prop = if with_data { "<c:calendar-data />" } else { "" };
    let comp_filter = match filter {
        SearchFilter::All => String::from(r#"<c:comp-filter name="VCALENDAR" />"#),
        SearchFilter::Kind(kind) => format!(
            r#"<c:comp-filter name="VCALENDAR"><c:comp-filter name="{}" /></c:comp-filter>"#,
            kind.component_name()),
    };

    format!(r#"
    <c:calendar-query xmlns:d="DAV:" xmlns:c="urn:ietf:params:xml:ns:caldav">
        <d:prop>
            <d:getetag />
            {}
        </d:prop>
        <c:filter>
            {}
        </c:filter>
    </c:calendar-query>
"#, data_prop, comp_filter)
}



/// A CalDAV calendar created by a [`Client`](crate::client::Client).
///
/// This only ever reads from the server.
#[derive(Clone, Debug)]
pub struct RemoteCalendar {
    name: String,
    resource: Resource,
    supported_components: SupportedComponents,

    http: reqwest::Client,
}

impl RemoteCalendar {
    pub fn new(name: String, resource: Resource, supported_components: SupportedComponents, http: reqwest::Client) -> Self {
        Self { name, resource, supported_components, http }
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn id(&self) -> &CalendarId { self.resource.url() }
    pub fn supported_components(&self) -> SupportedComponents {
        self.supported_components
    }

    /// Returns the URL of every item matching `filter`, without downloading their content
    pub async fn get_item_ids(&self, filter: SearchFilter) -> Result<HashSet<ItemId>, ExportError> {
        let responses = crate::client::sub_request_and_extract_elems(&self.http, &self.resource, "REPORT", calendar_query_body(filter, false), "response").await?;

        let mut items = HashSet::new();
        for response in responses {
            let item_id = match find_elem(&response, "href") {
                None => {
                    log::warn!("Unable to extract HREF");
                    continue;
                },
                Some(href) => ItemId::from(&self.resource.combine(href.text().trim())?),
            };

            if find_elem(&response, "getetag").is_none() {
                log::warn!("Unable to extract ETAG for item {}, ignoring it", item_id);
                continue;
            }

            items.insert(item_id);
        }

        Ok(items)
    }

    /// How many items of the given kind this calendar holds
    pub async fn count_items(&self, kind: ItemKind) -> Result<usize, ExportError> {
        let count = self.get_item_ids(SearchFilter::Kind(kind)).await?.len();
        log::debug!("Calendar {} has {} {} items", self.name, count, kind);
        Ok(count)
    }

    /// Download every item of this calendar, in the order the server sent them
    pub async fn get_items(&self) -> Result<Vec<Item>, ExportError> {
        let responses = crate::client::sub_request_and_extract_elems(&self.http, &self.resource, "REPORT", calendar_query_body(SearchFilter::All, true), "response").await?;

        let mut items = Vec::new();
        for response in responses {
            let item_id = match find_elem(&response, "href") {
                None => {
                    log::warn!("Unable to extract HREF");
                    continue;
                },
                Some(href) => ItemId::from(&self.resource.combine(href.text().trim())?),
            };

            let ical = match find_elem(&response, "calendar-data") {
                Some(data) if data.text().trim().is_empty() == false => data.text(),
                _ => {
                    log::warn!("No calendar data for item {}, ignoring it", item_id);
                    continue;
                },
            };
            items.push(Item::new(item_id, ical));
        }

        log::debug!("Calendar {} has {} items", self.name, items.len());
        Ok(items)
    }
}
