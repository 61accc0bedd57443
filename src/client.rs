//! This module provides a client to connect to a CalDAV server

use std::convert::TryFrom;

use reqwest::{Method, StatusCode};
use reqwest::header::CONTENT_TYPE;
use minidom::Element;
use url::Url;

use crate::calendar::remote_calendar::RemoteCalendar;
use crate::calendar::SupportedComponents;
use crate::error::ExportError;
use crate::resource::Resource;
use crate::utils::{find_elem, find_elem_path, find_elems};


static DAVCLIENT_BODY: &str = r#"
    <d:propfind xmlns:d="DAV:">
       <d:prop>
           <d:current-user-principal />
       </d:prop>
    </d:propfind>
"#;

static HOMESET_BODY: &str = r#"
    <d:propfind xmlns:d="DAV:" xmlns:c="urn:ietf:params:xml:ns:caldav" >
      <d:self/>
      <d:prop>
        <d:displayname />
        <c:calendar-home-set />
      </d:prop>
    </d:propfind>
"#;

static CAL_BODY: &str = r#"
    <d:propfind xmlns:d="DAV:" xmlns:c="urn:ietf:params:xml:ns:caldav" >
       <d:prop>
         <d:displayname />
         <d:resourcetype />
         <c:supported-calendar-component-set />
       </d:prop>
    </d:propfind>
"#;



/// Send a WebDAV request (`PROPFIND`, `REPORT`...) and return the body of the reply
pub(crate) async fn sub_request(http: &reqwest::Client, resource: &Resource, method: &str, body: String, depth: u32) -> Result<String, ExportError> {
    let method = Method::from_bytes(method.as_bytes())
        .map_err(|err| ExportError::InvalidArgument(format!("Invalid HTTP method {}: {}", method, err)))?;

    log::debug!("{} {} (depth {})", method, resource.url(), depth);
    let mut request = http
        .request(method, resource.url().as_str())
        .header("Depth", depth)
        .header(CONTENT_TYPE, "application/xml");
    if let Some(password) = resource.password() {
        request = request.basic_auth(resource.username(), Some(password));
    }
    let res = request
        .body(body)
        .send()
        .await?;

    let status = res.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ExportError::Authentication { username: resource.username().clone() });
    }
    if status.is_success() == false {
        return Err(ExportError::InvalidResponse(format!("Unexpected HTTP status code {:?} for {}", status, resource.url())));
    }

    let text = res.text().await?;
    Ok(text)
}

/// Send a WebDAV request, and walk the XML reply along `items` (see [`find_elem_path`]) to return the text of the last element
pub(crate) async fn sub_request_and_extract_elem(http: &reqwest::Client, resource: &Resource, body: String, items: &[&str]) -> Result<String, ExportError> {
    let text = sub_request(http, resource, "PROPFIND", body, 0).await?;
    let root = parse_xml(&text)?;

    match find_elem_path(&root, items) {
        Some(elem) => Ok(elem.text()),
        None => Err(ExportError::InvalidResponse(format!("Missing {} in the reply for {}", items.join("/"), resource.url()))),
    }
}

/// Send a WebDAV request, and return every element of the reply that is named `item`
pub(crate) async fn sub_request_and_extract_elems(http: &reqwest::Client, resource: &Resource, method: &str, body: String, item: &str) -> Result<Vec<Element>, ExportError> {
    let text = sub_request(http, resource, method, body, 1).await?;
    let root = parse_xml(&text)?;

    Ok(find_elems(&root, item)
        .iter()
        .map(|elem| (*elem).clone())
        .collect()
    )
}

fn parse_xml(text: &str) -> Result<Element, ExportError> {
    Ok(text.parse::<Element>()?)
}



/// A CalDAV source that fetches its data from a CalDAV server
#[derive(Debug)]
pub struct Client {
    resource: Resource,
    http: reqwest::Client,

    principal: Option<Resource>,
    principal_name: Option<String>,
    calendar_home_set: Option<Resource>,
    calendars: Option<Vec<RemoteCalendar>>,
}

impl Client {
    /// Create a client. This does not start a connection
    pub fn new<T: ToString, U: ToString>(url: Url, username: T, password: U) -> Self {
        Self {
            resource: Resource::new(url, username.to_string(), password.to_string()),
            http: reqwest::Client::new(),
            principal: None,
            principal_name: None,
            calendar_home_set: None,
            calendars: None,
        }
    }

    /// Check the credentials, and discover the principal and its calendar home set.
    ///
    /// Returns the display name of the principal (or the username if the server does not provide any)
    pub async fn connect(&mut self) -> Result<String, ExportError> {
        self.get_cal_home_set().await?;
        Ok(self.principal_name.clone().unwrap_or_else(|| self.resource.username().clone()))
    }

    /// Return the Principal URL, or fetch it from server if not known yet
    pub async fn get_principal(&mut self) -> Result<Url, ExportError> {
        if let Some(p) = &self.principal {
            return Ok(p.url().clone());
        }

        let href = sub_request_and_extract_elem(&self.http, &self.resource, DAVCLIENT_BODY.into(), &["current-user-principal", "href"]).await?;
        let principal = self.resource.combine(href.trim())?;
        log::debug!("Principal URL is {}", principal.url());

        let url = principal.url().clone();
        self.principal = Some(principal);
        Ok(url)
    }

    /// Return the Homeset URL, or fetch it from server if not known yet
    pub async fn get_cal_home_set(&mut self) -> Result<Url, ExportError> {
        if let Some(h) = &self.calendar_home_set {
            return Ok(h.url().clone());
        }
        self.get_principal().await?;
        let principal = match &self.principal {
            Some(p) => p.clone(),
            None => return Err(ExportError::NotConnected),
        };

        let text = sub_request(&self.http, &principal, "PROPFIND", HOMESET_BODY.into(), 0).await?;
        let root = parse_xml(&text)?;

        let href = match find_elem_path(&root, &["calendar-home-set", "href"]) {
            Some(h) => h.text(),
            None => return Err(ExportError::InvalidResponse(format!("{} has no calendar home set", principal.url()))),
        };
        self.principal_name = find_elem(&root, "displayname")
            .map(|e| e.text().trim().to_string())
            .filter(|name| name.is_empty() == false);

        let home_set = principal.combine(href.trim())?;
        log::debug!("Calendar home set URL is {:?}", home_set.url().path());

        let url = home_set.url().clone();
        self.calendar_home_set = Some(home_set);
        Ok(url)
    }

    /// Return the list of calendars, or fetch from server if not known yet.
    ///
    /// Calendars are in the order the server listed them.
    pub async fn get_calendars(&mut self) -> Result<Vec<RemoteCalendar>, ExportError> {
        if let Some(c) = &self.calendars {
            return Ok(c.clone());
        }
        self.get_cal_home_set().await?;
        let cal_home_set = match &self.calendar_home_set {
            Some(h) => h.clone(),
            None => return Err(ExportError::NotConnected),
        };

        let reps = sub_request_and_extract_elems(&self.http, &cal_home_set, "PROPFIND", CAL_BODY.into(), "response").await?;
        let mut calendars = Vec::new();
        for rep in &reps {
            let calendar_href = match find_elem(rep, "href") {
                None => {
                    log::warn!("Found a collection with no URL! Ignoring it.");
                    continue;
                },
                Some(h) => h.text().trim().to_string(),
            };
            let display_name = find_elem(rep, "displayname")
                .map(|e| e.text().trim().to_string())
                .filter(|name| name.is_empty() == false)
                .unwrap_or_else(|| name_from_href(&calendar_href));
            log::debug!("Considering calendar {}", display_name);

            // We filter out non-calendar items
            let resource_types = match find_elem(rep, "resourcetype") {
                None => continue,
                Some(rt) => rt,
            };
            let found_calendar_type = resource_types.children().any(|resource_type| resource_type.name() == "calendar");
            if found_calendar_type == false {
                continue;
            }

            // A missing supported-calendar-component-set means every component is accepted.
            // An empty one is what some servers report for their root calendar collection, that we filter out
            let supported_components = match find_elem(rep, "supported-calendar-component-set") {
                None => SupportedComponents::all(),
                Some(el_supported_comps) => {
                    if el_supported_comps.children().count() == 0 {
                        continue;
                    }
                    match SupportedComponents::try_from(el_supported_comps) {
                        Err(err) => {
                            log::warn!("Calendar {} has invalid supported components ({})! Ignoring it.", display_name, err);
                            continue;
                        },
                        Ok(sc) => sc,
                    }
                },
            };

            let this_calendar = RemoteCalendar::new(display_name, cal_home_set.combine(&calendar_href)?, supported_components, self.http.clone());
            log::info!("Found calendar {}", this_calendar.name());
            calendars.push(this_calendar);
        }

        self.calendars = Some(calendars.clone());
        Ok(calendars)
    }
}

/// The last non-empty segment of a collection path, used when a calendar has no display name
fn name_from_href(href: &str) -> String {
    href.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(href)
        .to_string()
}
