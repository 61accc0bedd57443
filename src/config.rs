//! Support for library configuration options

use std::sync::{Arc, Mutex};
use once_cell::sync::Lazy;

/// The server used when none is given
pub const DEFAULT_URL: &str = "https://hope.helmholtz-berlin.de";

/// Path appended to a server URL that has no path of its own. `{username}` is replaced by the account name.
pub const DAV_PATH_TEMPLATE: &str = "/dav/calendars/{username}/";

/// Part of the ProdID string that describes the organization (example of a ProdID string: `-//ABC Corporation//My Product//EN`).
/// Feel free to override it when initing this library.
pub static ORG_NAME: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("calexport".to_string())));

/// Part of the ProdID string that describes the product name (example of a ProdID string: `-//ABC Corporation//My Product//EN`).
/// Feel free to override it when initing this library.
pub static PRODUCT_NAME: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("CalDAV Export".to_string())));

/// The ProdID written in the combined calendar files
pub fn prod_id() -> String {
    format!("-//{}//{}//EN", read_setting(&ORG_NAME), read_setting(&PRODUCT_NAME))
}

fn read_setting(setting: &Mutex<String>) -> String {
    match setting.lock() {
        Ok(value) => value.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}
