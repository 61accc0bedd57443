use std::fmt::{Debug, Formatter};

use url::Url;

use crate::error::ExportError;

/// Just a wrapper around a URL and credentials
#[derive(Clone)]
pub struct Resource {
    url: Url,
    username: String,
    password: Option<String>,
}

impl Resource {
    pub fn new(url: Url, username: String, password: String) -> Self {
        Self { url, username, password: Some(password) }
    }

    pub fn url(&self) -> &Url { &self.url }
    pub fn username(&self) -> &String { &self.username }
    /// `None` when this resource lives on another server than the one the credentials were given for
    pub fn password(&self) -> Option<&String> { self.password.as_ref() }

    /// Build a new Resource from an `href` found in a reply about this resource.
    ///
    /// `href` is resolved against the URL of this resource, so it can be an absolute path, a relative reference or a full URL.
    /// Credentials are only passed along to the same origin (scheme, host and port).
    pub fn combine(&self, href: &str) -> Result<Resource, ExportError> {
        let url = self.url.join(href)
            .map_err(|err| ExportError::InvalidResponse(format!("Invalid href {:?} in the reply for {}: {}", href, self.url, err)))?;

        let password = if url.origin() == self.url.origin() {
            self.password.clone()
        } else {
            log::warn!("{} is not on the same server as {}, credentials will not be sent to it", url, self.url);
            None
        };

        Ok(Resource { url, username: self.username.clone(), password })
    }
}

impl Debug for Resource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource")
            .field("url", &self.url.as_str())
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
