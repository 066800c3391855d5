//! HTTP method and path pairs for API endpoints.

use std::fmt;

use model::Snowflake;
use reqwest::Method;

/// A method plus a path relative to the configured base URL.
///
/// Paths start with `/`; [`Route::new`] adds one when missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    method: Method,
    path: String,
}

impl Route {
    /// Creates a route, prefixing `/` to `path` when missing.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let path = path.into();
        let path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };
        Self { method, path }
    }

    /// A `GET` route.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// A `POST` route.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// A `PUT` route.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// A `PATCH` route.
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    /// A `DELETE` route.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path relative to the base URL, starting with `/`.
    pub fn path(&self) -> &str {
        &self.path
    }

    // -----------------------------------------------------------------------
    // Endpoints
    // -----------------------------------------------------------------------

    /// `GET /voice/regions`
    pub fn voice_regions() -> Self {
        Self::get("/voice/regions")
    }

    /// `GET /channels/{channel.id}`
    pub fn channel(channel_id: Snowflake) -> Self {
        Self::get(format!("/channels/{channel_id}"))
    }

    /// `DELETE /channels/{channel.id}`
    pub fn delete_channel(channel_id: Snowflake) -> Self {
        Self::delete(format!("/channels/{channel_id}"))
    }

    /// `GET /channels/{channel.id}/messages/{message.id}`
    pub fn channel_message(channel_id: Snowflake, message_id: Snowflake) -> Self {
        Self::get(format!("/channels/{channel_id}/messages/{message_id}"))
    }

    /// `POST /channels/{channel.id}/messages`
    pub fn create_message(channel_id: Snowflake) -> Self {
        Self::post(format!("/channels/{channel_id}/messages"))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}
