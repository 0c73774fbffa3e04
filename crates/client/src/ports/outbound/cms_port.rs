//! CMS Port - the remote system of record for every user collection
//!
//! The CMS is treated as an at-most-once-per-call remote procedure that may
//! fail. Wire format, endpoints and status codes belong to whatever adapter
//! implements this trait; the application layer only sees `ServerRecord`s.
//!
//! Note: the async methods use `async_trait` for mockall compatibility.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use coursemart_domain::{CollectionKind, EntityRef};

/// Errors a CMS call can produce
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CmsError {
    /// The request never reached the CMS or the connection dropped
    #[error("Network error: {0}")]
    Network(String),

    /// The CMS answered with an error payload
    #[error("Server error: {}", .message.as_deref().unwrap_or("no details"))]
    Server { message: Option<String> },

    /// No answer within the configured mutation timeout
    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    /// The CMS answered but the record did not have the expected shape
    #[error("Failed to parse record: {0}")]
    Parse(String),
}

impl CmsError {
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            message: Some(message.into()),
        }
    }

    /// Best human-readable message carried by the failure, if any.
    ///
    /// Only server-provided messages qualify; transport and parse errors are
    /// not meant for end users.
    pub fn human_message(&self) -> Option<&str> {
        match self {
            CmsError::Server { message } => message
                .as_deref()
                .map(str::trim)
                .filter(|msg| !msg.is_empty()),
            _ => None,
        }
    }
}

/// A record exactly as the CMS returned it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerRecord(Value);

impl ServerRecord {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for ServerRecord {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Helper trait for parsing CMS payloads into typed records
pub trait ParseRecord {
    fn parse<T: DeserializeOwned>(self) -> Result<T, CmsError>;
}

impl ParseRecord for ServerRecord {
    fn parse<T: DeserializeOwned>(self) -> Result<T, CmsError> {
        serde_json::from_value(self.0).map_err(|e| CmsError::Parse(e.to_string()))
    }
}

impl ParseRecord for Vec<ServerRecord> {
    fn parse<T: DeserializeOwned>(self) -> Result<T, CmsError> {
        let values = self.into_iter().map(ServerRecord::into_value).collect();
        serde_json::from_value(Value::Array(values)).map_err(|e| CmsError::Parse(e.to_string()))
    }
}

/// Port for the CMS collaborator
///
/// `target` is whatever identifier the CMS accepts: numeric id, document id,
/// or both.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CmsPort: Send + Sync {
    /// Create a record in `kind` that refers to `target`
    async fn add_item(
        &self,
        kind: CollectionKind,
        target: &EntityRef,
    ) -> Result<ServerRecord, CmsError>;

    /// Delete the record in `kind` that refers to `target`.
    ///
    /// Returns `false` when the CMS had no such record.
    async fn remove_item(&self, kind: CollectionKind, target: &EntityRef)
        -> Result<bool, CmsError>;

    /// Every record in `kind` owned by `owner`
    async fn list_items(
        &self,
        kind: CollectionKind,
        owner: &EntityRef,
    ) -> Result<Vec<ServerRecord>, CmsError>;

    /// Apply a partial update to the record in `kind` that refers to `target`
    async fn update_item(
        &self,
        kind: CollectionKind,
        target: &EntityRef,
        changes: &Value,
    ) -> Result<ServerRecord, CmsError>;
}
