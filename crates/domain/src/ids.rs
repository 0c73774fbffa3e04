use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::EntityRef;

/// Typed wrapper for a numeric id issued by the CMS.
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub fn new(value: u64) -> Self {
                Self(value)
            }

            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for u64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl From<$name> for EntityRef {
            fn from(value: $name) -> Self {
                EntityRef::server(value.0)
            }
        }
    };
}

// Catalog
define_id!(CourseId);

// Social graph
define_id!(UserId);

const LOCAL_PREFIX: &str = "local-";

/// Synthetic id for a record created locally before the CMS has seen it.
///
/// Built from the creation timestamp plus a per-process sequence number, so
/// two placeholders created in the same millisecond stay distinct. Rendered
/// as `local-<millis>-<seq>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LocalId {
    millis: i64,
    seq: u32,
}

impl LocalId {
    pub fn new(millis: i64, seq: u32) -> Self {
        Self { millis, seq }
    }

    pub fn millis(&self) -> i64 {
        self.millis
    }

    pub fn seq(&self) -> u32 {
        self.seq
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}-{}", LOCAL_PREFIX, self.millis, self.seq)
    }
}

impl FromStr for LocalId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix(LOCAL_PREFIX)
            .ok_or_else(|| DomainError::invalid_id(s))?;
        let (millis, seq) = rest
            .split_once('-')
            .ok_or_else(|| DomainError::invalid_id(s))?;
        let millis = millis
            .parse::<i64>()
            .map_err(|_| DomainError::invalid_id(s))?;
        let seq = seq.parse::<u32>().map_err(|_| DomainError::invalid_id(s))?;
        Ok(Self { millis, seq })
    }
}

impl TryFrom<String> for LocalId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LocalId> for String {
    fn from(value: LocalId) -> Self {
        value.to_string()
    }
}

/// Primary identifier of a collection record.
///
/// `Server` ids come from the CMS; `Local` ids belong to placeholders and can
/// never be equal to a server id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Server(u64),
    Local(LocalId),
}

impl RecordId {
    pub fn is_local(&self) -> bool {
        matches!(self, RecordId::Local(_))
    }

    pub fn as_server(&self) -> Option<u64> {
        match self {
            RecordId::Server(id) => Some(*id),
            RecordId::Local(_) => None,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Server(id) => write!(f, "{}", id),
            RecordId::Local(id) => write!(f, "{}", id),
        }
    }
}

impl From<LocalId> for RecordId {
    fn from(value: LocalId) -> Self {
        RecordId::Local(value)
    }
}

/// Content key the CMS assigns to a document.
///
/// Stable across list and detail fetches, unlike the numeric id, which is why
/// it is the preferred identifier when deduplicating.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}
