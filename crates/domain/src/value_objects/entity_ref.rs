//! Entity references - identify a record by primary id, document id, or both.
//!
//! The CMS hands out two identifiers for every document: a numeric id and a
//! content key. Different fetch paths do not always carry both, so a reference
//! matches another one as soon as either identifier agrees.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{DocumentId, LocalId, RecordId};

/// Reference to an entity by whichever identifiers are known.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<DocumentId>,
}

impl EntityRef {
    /// Reference by a CMS-issued numeric id
    pub fn server(id: u64) -> Self {
        Self {
            id: Some(RecordId::Server(id)),
            document_id: None,
        }
    }

    /// Reference by a locally generated placeholder id
    pub fn local(id: LocalId) -> Self {
        Self {
            id: Some(RecordId::Local(id)),
            document_id: None,
        }
    }

    /// Reference by document id only
    pub fn document(document_id: impl Into<DocumentId>) -> Self {
        Self {
            id: None,
            document_id: Some(document_id.into()),
        }
    }

    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_document(mut self, document_id: impl Into<DocumentId>) -> Self {
        self.document_id = Some(document_id.into());
        self
    }

    fn usable_document(&self) -> Option<&DocumentId> {
        self.document_id.as_ref().filter(|doc| !doc.is_blank())
    }

    /// True when at least one identifier can be used to address the entity.
    pub fn is_resolvable(&self) -> bool {
        self.id.is_some() || self.usable_document().is_some()
    }

    /// Fails with a validation error when the reference carries no identifier.
    pub fn ensure_resolvable(&self, what: &str) -> Result<(), DomainError> {
        if self.is_resolvable() {
            Ok(())
        } else {
            Err(DomainError::validation(format!(
                "{} reference has no identifier",
                what
            )))
        }
    }

    /// Same entity if the document ids agree or the primary ids agree.
    ///
    /// The document id is checked first. A missing identifier on either side
    /// never counts as a match.
    pub fn matches(&self, other: &EntityRef) -> bool {
        if let (Some(a), Some(b)) = (self.usable_document(), other.usable_document()) {
            if a == b {
                return true;
            }
        }
        matches!((self.id, other.id), (Some(a), Some(b)) if a == b)
    }

    /// Canonical key, preferring the document id.
    pub fn key(&self) -> Option<TargetKey> {
        if let Some(doc) = self.usable_document() {
            return Some(TargetKey::Document(doc.clone()));
        }
        self.id.map(TargetKey::Record)
    }

    /// Fill identifiers this reference lacks from another reference to the
    /// same entity.
    pub fn merged_with(&self, other: &EntityRef) -> EntityRef {
        EntityRef {
            id: self.id.or(other.id),
            document_id: self
                .usable_document()
                .or_else(|| other.usable_document())
                .cloned(),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.key() {
            Some(key) => write!(f, "{}", key),
            None => f.write_str("<unresolved>"),
        }
    }
}

/// Hashable key derived from an [`EntityRef`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetKey {
    Document(DocumentId),
    Record(RecordId),
}

impl fmt::Display for TargetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKey::Document(doc) => write!(f, "doc:{}", doc),
            TargetKey::Record(id) => write!(f, "#{}", id),
        }
    }
}
