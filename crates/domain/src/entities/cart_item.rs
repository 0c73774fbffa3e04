//! Cart item entity - one course in the user's cart

use serde::{Deserialize, Serialize};

use crate::collection::{CollectionItem, CollectionKind};
use crate::entities::CourseSummary;
use crate::ids::{DocumentId, LocalId, RecordId};
use crate::value_objects::EntityRef;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<DocumentId>,
    pub course: EntityRef,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price_cents: i64,
}

impl CartItem {
    /// Placeholder shown while the CMS creates the real cart entry
    pub fn placeholder(local_id: LocalId, course: &CourseSummary) -> Self {
        Self {
            id: Some(RecordId::Local(local_id)),
            document_id: None,
            course: course.course.clone(),
            title: course.title.clone(),
            price_cents: course.price_cents,
        }
    }
}

impl CollectionItem for CartItem {
    const KIND: CollectionKind = CollectionKind::Cart;

    fn identity(&self) -> EntityRef {
        EntityRef {
            id: self.id,
            document_id: self.document_id.clone(),
        }
    }

    fn target(&self) -> EntityRef {
        self.course.clone()
    }
}
