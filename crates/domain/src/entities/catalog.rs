//! Catalog and profile summaries used to build optimistic placeholders.

use serde::{Deserialize, Serialize};

use crate::value_objects::EntityRef;

/// What the storefront knows about a course when the user acts on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub course: EntityRef,
    pub title: String,
    /// Listed price; the CMS may compute a different one for the cart
    #[serde(default)]
    pub price_cents: i64,
}

impl CourseSummary {
    pub fn new(course: impl Into<EntityRef>, title: impl Into<String>, price_cents: i64) -> Self {
        Self {
            course: course.into(),
            title: title.into(),
            price_cents,
        }
    }
}

/// A user as shown in friend lists and request cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub user: EntityRef,
    pub display_name: String,
}

impl UserSummary {
    pub fn new(user: impl Into<EntityRef>, display_name: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            display_name: display_name.into(),
        }
    }
}
