//! Catalog item records.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A catalog item.
///
/// The `id` is assigned by the service at creation time, is unique, and is
/// immutable afterwards; it is the sole lookup key for get/update/delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
}

/// The mutable fields of an [`Item`].
///
/// Used as the request body for both create and update. All three fields
/// are required — an update replaces every mutable field with the supplied
/// values, never merges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ItemDraft {
    pub name: String,
    pub description: String,
    pub price: f64,
}

impl Item {
    /// Build an item from a freshly assigned id and a draft.
    pub fn from_draft(id: i64, draft: ItemDraft) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            price: draft.price,
        }
    }

    /// Overwrite all mutable fields with the draft's values.
    ///
    /// The id is untouched. Applying the same draft twice yields the same
    /// stored state.
    pub fn apply(&mut self, draft: ItemDraft) {
        self.name = draft.name;
        self.description = draft.description;
        self.price = draft.price;
    }
}
