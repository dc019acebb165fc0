//! # API Route Modules
//!
//! - `auth` — unauthenticated `/register` and `/login`. Placeholder flow:
//!   credentials are accepted but not yet validated or persisted; login
//!   issues a bearer token for a fixed identity.
//! - `items` — token-authenticated CRUD over the item resource.

pub mod auth;
pub mod items;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Success body for operations that report a message rather than a record
/// (registration, deletion).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
