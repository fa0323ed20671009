//! User record and request payload types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored user record.
///
/// The `id` is assigned server-side on creation and never changes afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub age: u32,
    pub hobbies: Vec<String>,
}

/// Payload for creating a user. Every field is required; a missing or
/// wrong-typed field fails deserialization and surfaces as a 400.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub age: u32,
    pub hobbies: Vec<String>,
}

/// Partial update payload.
///
/// Absent fields leave the record untouched. Unrecognized fields are dropped
/// during deserialization and never reach the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPatch {
    pub username: Option<String>,
    pub age: Option<u32>,
    pub hobbies: Option<Vec<String>>,
}

impl UserPatch {
    /// True when the patch would not change any field.
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.age.is_none() && self.hobbies.is_none()
    }
}
