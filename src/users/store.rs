//! Worker-local user storage.

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::users::model::{NewUser, User, UserPatch};

/// Insertion-ordered collection of user records, owned by one worker.
///
/// There is no cross-process locking: every worker holds an exclusive copy
/// and diverging copies are reconciled by the next full-state broadcast.
/// The mutex only serializes handlers within the owning process.
#[derive(Debug, Default)]
pub struct UserStore {
    users: Mutex<Vec<User>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records in insertion order.
    pub async fn all(&self) -> Vec<User> {
        self.users.lock().await.clone()
    }

    /// Linear lookup by exact id.
    pub async fn get(&self, id: Uuid) -> Option<User> {
        self.users.lock().await.iter().find(|u| u.id == id).cloned()
    }

    /// Append a new record with a freshly generated id.
    pub async fn create(&self, new_user: NewUser) -> User {
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username,
            age: new_user.age,
            hobbies: new_user.hobbies,
        };
        self.users.lock().await.push(user.clone());
        user
    }

    /// Overwrite the fields the patch provides, leaving the rest untouched.
    /// Returns the updated record, or `None` when the id is unknown.
    pub async fn update(&self, id: Uuid, patch: UserPatch) -> Option<User> {
        let mut users = self.users.lock().await;
        let user = users.iter_mut().find(|u| u.id == id)?;
        if let Some(username) = patch.username {
            user.username = username;
        }
        if let Some(age) = patch.age {
            user.age = age;
        }
        if let Some(hobbies) = patch.hobbies {
            user.hobbies = hobbies;
        }
        Some(user.clone())
    }

    /// Remove the record with this id. Returns whether a record was removed;
    /// removing an absent id is not an error at this level.
    pub async fn remove(&self, id: Uuid) -> bool {
        let mut users = self.users.lock().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        users.len() < before
    }

    /// Wholesale overwrite, used only by the replication path.
    pub async fn replace_all(&self, users: Vec<User>) {
        *self.users.lock().await = users;
    }

    pub async fn len(&self) -> usize {
        self.users.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.lock().await.is_empty()
    }
}
