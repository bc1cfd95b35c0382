use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{Faculty, User, UserChanges};

/// Errors surfaced by a hierarchy store. Expected outcomes (missing records,
/// failed insert guards) are values on the individual methods, not errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Outcome of the fan-out-guarded admin insert.
#[derive(Debug)]
pub enum AdminInsert {
    Created(User),
    /// The parent already had the maximum number of live sub-admin children
    /// at the moment of the insert.
    LimitReached,
}

/// Data-access seam for the hierarchy subsystem. `PgStore` implements it for
/// production; `MemoryStore` backs tests and local development.
#[async_trait]
pub trait HierarchyStore: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn faculty_by_id(&self, id: Uuid) -> Result<Option<Faculty>, StoreError>;

    /// Count of live admin children directly under `parent`.
    async fn count_sub_admins(&self, parent: Uuid) -> Result<i64, StoreError>;
    async fn count_users_created_by(&self, admin: Uuid) -> Result<i64, StoreError>;
    async fn count_faculty_created_by(&self, admin: Uuid) -> Result<i64, StoreError>;

    async fn users_created_by(&self, admin: Uuid) -> Result<Vec<User>, StoreError>;
    async fn faculty_created_by(&self, admin: Uuid) -> Result<Vec<Faculty>, StoreError>;

    /// Every admin whose hierarchy path contains `root` or whose parent is
    /// `root`. Listing support only; the per-record authorization gate uses
    /// `created_by` equality instead.
    async fn admins_in_subtree(&self, root: Uuid) -> Result<Vec<User>, StoreError>;

    /// Insert an admin while atomically re-verifying the fan-out cap against
    /// the record's `parent_admin`. The check and the insert are one unit:
    /// concurrent sibling creations serialize here.
    async fn insert_admin_guarded(
        &self,
        user: User,
        max_children: i64,
    ) -> Result<AdminInsert, StoreError>;

    /// Unguarded insert, used for root-admin bootstrap.
    async fn insert_user(&self, user: User) -> Result<User, StoreError>;

    /// Insert a faculty profile together with its login account atomically.
    async fn insert_faculty_account(
        &self,
        account: User,
        faculty: Faculty,
    ) -> Result<(User, Faculty), StoreError>;

    /// Apply profile changes; returns the updated record, or `None` when the
    /// user does not exist.
    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, StoreError>;

    /// Returns true when a row was deleted.
    async fn delete_user(&self, id: Uuid) -> Result<bool, StoreError>;
}
