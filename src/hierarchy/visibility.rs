use serde::Serialize;
use uuid::Uuid;

use crate::database::models::{Faculty, Role, User};
use crate::database::store::{HierarchyStore, StoreError};

/// Records an admin may enumerate: directly-created users partitioned by
/// role, plus the Faculty profiles they created.
#[derive(Debug, Serialize)]
pub struct VisibleUsers {
    pub admins: Vec<User>,
    pub faculty_users: Vec<User>,
    pub faculty: Vec<Faculty>,
}

/// Counters for the admin dashboard.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AdminStatistics {
    pub created_admins: i64,
    pub created_users: i64,
    pub created_faculty: i64,
    pub total_created: i64,
}

/// All users and faculty directly created by `admin_id`, shaped for list
/// endpoints. The same `created_by` boundary as the per-record gate.
pub async fn visible_users(
    store: &dyn HierarchyStore,
    admin_id: Uuid,
) -> Result<VisibleUsers, StoreError> {
    let created = store.users_created_by(admin_id).await?;
    let (admins, faculty_users): (Vec<User>, Vec<User>) =
        created.into_iter().partition(|u| u.role == Role::Admin);
    let faculty = store.faculty_created_by(admin_id).await?;

    Ok(VisibleUsers {
        admins,
        faculty_users,
        faculty,
    })
}

/// Creation counters for `admin_id`.
pub async fn admin_statistics(
    store: &dyn HierarchyStore,
    admin_id: Uuid,
) -> Result<AdminStatistics, StoreError> {
    let created = store.users_created_by(admin_id).await?;
    let created_admins = created.iter().filter(|u| u.role == Role::Admin).count() as i64;
    let created_users = created.iter().filter(|u| u.role == Role::Faculty).count() as i64;
    let created_faculty = store.count_faculty_created_by(admin_id).await?;

    Ok(AdminStatistics {
        created_admins,
        created_users,
        created_faculty,
        total_created: created_admins + created_users + created_faculty,
    })
}

/// Full descendant subtree of `admin_id` (path containment or direct
/// parentage). Reporting view only: membership here does NOT grant
/// per-record access, which stays with the narrower `created_by` gate.
pub async fn admins_in_hierarchy(
    store: &dyn HierarchyStore,
    admin_id: Uuid,
) -> Result<Vec<User>, StoreError> {
    store.admins_in_subtree(admin_id).await
}
