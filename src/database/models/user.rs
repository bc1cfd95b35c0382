use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Account role tag. Admins participate in the hierarchy; faculty accounts
/// are leaf users attached to a Faculty profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Faculty,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Faculty => "faculty",
        }
    }
}

/// A user account. `parent_admin`, `admin_level` and `hierarchy_path` are
/// derived by the write path; handlers never set them directly.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub role: Role,
    pub name: String,
    pub email: String,
    pub department: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub parent_admin: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub admin_level: i32,
    pub hierarchy_path: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// True when this admin sits at the root of its tree.
    pub fn is_root_admin(&self) -> bool {
        self.is_admin() && self.parent_admin.is_none()
    }
}

/// Mutable profile fields for sub-admin updates. Hierarchy placement fields
/// are deliberately absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.department.is_none()
    }
}
