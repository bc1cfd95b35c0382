use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::database::models::{Role, User, UserChanges};
use crate::database::store::{AdminInsert, HierarchyStore};
use crate::hierarchy::policy::fan_out_reason;
use crate::hierarchy::visibility::{self, AdminStatistics, VisibleUsers};
use crate::hierarchy::{resolve_placement, CreationStatus, PolicyEvaluator};
use crate::services::error::ServiceError;
use crate::services::password::hash_password;
use crate::services::{validate_email, validate_name, validate_password};

/// Input for sub-admin creation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSubAdmin {
    pub email: String,
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub department: Option<String>,
}

/// Sub-admin lifecycle operations: the derive-then-persist write pipeline
/// over the policy evaluator and path materializer.
pub struct AdminService {
    store: Arc<dyn HierarchyStore>,
    evaluator: PolicyEvaluator,
}

impl AdminService {
    pub fn new(store: Arc<dyn HierarchyStore>, evaluator: PolicyEvaluator) -> Self {
        Self { store, evaluator }
    }

    fn store(&self) -> &dyn HierarchyStore {
        self.store.as_ref()
    }

    /// Create a sub-admin under `actor_id`.
    ///
    /// The evaluator is consulted at request time, and the fan-out cap is
    /// re-verified atomically inside the store insert so concurrent sibling
    /// creations cannot overshoot it.
    pub async fn create_sub_admin(
        &self,
        actor_id: Uuid,
        input: NewSubAdmin,
    ) -> Result<User, ServiceError> {
        validate_email(&input.email)?;
        validate_name(&input.name)?;
        validate_password(&input.password)?;

        let decision = self.evaluator.can_create_sub_admin(self.store(), actor_id).await?;
        if !decision.can_create {
            let reason = decision
                .reason
                .unwrap_or_else(|| "Sub-admin creation not permitted".to_string());
            return Err(ServiceError::Denied(reason));
        }

        if self.store().user_by_email(&input.email).await?.is_some() {
            return Err(ServiceError::EmailTaken(input.email));
        }

        let placement = resolve_placement(self.store(), Some(actor_id)).await?;
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            role: Role::Admin,
            name: input.name,
            email: input.email,
            department: input.department,
            password_hash: hash_password(&input.password)?,
            parent_admin: Some(actor_id),
            created_by: Some(actor_id),
            admin_level: placement.admin_level,
            hierarchy_path: placement.hierarchy_path,
            created_at: now,
            updated_at: now,
        };

        let limits = self.evaluator.limits();
        match self.store().insert_admin_guarded(user, limits.max_children).await? {
            AdminInsert::Created(user) => {
                info!(sub_admin = %user.id, parent = %actor_id, level = user.admin_level, "Created sub-admin");
                Ok(user)
            }
            AdminInsert::LimitReached => {
                Err(ServiceError::Denied(fan_out_reason(limits.max_children)))
            }
        }
    }

    /// Fetch a single sub-admin behind the visibility gate. Existence is
    /// reported before permission: 404 and 403 stay distinct.
    pub async fn get_sub_admin(&self, actor_id: Uuid, target_id: Uuid) -> Result<User, ServiceError> {
        let target = self.load_sub_admin(target_id).await?;
        if !self.evaluator.can_see_user(self.store(), actor_id, target_id).await? {
            return Err(ServiceError::Denied(
                "You don't have permission to view this sub-admin".to_string(),
            ));
        }
        Ok(target)
    }

    /// Update a sub-admin's profile fields. Hierarchy placement is immutable.
    pub async fn update_sub_admin(
        &self,
        actor_id: Uuid,
        target_id: Uuid,
        changes: UserChanges,
    ) -> Result<User, ServiceError> {
        if changes.is_empty() {
            return Err(ServiceError::Validation(
                "No updatable fields provided".to_string(),
            ));
        }
        if let Some(email) = &changes.email {
            validate_email(email)?;
        }
        if let Some(name) = &changes.name {
            validate_name(name)?;
        }

        let target = self.load_sub_admin(target_id).await?;
        if !self.evaluator.can_see_user(self.store(), actor_id, target_id).await? {
            return Err(ServiceError::Denied(
                "You don't have permission to modify this sub-admin".to_string(),
            ));
        }

        if let Some(email) = &changes.email {
            if let Some(existing) = self.store().user_by_email(email).await? {
                if existing.id != target.id {
                    return Err(ServiceError::EmailTaken(email.clone()));
                }
            }
        }

        self.store()
            .update_user(target_id, changes)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Sub-admin not found".to_string()))
    }

    /// Delete a sub-admin. Blocked while the target still has created
    /// records, regardless of the actor's permission level otherwise.
    pub async fn delete_sub_admin(&self, actor_id: Uuid, target_id: Uuid) -> Result<(), ServiceError> {
        self.load_sub_admin(target_id).await?;
        if !self.evaluator.can_see_user(self.store(), actor_id, target_id).await? {
            return Err(ServiceError::Denied(
                "You don't have permission to delete this sub-admin".to_string(),
            ));
        }

        let users = self.store().count_users_created_by(target_id).await?;
        let faculty = self.store().count_faculty_created_by(target_id).await?;
        if users + faculty > 0 {
            return Err(ServiceError::IntegrityConflict { users, faculty });
        }

        self.store().delete_user(target_id).await?;
        info!(sub_admin = %target_id, actor = %actor_id, "Deleted sub-admin");
        Ok(())
    }

    /// Sub-admins directly created by the actor.
    pub async fn list_sub_admins(&self, actor_id: Uuid) -> Result<Vec<User>, ServiceError> {
        self.require_admin(actor_id).await?;
        Ok(visibility::visible_users(self.store(), actor_id).await?.admins)
    }

    /// Full visible-set partition for the actor.
    pub async fn visible_users(&self, actor_id: Uuid) -> Result<VisibleUsers, ServiceError> {
        self.require_admin(actor_id).await?;
        Ok(visibility::visible_users(self.store(), actor_id).await?)
    }

    /// Creation counters for the actor.
    pub async fn statistics(&self, actor_id: Uuid) -> Result<AdminStatistics, ServiceError> {
        self.require_admin(actor_id).await?;
        Ok(visibility::admin_statistics(self.store(), actor_id).await?)
    }

    /// Descendant subtree listing (reporting view, not the per-record gate).
    pub async fn hierarchy(&self, actor_id: Uuid) -> Result<Vec<User>, ServiceError> {
        self.require_admin(actor_id).await?;
        Ok(visibility::admins_in_hierarchy(self.store(), actor_id).await?)
    }

    /// Sub-admin creation status view for the UI.
    pub async fn creation_status(&self, actor_id: Uuid) -> Result<CreationStatus, ServiceError> {
        self.evaluator
            .creation_status(self.store(), actor_id)
            .await?
            .ok_or_else(|| ServiceError::Denied("Admin account not found".to_string()))
    }

    /// Seed the level-0 root admin on first run. Idempotent: returns `None`
    /// when the email is already registered.
    pub async fn bootstrap_root_admin(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<Option<User>, ServiceError> {
        validate_email(email)?;
        validate_name(name)?;
        validate_password(password)?;

        if self.store().user_by_email(email).await?.is_some() {
            return Ok(None);
        }

        let now = Utc::now();
        let user = self
            .store()
            .insert_user(User {
                id: Uuid::new_v4(),
                role: Role::Admin,
                name: name.to_string(),
                email: email.to_string(),
                department: None,
                password_hash: hash_password(password)?,
                parent_admin: None,
                created_by: None,
                admin_level: 0,
                hierarchy_path: String::new(),
                created_at: now,
                updated_at: now,
            })
            .await?;
        info!(root_admin = %user.id, "Bootstrapped root admin");
        Ok(Some(user))
    }

    async fn require_admin(&self, actor_id: Uuid) -> Result<User, ServiceError> {
        let Some(actor) = self.store().user_by_id(actor_id).await? else {
            return Err(ServiceError::Denied("Admin account not found".to_string()));
        };
        if !actor.is_admin() {
            return Err(ServiceError::Denied(
                "Only admins can access this resource".to_string(),
            ));
        }
        Ok(actor)
    }

    /// Load a target that must exist and be an admin; anything else is a
    /// plain not-found to the caller.
    async fn load_sub_admin(&self, target_id: Uuid) -> Result<User, ServiceError> {
        match self.store().user_by_id(target_id).await? {
            Some(user) if user.is_admin() => Ok(user),
            _ => Err(ServiceError::NotFound("Sub-admin not found".to_string())),
        }
    }
}

