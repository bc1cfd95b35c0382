use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::database::models::{Faculty, Role, User};
use crate::database::store::HierarchyStore;
use crate::hierarchy::PolicyEvaluator;
use crate::services::error::ServiceError;
use crate::services::password::hash_password;
use crate::services::{validate_email, validate_name, validate_password};

/// Input for faculty creation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewFaculty {
    pub email: String,
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub department: Option<String>,
}

/// Faculty profile operations behind the creator-visibility gate.
pub struct FacultyService {
    store: Arc<dyn HierarchyStore>,
    evaluator: PolicyEvaluator,
}

impl FacultyService {
    pub fn new(store: Arc<dyn HierarchyStore>, evaluator: PolicyEvaluator) -> Self {
        Self { store, evaluator }
    }

    fn store(&self) -> &dyn HierarchyStore {
        self.store.as_ref()
    }

    /// Create a faculty profile together with its login account. Faculty are
    /// leaves: the account carries no hierarchy placement of its own.
    pub async fn create_faculty(
        &self,
        actor_id: Uuid,
        input: NewFaculty,
    ) -> Result<Faculty, ServiceError> {
        validate_email(&input.email)?;
        validate_name(&input.name)?;
        validate_password(&input.password)?;

        self.require_admin(actor_id).await?;

        if self.store().user_by_email(&input.email).await?.is_some() {
            return Err(ServiceError::EmailTaken(input.email));
        }

        let now = Utc::now();
        let account = User {
            id: Uuid::new_v4(),
            role: Role::Faculty,
            name: input.name.clone(),
            email: input.email.clone(),
            department: input.department.clone(),
            password_hash: hash_password(&input.password)?,
            parent_admin: None,
            created_by: Some(actor_id),
            admin_level: 0,
            hierarchy_path: String::new(),
            created_at: now,
            updated_at: now,
        };
        let profile = Faculty {
            id: Uuid::new_v4(),
            user_id: Some(account.id),
            name: input.name,
            email: input.email,
            department: input.department,
            created_by: actor_id,
            created_at: now,
            updated_at: now,
        };

        let (_, faculty) = self.store().insert_faculty_account(account, profile).await?;
        info!(faculty = %faculty.id, creator = %actor_id, "Created faculty record");
        Ok(faculty)
    }

    /// Fetch a single faculty record behind the gate; 404 before 403.
    pub async fn get_faculty(&self, actor_id: Uuid, faculty_id: Uuid) -> Result<Faculty, ServiceError> {
        let Some(faculty) = self.store().faculty_by_id(faculty_id).await? else {
            return Err(ServiceError::NotFound("Faculty record not found".to_string()));
        };
        if !self
            .evaluator
            .can_see_faculty(self.store(), actor_id, faculty_id)
            .await?
        {
            return Err(ServiceError::Denied(
                "You don't have permission to view this faculty record".to_string(),
            ));
        }
        Ok(faculty)
    }

    /// Faculty records created by the actor.
    pub async fn list_faculty(&self, actor_id: Uuid) -> Result<Vec<Faculty>, ServiceError> {
        self.require_admin(actor_id).await?;
        Ok(self.store().faculty_created_by(actor_id).await?)
    }

    async fn require_admin(&self, actor_id: Uuid) -> Result<(), ServiceError> {
        match self.store().user_by_id(actor_id).await? {
            Some(actor) if actor.is_admin() => Ok(()),
            Some(_) => Err(ServiceError::Denied(
                "Only admins can manage faculty records".to_string(),
            )),
            None => Err(ServiceError::Denied("Admin account not found".to_string())),
        }
    }
}
