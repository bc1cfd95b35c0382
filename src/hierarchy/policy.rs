use serde::Serialize;
use uuid::Uuid;

use crate::database::store::{HierarchyStore, StoreError};

/// Depth and fan-out caps for the admin tree. Policy, not tuning knobs: the
/// defaults (3 levels, 3 children) are the product's fixed shape, but the
/// evaluator takes them as parameters so tests can exercise other shapes.
#[derive(Debug, Clone, Copy)]
pub struct HierarchyLimits {
    pub max_depth: i32,
    pub max_children: i64,
}

impl Default for HierarchyLimits {
    fn default() -> Self {
        Self {
            max_depth: 3,
            max_children: 3,
        }
    }
}

/// Answer to "can this admin create a sub-admin right now".
#[derive(Debug, Clone, Serialize)]
pub struct CreationDecision {
    pub can_create: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl CreationDecision {
    fn allow() -> Self {
        Self {
            can_create: true,
            reason: None,
        }
    }

    fn deny(reason: impl Into<String>) -> Self {
        Self {
            can_create: false,
            reason: Some(reason.into()),
        }
    }
}

/// Creation eligibility plus the numbers behind it, for UI display.
#[derive(Debug, Clone, Serialize)]
pub struct CreationStatus {
    pub can_create: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub current_sub_admin_count: i64,
    pub max_sub_admins: i64,
    pub admin_level: i32,
    pub max_level: i32,
}

/// Pure decision functions gating mutating hierarchy operations.
///
/// Expected denials (actor missing, not an admin, over a cap, target missing)
/// are return values; only storage failures surface as `Err`. Checks read
/// current state on every call - eligibility is never cached, since a stale
/// answer is exactly the fan-out race described in the design.
#[derive(Debug, Clone, Copy)]
pub struct PolicyEvaluator {
    limits: HierarchyLimits,
}

/// Canonical depth-cap denial message.
pub fn depth_reason(max_depth: i32) -> String {
    format!("Maximum hierarchy depth reached ({} levels)", max_depth)
}

/// Canonical fan-out-cap denial message, shared with the guarded insert path.
pub fn fan_out_reason(max_children: i64) -> String {
    format!("Maximum sub-admin limit reached ({} per admin)", max_children)
}

impl PolicyEvaluator {
    pub fn new(limits: HierarchyLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> HierarchyLimits {
        self.limits
    }

    /// Can admin `actor_id` create a sub-admin?
    pub async fn can_create_sub_admin(
        &self,
        store: &dyn HierarchyStore,
        actor_id: Uuid,
    ) -> Result<CreationDecision, StoreError> {
        let Some(actor) = store.user_by_id(actor_id).await? else {
            return Ok(CreationDecision::deny("Admin account not found"));
        };
        if !actor.is_admin() {
            return Ok(CreationDecision::deny("Only admins can create sub-admins"));
        }
        if actor.admin_level >= self.limits.max_depth {
            return Ok(CreationDecision::deny(depth_reason(self.limits.max_depth)));
        }
        if store.count_sub_admins(actor_id).await? >= self.limits.max_children {
            return Ok(CreationDecision::deny(fan_out_reason(self.limits.max_children)));
        }
        Ok(CreationDecision::allow())
    }

    /// Can admin `actor_id` see/manage user `target_id`?
    ///
    /// The enforced boundary is deliberately narrow: self, or direct
    /// creation. Deeper descendants reachable through `hierarchy_path` are
    /// listable via the subtree view but are not manageable here.
    pub async fn can_see_user(
        &self,
        store: &dyn HierarchyStore,
        actor_id: Uuid,
        target_id: Uuid,
    ) -> Result<bool, StoreError> {
        let Some(actor) = store.user_by_id(actor_id).await? else {
            return Ok(false);
        };
        if !actor.is_admin() {
            return Ok(false);
        }
        if actor_id == target_id {
            return Ok(true);
        }
        let Some(target) = store.user_by_id(target_id).await? else {
            return Ok(false);
        };
        Ok(target.created_by == Some(actor_id))
    }

    /// Can admin `actor_id` see/manage faculty record `faculty_id`?
    pub async fn can_see_faculty(
        &self,
        store: &dyn HierarchyStore,
        actor_id: Uuid,
        faculty_id: Uuid,
    ) -> Result<bool, StoreError> {
        let Some(actor) = store.user_by_id(actor_id).await? else {
            return Ok(false);
        };
        if !actor.is_admin() {
            return Ok(false);
        }
        let Some(faculty) = store.faculty_by_id(faculty_id).await? else {
            return Ok(false);
        };
        Ok(faculty.created_by == actor_id)
    }

    /// Creation eligibility combined with the current counters.
    pub async fn creation_status(
        &self,
        store: &dyn HierarchyStore,
        actor_id: Uuid,
    ) -> Result<Option<CreationStatus>, StoreError> {
        let Some(actor) = store.user_by_id(actor_id).await? else {
            return Ok(None);
        };
        if !actor.is_admin() {
            return Ok(None);
        }

        let decision = self.can_create_sub_admin(store, actor_id).await?;
        let current = store.count_sub_admins(actor_id).await?;

        Ok(Some(CreationStatus {
            can_create: decision.can_create,
            reason: decision.reason,
            current_sub_admin_count: current,
            max_sub_admins: self.limits.max_children,
            admin_level: actor.admin_level,
            max_level: self.limits.max_depth,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::database::models::{Faculty, Role, User};
    use crate::database::MemoryStore;
    use crate::hierarchy::path::child_path;

    fn account(role: Role, parent: Option<&User>, created_by: Option<Uuid>) -> User {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let (path, level) = match parent {
            Some(p) => (child_path(&p.hierarchy_path, p.id), p.admin_level + 1),
            None => (String::new(), 0),
        };
        User {
            id,
            role,
            name: format!("user-{}", id.simple()),
            email: format!("{}@college.test", id.simple()),
            department: None,
            password_hash: "x".to_string(),
            parent_admin: parent.map(|p| p.id),
            created_by,
            admin_level: level,
            hierarchy_path: path,
            created_at: now,
            updated_at: now,
        }
    }

    async fn seed(store: &MemoryStore, user: &User) {
        store.insert_user(user.clone()).await.unwrap();
    }

    #[tokio::test]
    async fn depth_cap_denies_level_three_admin() {
        let store = MemoryStore::new();
        let evaluator = PolicyEvaluator::new(HierarchyLimits::default());

        let root = account(Role::Admin, None, None);
        let s1 = account(Role::Admin, Some(&root), Some(root.id));
        let s2 = account(Role::Admin, Some(&s1), Some(s1.id));
        let s3 = account(Role::Admin, Some(&s2), Some(s2.id));
        for u in [&root, &s1, &s2, &s3] {
            seed(&store, u).await;
        }
        assert_eq!(s3.admin_level, 3);

        let decision = evaluator.can_create_sub_admin(&store, s3.id).await.unwrap();
        assert!(!decision.can_create);
        assert_eq!(
            decision.reason.as_deref(),
            Some("Maximum hierarchy depth reached (3 levels)")
        );

        // Levels below the cap remain eligible
        let decision = evaluator.can_create_sub_admin(&store, s2.id).await.unwrap();
        assert!(decision.can_create);
    }

    #[tokio::test]
    async fn fan_out_cap_denies_fourth_child() {
        let store = MemoryStore::new();
        let evaluator = PolicyEvaluator::new(HierarchyLimits::default());

        let root = account(Role::Admin, None, None);
        seed(&store, &root).await;
        for _ in 0..3 {
            seed(&store, &account(Role::Admin, Some(&root), Some(root.id))).await;
        }

        let decision = evaluator.can_create_sub_admin(&store, root.id).await.unwrap();
        assert!(!decision.can_create);
        assert_eq!(
            decision.reason.as_deref(),
            Some("Maximum sub-admin limit reached (3 per admin)")
        );
    }

    #[tokio::test]
    async fn unknown_or_non_admin_actor_is_denied() {
        let store = MemoryStore::new();
        let evaluator = PolicyEvaluator::new(HierarchyLimits::default());

        let decision = evaluator
            .can_create_sub_admin(&store, Uuid::new_v4())
            .await
            .unwrap();
        assert!(!decision.can_create);

        let root = account(Role::Admin, None, None);
        seed(&store, &root).await;
        let faculty_account = account(Role::Faculty, None, Some(root.id));
        seed(&store, &faculty_account).await;

        let decision = evaluator
            .can_create_sub_admin(&store, faculty_account.id)
            .await
            .unwrap();
        assert!(!decision.can_create);
        assert!(!evaluator
            .can_see_user(&store, faculty_account.id, root.id)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn visibility_is_self_or_direct_creation_only() {
        let store = MemoryStore::new();
        let evaluator = PolicyEvaluator::new(HierarchyLimits::default());

        let root = account(Role::Admin, None, None);
        let s1 = account(Role::Admin, Some(&root), Some(root.id));
        let s2 = account(Role::Admin, Some(&s1), Some(s1.id));
        for u in [&root, &s1, &s2] {
            seed(&store, u).await;
        }

        // Self
        assert!(evaluator.can_see_user(&store, root.id, root.id).await.unwrap());
        // Direct creation
        assert!(evaluator.can_see_user(&store, root.id, s1.id).await.unwrap());
        assert!(evaluator.can_see_user(&store, s1.id, s2.id).await.unwrap());
        // Grandchild is in the subtree but NOT directly created: denied
        assert!(!evaluator.can_see_user(&store, root.id, s2.id).await.unwrap());
        // Upward and sideways: denied
        assert!(!evaluator.can_see_user(&store, s1.id, root.id).await.unwrap());
        // Missing target: denied, not an error
        assert!(!evaluator
            .can_see_user(&store, root.id, Uuid::new_v4())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn faculty_visibility_follows_creator() {
        let store = MemoryStore::new();
        let evaluator = PolicyEvaluator::new(HierarchyLimits::default());

        let a = account(Role::Admin, None, None);
        let b = account(Role::Admin, None, None);
        seed(&store, &a).await;
        seed(&store, &b).await;

        let now = Utc::now();
        let record = Faculty {
            id: Uuid::new_v4(),
            user_id: None,
            name: "Prof. Iyer".to_string(),
            email: "iyer@college.test".to_string(),
            department: Some("Physics".to_string()),
            created_by: a.id,
            created_at: now,
            updated_at: now,
        };
        let account_row = account(Role::Faculty, None, Some(a.id));
        store
            .insert_faculty_account(account_row, record.clone())
            .await
            .unwrap();

        assert!(evaluator.can_see_faculty(&store, a.id, record.id).await.unwrap());
        assert!(!evaluator.can_see_faculty(&store, b.id, record.id).await.unwrap());
        assert!(!evaluator
            .can_see_faculty(&store, a.id, Uuid::new_v4())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn custom_limits_change_the_decision_boundaries() {
        let store = MemoryStore::new();
        let evaluator = PolicyEvaluator::new(HierarchyLimits {
            max_depth: 1,
            max_children: 1,
        });

        let root = account(Role::Admin, None, None);
        let s1 = account(Role::Admin, Some(&root), Some(root.id));
        seed(&store, &root).await;
        seed(&store, &s1).await;

        let decision = evaluator.can_create_sub_admin(&store, s1.id).await.unwrap();
        assert_eq!(
            decision.reason.as_deref(),
            Some("Maximum hierarchy depth reached (1 levels)")
        );

        let decision = evaluator.can_create_sub_admin(&store, root.id).await.unwrap();
        assert_eq!(
            decision.reason.as_deref(),
            Some("Maximum sub-admin limit reached (1 per admin)")
        );
    }

    #[tokio::test]
    async fn creation_status_reports_counters() {
        let store = MemoryStore::new();
        let evaluator = PolicyEvaluator::new(HierarchyLimits::default());

        let root = account(Role::Admin, None, None);
        seed(&store, &root).await;
        seed(&store, &account(Role::Admin, Some(&root), Some(root.id))).await;
        seed(&store, &account(Role::Admin, Some(&root), Some(root.id))).await;

        let status = evaluator
            .creation_status(&store, root.id)
            .await
            .unwrap()
            .expect("root is an admin");
        assert!(status.can_create);
        assert_eq!(status.current_sub_admin_count, 2);
        assert_eq!(status.max_sub_admins, 3);
        assert_eq!(status.admin_level, 0);
        assert_eq!(status.max_level, 3);

        assert!(evaluator
            .creation_status(&store, Uuid::new_v4())
            .await
            .unwrap()
            .is_none());
    }
}
