use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::models::{Faculty, Role, User, UserChanges};
use crate::database::store::{AdminInsert, HierarchyStore, StoreError};
use crate::hierarchy::path::path_contains;

/// In-memory store used by the test suite and for running the server without
/// Postgres. The write lock is held across check-and-insert, so the fan-out
/// guard is atomic.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    faculty: HashMap<Uuid, Faculty>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HierarchyStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state.users.get(&id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn faculty_by_id(&self, id: Uuid) -> Result<Option<Faculty>, StoreError> {
        let state = self.state.read().await;
        Ok(state.faculty.get(&id).cloned())
    }

    async fn count_sub_admins(&self, parent: Uuid) -> Result<i64, StoreError> {
        let state = self.state.read().await;
        Ok(count_sub_admins_locked(&state, parent))
    }

    async fn count_users_created_by(&self, admin: Uuid) -> Result<i64, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .filter(|u| u.created_by == Some(admin))
            .count() as i64)
    }

    async fn count_faculty_created_by(&self, admin: Uuid) -> Result<i64, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .faculty
            .values()
            .filter(|f| f.created_by == admin)
            .count() as i64)
    }

    async fn users_created_by(&self, admin: Uuid) -> Result<Vec<User>, StoreError> {
        let state = self.state.read().await;
        let mut users: Vec<User> = state
            .users
            .values()
            .filter(|u| u.created_by == Some(admin))
            .cloned()
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn faculty_created_by(&self, admin: Uuid) -> Result<Vec<Faculty>, StoreError> {
        let state = self.state.read().await;
        let mut faculty: Vec<Faculty> = state
            .faculty
            .values()
            .filter(|f| f.created_by == admin)
            .cloned()
            .collect();
        faculty.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(faculty)
    }

    async fn admins_in_subtree(&self, root: Uuid) -> Result<Vec<User>, StoreError> {
        let state = self.state.read().await;
        let mut admins: Vec<User> = state
            .users
            .values()
            .filter(|u| {
                u.role == Role::Admin
                    && (u.parent_admin == Some(root) || path_contains(&u.hierarchy_path, root))
            })
            .cloned()
            .collect();
        admins.sort_by(|a, b| a.admin_level.cmp(&b.admin_level).then(a.created_at.cmp(&b.created_at)));
        Ok(admins)
    }

    async fn insert_admin_guarded(
        &self,
        user: User,
        max_children: i64,
    ) -> Result<AdminInsert, StoreError> {
        let mut state = self.state.write().await;
        if let Some(parent) = user.parent_admin {
            if count_sub_admins_locked(&state, parent) >= max_children {
                return Ok(AdminInsert::LimitReached);
            }
        }
        state.users.insert(user.id, user.clone());
        Ok(AdminInsert::Created(user))
    }

    async fn insert_user(&self, user: User) -> Result<User, StoreError> {
        let mut state = self.state.write().await;
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn insert_faculty_account(
        &self,
        account: User,
        faculty: Faculty,
    ) -> Result<(User, Faculty), StoreError> {
        let mut state = self.state.write().await;
        state.users.insert(account.id, account.clone());
        state.faculty.insert(faculty.id, faculty.clone());
        Ok((account, faculty))
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, StoreError> {
        let mut state = self.state.write().await;
        let Some(user) = state.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(department) = changes.department {
            user.department = Some(department);
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        Ok(state.users.remove(&id).is_some())
    }
}

fn count_sub_admins_locked(state: &State, parent: Uuid) -> i64 {
    state
        .users
        .values()
        .filter(|u| u.role == Role::Admin && u.parent_admin == Some(parent))
        .count() as i64
}
