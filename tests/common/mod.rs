#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;

use campus_api::database::models::User;
use campus_api::database::{HierarchyStore, MemoryStore};
use campus_api::hierarchy::{HierarchyLimits, PolicyEvaluator};
use campus_api::services::{AdminService, FacultyService, NewFaculty, NewSubAdmin};

/// Test environment over the in-memory store: the same service wiring as
/// `main`, minus the HTTP layer.
pub struct TestEnv {
    pub store: Arc<dyn HierarchyStore>,
    pub admins: AdminService,
    pub faculty: FacultyService,
}

pub fn env() -> TestEnv {
    env_with_limits(HierarchyLimits::default())
}

pub fn env_with_limits(limits: HierarchyLimits) -> TestEnv {
    let store: Arc<dyn HierarchyStore> = Arc::new(MemoryStore::new());
    let evaluator = PolicyEvaluator::new(limits);
    TestEnv {
        admins: AdminService::new(store.clone(), evaluator),
        faculty: FacultyService::new(store.clone(), evaluator),
        store,
    }
}

/// Seed the level-0 root admin.
pub async fn seed_root(env: &TestEnv) -> Result<User> {
    let root = env
        .admins
        .bootstrap_root_admin("root@college.test", "Root Admin", "root-password")
        .await?
        .expect("fresh store has no root admin");
    Ok(root)
}

pub fn sub_admin(tag: &str) -> NewSubAdmin {
    NewSubAdmin {
        email: format!("{}@college.test", tag),
        name: format!("Admin {}", tag),
        password: "sub-admin-password".to_string(),
        department: Some("Examinations".to_string()),
    }
}

pub fn faculty_member(tag: &str) -> NewFaculty {
    NewFaculty {
        email: format!("{}@college.test", tag),
        name: format!("Prof. {}", tag),
        password: "faculty-password".to_string(),
        department: Some("Mathematics".to_string()),
    }
}
