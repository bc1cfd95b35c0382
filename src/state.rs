use std::sync::Arc;

use crate::database::store::HierarchyStore;
use crate::hierarchy::PolicyEvaluator;
use crate::services::{AdminService, FacultyService};

/// Shared application state handed to route handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn HierarchyStore>,
    pub evaluator: PolicyEvaluator,
}

impl AppState {
    pub fn new(store: Arc<dyn HierarchyStore>, evaluator: PolicyEvaluator) -> Self {
        Self { store, evaluator }
    }

    pub fn admin_service(&self) -> AdminService {
        AdminService::new(self.store.clone(), self.evaluator)
    }

    pub fn faculty_service(&self) -> FacultyService {
        FacultyService::new(self.store.clone(), self.evaluator)
    }
}
