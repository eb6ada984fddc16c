//! Shared handler state.

use std::sync::Arc;

use crate::db::EmployeeDatabase;

/// State passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn EmployeeDatabase>,
    /// Upper bound on the number of departments after a create.
    pub max_departments: i64,
}

impl AppState {
    pub fn new(db: Arc<dyn EmployeeDatabase>, max_departments: i64) -> Self {
        Self {
            db,
            max_departments,
        }
    }
}
