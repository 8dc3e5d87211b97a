//! Employees API routes
//!
//! Wires the employees domain to HTTP routes.

use axum::Router;
use domain_employees::{EmployeeResult, EmployeeService, MongoEmployeeRepository, handlers};
use mongodb::Database;

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    let repository = MongoEmployeeRepository::new(state.db.clone());
    handlers::router(EmployeeService::new(repository))
}

/// Collection validator and unique `employee_id` index; run before serving
pub async fn init_indexes(db: &Database) -> EmployeeResult<()> {
    MongoEmployeeRepository::new(db.clone()).init_indexes().await
}
