//! Employees Domain
//!
//! CRUD and query operations over the `employees` MongoDB collection.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, OpenAPI
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Validation, business rules
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │  Normalize  │  ← Wire / storage date conversions
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + MongoDB implementation)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_employees::{EmployeeService, MongoEmployeeRepository, handlers};
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let repository = MongoEmployeeRepository::new(client.database("assessment_db"));
//! repository.init_indexes().await?;
//!
//! let router = handlers::router(EmployeeService::new(repository));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod normalize;
pub mod repository;
pub mod seed;
pub mod service;

pub use error::{EmployeeError, EmployeeResult};
pub use handlers::ApiDoc;
pub use models::{
    CreateEmployee, DeleteResponse, DepartmentSalary, Employee, EmployeeFilter, UpdateEmployee,
};
pub use self::mongodb::MongoEmployeeRepository;
pub use repository::EmployeeRepository;
pub use service::EmployeeService;
