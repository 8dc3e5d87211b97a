//! `seed` subcommand: reset the collection to the sample employees.

use domain_employees::{EmployeeService, MongoEmployeeRepository, seed::sample_employees};
use mongodb::Database;
use tracing::info;

pub async fn run(db: &Database) -> eyre::Result<()> {
    let service = EmployeeService::new(MongoEmployeeRepository::new(db.clone()));

    let inserted = service.replace_all(sample_employees()).await?;

    info!(inserted, database = db.name(), "Seeded employees collection");
    Ok(())
}
