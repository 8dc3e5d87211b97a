use async_trait::async_trait;

use crate::error::EmployeeResult;
use crate::models::{DepartmentSalary, EmployeeChanges, EmployeeFilter, EmployeeRecord};

/// Repository trait for employee persistence
///
/// Records are addressed by `employee_id` only; the storage `_id` never
/// crosses this boundary as a key.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    /// Insert a new record. Fails with `DuplicateKey` if `employee_id` is taken.
    async fn create(&self, record: EmployeeRecord) -> EmployeeResult<EmployeeRecord>;

    /// Get a record by `employee_id`
    async fn get_by_employee_id(&self, employee_id: &str)
    -> EmployeeResult<Option<EmployeeRecord>>;

    /// Apply `changes` and return the updated record, `None` if nothing matched
    async fn update(
        &self,
        employee_id: &str,
        changes: EmployeeChanges,
    ) -> EmployeeResult<Option<EmployeeRecord>>;

    /// Delete by `employee_id`; `false` if nothing was deleted
    async fn delete(&self, employee_id: &str) -> EmployeeResult<bool>;

    /// Records matching `filter`, newest `joining_date` first
    async fn list(&self, filter: EmployeeFilter) -> EmployeeResult<Vec<EmployeeRecord>>;

    /// Every record, oldest `joining_date` first
    async fn list_all(&self) -> EmployeeResult<Vec<EmployeeRecord>>;

    /// Records with a skill equal to `skill` ignoring case, oldest first
    async fn search_by_skill(&self, skill: &str) -> EmployeeResult<Vec<EmployeeRecord>>;

    /// Mean salary per department, sorted by department
    async fn average_salary_by_department(&self) -> EmployeeResult<Vec<DepartmentSalary>>;

    /// Remove every record and insert `records`; returns how many were inserted
    async fn replace_all(&self, records: Vec<EmployeeRecord>) -> EmployeeResult<u64>;
}
