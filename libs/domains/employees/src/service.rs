//! Employee Service - business rules on top of the repository

use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

use crate::error::{EmployeeError, EmployeeResult};
use crate::models::{
    CreateEmployee, DepartmentSalary, Employee, EmployeeChanges, EmployeeFilter, EmployeeRecord,
    UpdateEmployee,
};
use crate::repository::EmployeeRepository;

/// Employee service: validation, normalization and repository orchestration
pub struct EmployeeService<R: EmployeeRepository> {
    repository: Arc<R>,
}

impl<R: EmployeeRepository> EmployeeService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a new employee
    #[instrument(skip(self, input), fields(employee_id = %input.employee_id))]
    pub async fn create_employee(&self, input: CreateEmployee) -> EmployeeResult<Employee> {
        input
            .validate()
            .map_err(|e| EmployeeError::Validation(e.to_string()))?;

        let record = EmployeeRecord::try_from(input)?;
        let created = self.repository.create(record).await?;
        Ok(created.into())
    }

    #[instrument(skip(self))]
    pub async fn get_employee(&self, employee_id: &str) -> EmployeeResult<Employee> {
        self.repository
            .get_by_employee_id(employee_id)
            .await?
            .map(Employee::from)
            .ok_or_else(|| EmployeeError::NotFound(employee_id.to_string()))
    }

    /// Apply a partial update; an update without fields returns the current record
    #[instrument(skip(self, input))]
    pub async fn update_employee(
        &self,
        employee_id: &str,
        input: UpdateEmployee,
    ) -> EmployeeResult<Employee> {
        let changes = EmployeeChanges::try_from(input)?;
        if changes.is_empty() {
            return self.get_employee(employee_id).await;
        }

        self.repository
            .update(employee_id, changes)
            .await?
            .map(Employee::from)
            .ok_or_else(|| EmployeeError::NotFound(employee_id.to_string()))
    }

    /// Delete an employee; `false` when there was nothing to delete
    #[instrument(skip(self))]
    pub async fn delete_employee(&self, employee_id: &str) -> EmployeeResult<bool> {
        self.repository.delete(employee_id).await
    }

    #[instrument(skip(self))]
    pub async fn list_employees(&self, filter: EmployeeFilter) -> EmployeeResult<Vec<Employee>> {
        let records = self.repository.list(filter).await?;
        Ok(records.into_iter().map(Employee::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn list_all_employees(&self) -> EmployeeResult<Vec<Employee>> {
        let records = self.repository.list_all().await?;
        Ok(records.into_iter().map(Employee::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn search_by_skill(&self, skill: &str) -> EmployeeResult<Vec<Employee>> {
        let records = self.repository.search_by_skill(skill).await?;
        Ok(records.into_iter().map(Employee::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn average_salary_by_department(&self) -> EmployeeResult<Vec<DepartmentSalary>> {
        self.repository.average_salary_by_department().await
    }

    /// Replace the whole collection with `employees`.
    ///
    /// Every entry is validated and normalized before anything is removed.
    #[instrument(skip(self, employees), fields(count = employees.len()))]
    pub async fn replace_all(&self, employees: Vec<CreateEmployee>) -> EmployeeResult<u64> {
        let records = employees
            .into_iter()
            .map(|input| {
                input
                    .validate()
                    .map_err(|e| EmployeeError::Validation(e.to_string()))?;
                EmployeeRecord::try_from(input)
            })
            .collect::<EmployeeResult<Vec<_>>>()?;

        self.repository.replace_all(records).await
    }
}

impl<R: EmployeeRepository> Clone for EmployeeService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}
