//! Sample data for local development.

use crate::models::CreateEmployee;

fn employee(
    employee_id: &str,
    name: &str,
    department: &str,
    salary: f64,
    joining_date: &str,
    skills: &[&str],
) -> CreateEmployee {
    CreateEmployee {
        employee_id: employee_id.to_string(),
        name: name.to_string(),
        department: department.to_string(),
        salary,
        joining_date: joining_date.to_string(),
        skills: skills.iter().map(|s| s.to_string()).collect(),
    }
}

/// Five employees across Engineering, HR and CSE
pub fn sample_employees() -> Vec<CreateEmployee> {
    vec![
        employee("E001", "John Doe", "Engineering", 75000.0, "2023-01-15", &["Python", "MongoDB", "APIs"]),
        employee("E002", "Jane Smith", "HR", 60000.0, "2022-11-01", &["Recruitment", "Communication"]),
        employee("E003", "Alice Johnson", "Engineering", 80000.0, "2023-05-20", &["Python", "FastAPI"]),
        employee("E004", "Bob Williams", "CSE", 70000.0, "2024-03-10", &["FastAPI", "APIs"]),
        employee("E005", "Mamon Chowdhury", "CSE", 72000.0, "2025-09-12", &["FastAPI", "MongoDB"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EmployeeRecord;
    use std::collections::HashSet;

    #[test]
    fn test_sample_employees_are_valid_and_unique() {
        let samples = sample_employees();
        let ids: HashSet<_> = samples.iter().map(|e| e.employee_id.clone()).collect();
        assert_eq!(ids.len(), samples.len());

        for sample in samples {
            assert!(EmployeeRecord::try_from(sample).is_ok());
        }
    }
}
