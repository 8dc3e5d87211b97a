use chrono::NaiveDate;
use mongodb::bson::{Bson, DateTime as BsonDateTime, Document, doc, oid::ObjectId};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Name of the MongoDB collection holding employees
pub const COLLECTION_NAME: &str = "employees";

/// Employee as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Employee {
    /// Business key, unique across the collection
    #[schema(example = "E001")]
    pub employee_id: String,
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "Engineering")]
    pub department: String,
    #[schema(example = 75000.0)]
    pub salary: f64,
    /// ISO-8601 calendar date; legacy values that cannot be parsed are returned verbatim
    #[schema(value_type = Option<String>, format = Date, example = "2023-01-15")]
    pub joining_date: Option<WireDate>,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// `joining_date` as it appears on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireDate {
    /// Rendered as `YYYY-MM-DD`
    Date(NaiveDate),
    /// Stored value that could not be read as a date
    Unparsed(String),
}

/// `joining_date` as found in a stored document
#[derive(Debug, Clone, PartialEq)]
pub enum StoredDate {
    /// BSON datetime, the normal representation
    Timestamp(BsonDateTime),
    /// String written outside the service
    Legacy(String),
}

/// Document shape in the `employees` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    /// Storage identifier, never exposed
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub employee_id: String,
    pub name: String,
    pub department: String,
    pub salary: f64,
    /// Raw value; see [`StoredDate`] for the shapes the service understands
    #[serde(default)]
    pub joining_date: Option<Bson>,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// DTO for creating a new employee
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateEmployee {
    #[validate(length(min = 1))]
    #[schema(example = "E001")]
    pub employee_id: String,
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "Engineering")]
    pub department: String,
    #[schema(example = 75000)]
    pub salary: f64,
    /// Any common date notation; `YYYY-MM-DD` is preferred
    #[schema(example = "2023-01-15")]
    pub joining_date: String,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// DTO for a partial update. Absent and `null` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateEmployee {
    pub name: Option<String>,
    pub department: Option<String>,
    pub salary: Option<f64>,
    #[schema(example = "2023-01-15")]
    pub joining_date: Option<String>,
    pub skills: Option<Vec<String>>,
}

/// Normalized update, ready for `$set`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeChanges {
    pub name: Option<String>,
    pub department: Option<String>,
    pub salary: Option<f64>,
    pub joining_date: Option<BsonDateTime>,
    pub skills: Option<Vec<String>>,
}

impl EmployeeChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Fields to `$set`; only the ones present in the request
    pub fn to_set_document(&self) -> Document {
        let mut set = doc! {};

        if let Some(ref name) = self.name {
            set.insert("name", name);
        }
        if let Some(ref department) = self.department {
            set.insert("department", department);
        }
        if let Some(salary) = self.salary {
            set.insert("salary", salary);
        }
        if let Some(joining_date) = self.joining_date {
            set.insert("joining_date", joining_date);
        }
        if let Some(ref skills) = self.skills {
            set.insert("skills", skills.clone());
        }

        set
    }
}

/// Query filters for listing employees
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema, IntoParams)]
pub struct EmployeeFilter {
    /// Exact department match; empty means all departments
    pub department: Option<String>,
    /// Number of results to skip
    pub skip: Option<u64>,
    /// Maximum number of results
    #[validate(range(min = 1))]
    pub limit: Option<i64>,
}

/// Query for skill search
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
pub struct SkillQuery {
    /// Skill to look for, case-insensitive exact match
    pub skill: String,
}

/// Average salary of one department
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DepartmentSalary {
    #[schema(example = "Engineering")]
    pub department: String,
    /// Rounded to 2 decimals
    #[schema(example = 77500.0)]
    pub average_salary: f64,
}

/// Acknowledgement body of a delete, also used for its 404
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
    #[schema(example = "Employee E001 deleted")]
    pub message: String,
}

impl DeleteResponse {
    pub fn deleted(employee_id: &str) -> Self {
        Self {
            success: true,
            message: format!("Employee {} deleted", employee_id),
        }
    }

    pub fn not_found() -> Self {
        Self {
            success: false,
            message: "Employee not found".to_string(),
        }
    }
}
