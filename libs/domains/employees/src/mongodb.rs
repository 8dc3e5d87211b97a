//! MongoDB implementation of EmployeeRepository

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Bson, Document, doc, from_document},
    error::ErrorKind,
    options::{FindOptions, IndexOptions, ReturnDocument},
};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{EmployeeError, EmployeeResult, is_duplicate_key};
use crate::models::{
    COLLECTION_NAME, DepartmentSalary, EmployeeChanges, EmployeeFilter, EmployeeRecord,
};
use crate::normalize::round_to_cents;
use crate::repository::EmployeeRepository;

/// Server code returned when a collection is created concurrently
const NAMESPACE_EXISTS_CODE: i32 = 48;

/// IndexOptionsConflict and IndexKeySpecsConflict
const INDEX_CONFLICT_CODES: [i32; 2] = [85, 86];

/// Driver default name for `{employee_id: 1}`, shared with existing deployments
pub const EMPLOYEE_ID_INDEX: &str = "employee_id_1";

/// MongoDB implementation of the EmployeeRepository
pub struct MongoEmployeeRepository {
    db: Database,
    collection: Collection<EmployeeRecord>,
}

/// One row of the salary aggregation before rounding
#[derive(Debug, Deserialize)]
struct DepartmentAverageRow {
    department: Option<String>,
    average_salary: Option<f64>,
}

impl MongoEmployeeRepository {
    /// Repository over the `employees` collection of `db`
    ///
    /// # Example
    /// ```ignore
    /// let client = Client::with_uri_str("mongodb://localhost:27017").await?;
    /// let repo = MongoEmployeeRepository::new(client.database("assessment_db"));
    /// repo.init_indexes().await?;
    /// ```
    pub fn new(db: Database) -> Self {
        Self::with_collection(db, COLLECTION_NAME)
    }

    /// Repository over a custom collection name
    pub fn with_collection(db: Database, collection_name: &str) -> Self {
        let collection = db.collection::<EmployeeRecord>(collection_name);
        Self { db, collection }
    }

    /// Get the underlying collection for advanced operations
    pub fn collection(&self) -> &Collection<EmployeeRecord> {
        &self.collection
    }

    /// Create the collection with its schema validator if it does not exist,
    /// then ensure the unique index on `employee_id`.
    ///
    /// Safe to call on every startup.
    pub async fn init_indexes(&self) -> EmployeeResult<()> {
        let name = self.collection.name();
        let existing = self.db.list_collection_names().await?;

        if !existing.iter().any(|c| c == name) {
            match self
                .db
                .create_collection(name)
                .validator(Self::schema_validator())
                .await
            {
                Ok(()) => tracing::info!(collection = name, "Created collection with schema validator"),
                Err(e) if is_namespace_exists(&e) => {
                    tracing::debug!(collection = name, "Collection created concurrently")
                }
                Err(e) => return Err(e.into()),
            }
        }

        let index = IndexModel::builder()
            .keys(doc! { "employee_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name(EMPLOYEE_ID_INDEX.to_string())
                    .build(),
            )
            .build();

        match self.collection.create_index(index).await {
            Ok(_) => {}
            Err(e) if is_index_conflict(&e) => {
                if !self.has_unique_employee_id_index().await? {
                    return Err(e.into());
                }
                tracing::warn!(
                    collection = name,
                    "Unique employee_id index exists under another name, keeping it"
                );
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(collection = name, "Employee indexes initialized");
        Ok(())
    }

    async fn has_unique_employee_id_index(&self) -> EmployeeResult<bool> {
        let indexes: Vec<IndexModel> = self.collection.list_indexes().await?.try_collect().await?;
        Ok(indexes.iter().any(is_unique_employee_id_index))
    }

    /// `$jsonSchema` validator applied when the collection is created
    pub fn schema_validator() -> Document {
        doc! {
            "$jsonSchema": {
                "bsonType": "object",
                "required": ["employee_id", "name", "department", "salary", "joining_date", "skills"],
                "properties": {
                    "employee_id": { "bsonType": "string" },
                    "name": { "bsonType": "string" },
                    "department": { "bsonType": "string" },
                    "salary": { "bsonType": ["double", "int"] },
                    "joining_date": { "bsonType": "date" },
                    "skills": {
                        "bsonType": "array",
                        "items": { "bsonType": "string" }
                    }
                }
            }
        }
    }

    /// Build a MongoDB filter document from EmployeeFilter
    fn build_filter(filter: &EmployeeFilter) -> Document {
        let mut doc = doc! {};

        if let Some(department) = filter.department.as_deref().filter(|d| !d.is_empty()) {
            doc.insert("department", department);
        }

        doc
    }

    /// Case-insensitive, anchored, literal match on any element of `skills`.
    ///
    /// `\z` rather than `$`, which would also match before a trailing newline.
    fn skill_filter(skill: &str) -> Document {
        doc! {
            "skills": {
                "$regex": format!("^{}\\z", regex::escape(skill)),
                "$options": "i",
            }
        }
    }

    fn average_salary_pipeline() -> Vec<Document> {
        vec![
            doc! { "$addFields": { "salary": { "$toDouble": "$salary" } } },
            doc! { "$group": { "_id": "$department", "average_salary": { "$avg": "$salary" } } },
            doc! { "$project": { "_id": 0, "department": "$_id", "average_salary": 1 } },
            doc! { "$sort": { "department": 1 } },
        ]
    }

    async fn find_sorted(
        &self,
        filter: Document,
        options: FindOptions,
    ) -> EmployeeResult<Vec<EmployeeRecord>> {
        let cursor = self.collection.find(filter).with_options(options).await?;
        let records: Vec<EmployeeRecord> = cursor.try_collect().await?;
        Ok(records)
    }
}

/// `{employee_id: 1}` with `unique: true`, whatever its name
fn is_unique_employee_id_index(index: &IndexModel) -> bool {
    let ascending = match index.keys.get("employee_id") {
        Some(Bson::Int32(1)) | Some(Bson::Int64(1)) => true,
        Some(Bson::Double(order)) => *order == 1.0,
        _ => false,
    };
    let unique = index.options.as_ref().and_then(|o| o.unique) == Some(true);

    index.keys.len() == 1 && ascending && unique
}

fn is_index_conflict(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Command(command_error) if INDEX_CONFLICT_CODES.contains(&command_error.code)
    )
}

fn is_namespace_exists(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Command(command_error) if command_error.code == NAMESPACE_EXISTS_CODE
    )
}

#[async_trait]
impl EmployeeRepository for MongoEmployeeRepository {
    #[instrument(skip(self, record), fields(employee_id = %record.employee_id))]
    async fn create(&self, record: EmployeeRecord) -> EmployeeResult<EmployeeRecord> {
        let result = self.collection.insert_one(&record).await.map_err(|e| {
            if is_duplicate_key(&e) {
                EmployeeError::DuplicateKey(record.employee_id.clone())
            } else {
                e.into()
            }
        })?;

        tracing::info!("Employee created successfully");
        Ok(EmployeeRecord {
            id: result.inserted_id.as_object_id(),
            ..record
        })
    }

    #[instrument(skip(self))]
    async fn get_by_employee_id(
        &self,
        employee_id: &str,
    ) -> EmployeeResult<Option<EmployeeRecord>> {
        let record = self
            .collection
            .find_one(doc! { "employee_id": employee_id })
            .await?;
        Ok(record)
    }

    #[instrument(skip(self, changes))]
    async fn update(
        &self,
        employee_id: &str,
        changes: EmployeeChanges,
    ) -> EmployeeResult<Option<EmployeeRecord>> {
        let set = changes.to_set_document();
        if set.is_empty() {
            return self.get_by_employee_id(employee_id).await;
        }

        let updated = self
            .collection
            .find_one_and_update(doc! { "employee_id": employee_id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?;

        if updated.is_some() {
            tracing::info!("Employee updated successfully");
        }
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn delete(&self, employee_id: &str) -> EmployeeResult<bool> {
        let result = self
            .collection
            .delete_one(doc! { "employee_id": employee_id })
            .await?;

        let deleted = result.deleted_count > 0;
        if deleted {
            tracing::info!("Employee deleted successfully");
        }
        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: EmployeeFilter) -> EmployeeResult<Vec<EmployeeRecord>> {
        let options = FindOptions::builder()
            .skip(filter.skip)
            .limit(filter.limit)
            .sort(doc! { "joining_date": -1 })
            .build();

        self.find_sorted(Self::build_filter(&filter), options).await
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> EmployeeResult<Vec<EmployeeRecord>> {
        let options = FindOptions::builder()
            .sort(doc! { "joining_date": 1 })
            .build();

        self.find_sorted(doc! {}, options).await
    }

    #[instrument(skip(self))]
    async fn search_by_skill(&self, skill: &str) -> EmployeeResult<Vec<EmployeeRecord>> {
        let options = FindOptions::builder()
            .sort(doc! { "joining_date": 1 })
            .build();

        self.find_sorted(Self::skill_filter(skill), options).await
    }

    #[instrument(skip(self))]
    async fn average_salary_by_department(&self) -> EmployeeResult<Vec<DepartmentSalary>> {
        let cursor = self
            .collection
            .aggregate(Self::average_salary_pipeline())
            .await?;
        let rows: Vec<Document> = cursor.try_collect().await?;

        let mut averages = Vec::with_capacity(rows.len());
        for row in rows {
            match from_document::<DepartmentAverageRow>(row)? {
                DepartmentAverageRow {
                    department: Some(department),
                    average_salary: Some(average),
                } => averages.push(DepartmentSalary {
                    department,
                    average_salary: round_to_cents(average),
                }),
                row => tracing::warn!(?row, "Skipping salary group without department or average"),
            }
        }

        Ok(averages)
    }

    #[instrument(skip(self, records), fields(count = records.len()))]
    async fn replace_all(&self, records: Vec<EmployeeRecord>) -> EmployeeResult<u64> {
        let removed = self.collection.delete_many(doc! {}).await?;
        tracing::info!(removed = removed.deleted_count, "Cleared employees");

        if records.is_empty() {
            return Ok(0);
        }

        let result = self.collection.insert_many(&records).await?;
        Ok(result.inserted_ids.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_empty() {
        let doc = MongoEmployeeRepository::build_filter(&EmployeeFilter::default());
        assert!(doc.is_empty());
    }

    #[test]
    fn test_build_filter_with_department() {
        let filter = EmployeeFilter {
            department: Some("Engineering".to_string()),
            ..Default::default()
        };
        let doc = MongoEmployeeRepository::build_filter(&filter);
        assert_eq!(doc.get_str("department").unwrap(), "Engineering");
    }

    #[test]
    fn test_build_filter_ignores_blank_department() {
        let filter = EmployeeFilter {
            department: Some(String::new()),
            ..Default::default()
        };
        assert!(MongoEmployeeRepository::build_filter(&filter).is_empty());
    }

    #[test]
    fn test_skill_filter_is_anchored_and_escaped() {
        let doc = MongoEmployeeRepository::skill_filter("C++");
        let skills = doc.get_document("skills").unwrap();
        assert_eq!(skills.get_str("$regex").unwrap(), r"^C\+\+\z");
        assert_eq!(skills.get_str("$options").unwrap(), "i");
    }

    #[test]
    fn test_skill_pattern_matches_whole_token_only() {
        let doc = MongoEmployeeRepository::skill_filter("python");
        let pattern = doc.get_document("skills").unwrap().get_str("$regex").unwrap();
        let re = regex::RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .unwrap();

        assert!(re.is_match("Python"));
        assert!(!re.is_match("pyth"));
        assert!(!re.is_match("Python3"));
        assert!(!re.is_match("Python\n"));
    }

    fn employee_id_index(key: Bson, unique: Option<bool>) -> IndexModel {
        IndexModel::builder()
            .keys(doc! { "employee_id": key })
            .options(IndexOptions::builder().unique(unique).build())
            .build()
    }

    #[test]
    fn test_existing_unique_index_is_recognized() {
        assert!(is_unique_employee_id_index(&employee_id_index(Bson::Int32(1), Some(true))));
        assert!(is_unique_employee_id_index(&employee_id_index(Bson::Double(1.0), Some(true))));
    }

    #[test]
    fn test_non_unique_or_other_indexes_are_not_accepted() {
        assert!(!is_unique_employee_id_index(&employee_id_index(Bson::Int32(1), None)));
        assert!(!is_unique_employee_id_index(&employee_id_index(Bson::Int32(-1), Some(true))));

        let compound = IndexModel::builder()
            .keys(doc! { "employee_id": 1, "department": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        assert!(!is_unique_employee_id_index(&compound));
    }

    #[test]
    fn test_average_salary_pipeline_stages() {
        let pipeline = MongoEmployeeRepository::average_salary_pipeline();
        let stages: Vec<&str> = pipeline
            .iter()
            .map(|stage| stage.keys().next().unwrap().as_str())
            .collect();
        assert_eq!(stages, ["$addFields", "$group", "$project", "$sort"]);

        let group = pipeline[1].get_document("$group").unwrap();
        assert_eq!(group.get_str("_id").unwrap(), "$department");
        let sort = pipeline[3].get_document("$sort").unwrap();
        assert_eq!(sort.get_i32("department").unwrap(), 1);
    }

    #[test]
    fn test_schema_validator_requires_all_fields() {
        let validator = MongoEmployeeRepository::schema_validator();
        let schema = validator.get_document("$jsonSchema").unwrap();
        let required = schema.get_array("required").unwrap();
        assert_eq!(required.len(), 6);
        assert!(required.iter().any(|f| f.as_str() == Some("joining_date")));
    }
}
