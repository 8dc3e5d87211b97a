use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    ValidatedJson, ValidatedQuery,
    errors::responses::{
        BadRequestResponse, BadRequestValidationResponse, InternalServerErrorResponse,
        NotFoundResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::EmployeeResult;
use crate::models::{
    CreateEmployee, DeleteResponse, DepartmentSalary, Employee, EmployeeFilter, SkillQuery,
    UpdateEmployee,
};
use crate::repository::EmployeeRepository;
use crate::service::EmployeeService;

/// OpenAPI documentation for Employees API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_employees,
        create_employee,
        list_all_employees,
        search_by_skill,
        average_salary_by_department,
        get_employee,
        update_employee,
        delete_employee,
    ),
    components(
        schemas(Employee, CreateEmployee, UpdateEmployee, DepartmentSalary, DeleteResponse),
        responses(
            NotFoundResponse,
            BadRequestResponse,
            BadRequestValidationResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Employees", description = "Employee records (MongoDB)")
    )
)]
pub struct ApiDoc;

/// Create the employees router with all HTTP endpoints
pub fn router<R: EmployeeRepository + 'static>(service: EmployeeService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_employees).post(create_employee))
        .route("/all", get(list_all_employees))
        .route("/search", get(search_by_skill))
        .route("/avg-salary", get(average_salary_by_department))
        .route(
            "/{employee_id}",
            get(get_employee).put(update_employee).delete(delete_employee),
        )
        .with_state(shared_service)
}

/// List employees, newest joiners first
#[utoipa::path(
    get,
    path = "",
    tag = "Employees",
    params(EmployeeFilter),
    responses(
        (status = 200, description = "List of employees", body = Vec<Employee>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_employees<R: EmployeeRepository>(
    State(service): State<Arc<EmployeeService<R>>>,
    ValidatedQuery(filter): ValidatedQuery<EmployeeFilter>,
) -> EmployeeResult<Json<Vec<Employee>>> {
    let employees = service.list_employees(filter).await?;
    Ok(Json(employees))
}

/// Create a new employee
#[utoipa::path(
    post,
    path = "",
    tag = "Employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_employee<R: EmployeeRepository>(
    State(service): State<Arc<EmployeeService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateEmployee>,
) -> EmployeeResult<impl IntoResponse> {
    let employee = service.create_employee(input).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

/// List every employee, oldest joiners first
#[utoipa::path(
    get,
    path = "/all",
    tag = "Employees",
    responses(
        (status = 200, description = "All employees", body = Vec<Employee>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_all_employees<R: EmployeeRepository>(
    State(service): State<Arc<EmployeeService<R>>>,
) -> EmployeeResult<Json<Vec<Employee>>> {
    let employees = service.list_all_employees().await?;
    Ok(Json(employees))
}

/// Employees having a skill, ignoring case
#[utoipa::path(
    get,
    path = "/search",
    tag = "Employees",
    params(SkillQuery),
    responses(
        (status = 200, description = "Matching employees", body = Vec<Employee>),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn search_by_skill<R: EmployeeRepository>(
    State(service): State<Arc<EmployeeService<R>>>,
    ValidatedQuery(query): ValidatedQuery<SkillQuery>,
) -> EmployeeResult<Json<Vec<Employee>>> {
    let employees = service.search_by_skill(&query.skill).await?;
    Ok(Json(employees))
}

/// Average salary per department
#[utoipa::path(
    get,
    path = "/avg-salary",
    tag = "Employees",
    responses(
        (status = 200, description = "Averages sorted by department", body = Vec<DepartmentSalary>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn average_salary_by_department<R: EmployeeRepository>(
    State(service): State<Arc<EmployeeService<R>>>,
) -> EmployeeResult<Json<Vec<DepartmentSalary>>> {
    let averages = service.average_salary_by_department().await?;
    Ok(Json(averages))
}

/// Get an employee by employee_id
#[utoipa::path(
    get,
    path = "/{employee_id}",
    tag = "Employees",
    params(
        ("employee_id" = String, Path, description = "Employee business key")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_employee<R: EmployeeRepository>(
    State(service): State<Arc<EmployeeService<R>>>,
    Path(employee_id): Path<String>,
) -> EmployeeResult<Json<Employee>> {
    let employee = service.get_employee(&employee_id).await?;
    Ok(Json(employee))
}

/// Update the supplied fields of an employee
#[utoipa::path(
    put,
    path = "/{employee_id}",
    tag = "Employees",
    params(
        ("employee_id" = String, Path, description = "Employee business key")
    ),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_employee<R: EmployeeRepository>(
    State(service): State<Arc<EmployeeService<R>>>,
    Path(employee_id): Path<String>,
    ValidatedJson(input): ValidatedJson<UpdateEmployee>,
) -> EmployeeResult<Json<Employee>> {
    let employee = service.update_employee(&employee_id, input).await?;
    Ok(Json(employee))
}

/// Delete an employee
#[utoipa::path(
    delete,
    path = "/{employee_id}",
    tag = "Employees",
    params(
        ("employee_id" = String, Path, description = "Employee business key")
    ),
    responses(
        (status = 200, description = "Employee deleted", body = DeleteResponse),
        (status = 404, description = "No such employee", body = DeleteResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_employee<R: EmployeeRepository>(
    State(service): State<Arc<EmployeeService<R>>>,
    Path(employee_id): Path<String>,
) -> EmployeeResult<impl IntoResponse> {
    let response = if service.delete_employee(&employee_id).await? {
        (StatusCode::OK, Json(DeleteResponse::deleted(&employee_id)))
    } else {
        (StatusCode::NOT_FOUND, Json(DeleteResponse::not_found()))
    };
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EmployeeError;
    use crate::models::EmployeeRecord;
    use crate::repository::MockEmployeeRepository;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn call(mock: MockEmployeeRepository, request: Request<Body>) -> (StatusCode, Value) {
        let response = router(EmployeeService::new(mock))
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn with_json(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_returns_201_with_iso_date() {
        let mut mock = MockEmployeeRepository::new();
        mock.expect_create().returning(Ok);

        let (status, body) = call(
            mock,
            with_json(
                "POST",
                "/",
                json!({
                    "employee_id": "E001",
                    "name": "John Doe",
                    "department": "Engineering",
                    "salary": 75000,
                    "joining_date": "15 January 2023",
                    "skills": ["Python"]
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["joining_date"], "2023-01-15");
        assert_eq!(body["salary"], 75000.0);
    }

    #[tokio::test]
    async fn test_create_missing_field_is_rejected() {
        let mut mock = MockEmployeeRepository::new();
        mock.expect_create().never();

        let (status, body) = call(
            mock,
            with_json("POST", "/", json!({ "employee_id": "E001", "name": "John" })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "JSON_EXTRACTION");
    }

    #[tokio::test]
    async fn test_create_duplicate_is_400() {
        let mut mock = MockEmployeeRepository::new();
        mock.expect_create()
            .returning(|record: EmployeeRecord| Err(EmployeeError::DuplicateKey(record.employee_id)));

        let (status, body) = call(
            mock,
            with_json(
                "POST",
                "/",
                json!({
                    "employee_id": "E001",
                    "name": "John Doe",
                    "department": "Engineering",
                    "salary": 75000.0,
                    "joining_date": "2023-01-15"
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "employee_id 'E001' already exists");
    }

    #[tokio::test]
    async fn test_delete_missing_returns_success_false() {
        let mut mock = MockEmployeeRepository::new();
        mock.expect_delete().returning(|_| Ok(false));

        let request = Request::delete("/E404").body(Body::empty()).unwrap();
        let (status, body) = call(mock, request).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "success": false, "message": "Employee not found" }));
    }

    #[tokio::test]
    async fn test_delete_existing_returns_success_true() {
        let mut mock = MockEmployeeRepository::new();
        mock.expect_delete().returning(|_| Ok(true));

        let request = Request::delete("/E001").body(Body::empty()).unwrap();
        let (status, body) = call(mock, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true, "message": "Employee E001 deleted" }));
    }

    #[tokio::test]
    async fn test_static_routes_win_over_employee_id() {
        let mut mock = MockEmployeeRepository::new();
        mock.expect_get_by_employee_id().never();
        mock.expect_average_salary_by_department()
            .returning(|| Ok(vec![]));

        let (status, body) = call(mock, get("/avg-salary")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_search_requires_skill() {
        let mut mock = MockEmployeeRepository::new();
        mock.expect_search_by_skill().never();

        let (status, body) = call(mock, get("/search")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "INVALID_QUERY");
    }

    #[tokio::test]
    async fn test_list_rejects_zero_limit() {
        let mut mock = MockEmployeeRepository::new();
        mock.expect_list().never();

        let (status, body) = call(mock, get("/?limit=0")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_update_bad_date_is_400() {
        let mut mock = MockEmployeeRepository::new();
        mock.expect_update().never();

        let (status, body) = call(
            mock,
            with_json("PUT", "/E001", json!({ "joining_date": "later" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_get_missing_is_404() {
        let mut mock = MockEmployeeRepository::new();
        mock.expect_get_by_employee_id().returning(|_| Ok(None));

        let (status, body) = call(mock, get("/E404")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "NOT_FOUND");
    }
}
