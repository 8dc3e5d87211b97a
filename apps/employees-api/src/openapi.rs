//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for all APIs
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Employees API",
        version = "0.1.0",
        description = "CRUD and reporting over employee records stored in MongoDB",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/api/employees", api = domain_employees::ApiDoc)
    ),
    tags(
        (name = "Employees", description = "Employee records (MongoDB)")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employee_paths_are_nested_under_api() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for expected in [
            "/api/employees",
            "/api/employees/all",
            "/api/employees/search",
            "/api/employees/avg-salary",
            "/api/employees/{employee_id}",
        ] {
            assert!(paths.contains(&expected), "missing {expected} in {paths:?}");
        }
    }
}
