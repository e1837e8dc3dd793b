use crate::classifier::{ReasonCode, Verdict};
use crate::errors::AppError;
use crate::handlers;
use crate::models::*;
use axum::{http::StatusCode, response::IntoResponse};
use utoipa::OpenApi;

/// OpenAPI document for the public HTTP surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Phone Check API",
        description = "Phone number validation and one-time passcode verification for web forms"
    ),
    paths(
        handlers::root,
        handlers::validate_phone,
        handlers::start_verify,
        handlers::check_verify
    ),
    components(schemas(
        Verdict,
        ReasonCode,
        ValidatePhoneRequest,
        StartVerifyRequest,
        CheckVerifyRequest,
        HealthResponse,
        InvalidRequestResponse,
        StartVerifyResponse,
        CheckVerifyResponse
    )),
    tags(
        (name = "health", description = "Liveness"),
        (name = "phone", description = "Phone validity classification"),
        (name = "verify", description = "One-time passcode verification")
    )
)]
pub struct ApiDoc;

/// Serves the generated OpenAPI document as JSON.
pub async fn serve_openapi_spec() -> Result<impl IntoResponse, AppError> {
    let content = ApiDoc::openapi()
        .to_pretty_json()
        .map_err(|e| AppError::InternalError(format!("Failed to render OpenAPI spec: {}", e)))?;

    Ok((
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "application/json")],
        content,
    ))
}

/// Serves the Swagger UI HTML page.
///
/// The page loads the document served by `serve_openapi_spec`.
pub async fn serve_swagger_ui() -> impl IntoResponse {
    let html = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Phone Check API - Swagger UI</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        body { margin: 0; padding: 0; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        window.onload = function() {
            window.ui = SwaggerUIBundle({
                url: "/api-docs/openapi.json",
                dom_id: '#swagger-ui',
                deepLinking: true
            });
        };
    </script>
</body>
</html>
"#;
    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let paths = doc["paths"].as_object().unwrap();
        for route in ["/", "/validate-phone", "/start-verify", "/check-verify"] {
            assert!(paths.contains_key(route), "missing {}", route);
        }
        assert!(doc["components"]["schemas"]["Verdict"].is_object());
    }
}
