//! Application route table.
//!
//! ```text
//! GET  /                 welcome message
//! *    /api/users/...    see `users`
//! *    /api/deals/...    see `deals`
//! GET  /uploads/{file}   see `uploads`
//! ```
//!
//! Anything else answers 404 with a JSON body.

use actix_web::{HttpResponse, get, web};
use serde::Serialize;

use crate::inbound::http::error::{json_error_handler, path_error_handler, query_error_handler};
use crate::inbound::http::users::MessageResponse;
use crate::inbound::http::{deals, uploads, users};

/// Greeting served at the root.
pub const WELCOME_MESSAGE: &str = "Welcome to the Deals API";

/// Body of the catch-all 404.
#[derive(Debug, Serialize)]
struct RouteNotFound {
    code: &'static str,
    message: &'static str,
}

/// API root.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Greeting", body = MessageResponse)),
    tags = ["meta"],
    operation_id = "welcome",
    security([])
)]
#[get("/")]
pub async fn welcome() -> web::Json<MessageResponse> {
    web::Json(MessageResponse::new(WELCOME_MESSAGE))
}

async fn route_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(RouteNotFound {
        code: "not_found",
        message: "Route not found",
    })
}

/// Register extractor error handlers, every API route, and the fallback.
///
/// Health probes are not included; the server mounts them alongside.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .service(welcome)
        .service(web::scope("/api/users").configure(users::configure))
        .service(web::scope("/api/deals").configure(deals::configure))
        .service(uploads::serve_upload)
        .default_service(web::to(route_not_found));
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::{Value, json};

    use crate::inbound::http::test_utils::MockPorts;

    async fn call(request: actix_test::TestRequest) -> (StatusCode, Value) {
        let app = actix_test::init_service(
            App::new()
                .app_data(MockPorts::default().into_state())
                .configure(configure),
        )
        .await;
        let response = actix_test::call_service(&app, request.to_request()).await;
        let status = response.status();
        let body = actix_test::read_body(response).await;
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    #[rstest]
    #[actix_web::test]
    async fn root_greets() {
        let (status, body) = call(actix_test::TestRequest::get().uri("/")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": WELCOME_MESSAGE}));
    }

    #[rstest]
    #[case::unknown_path(actix_test::TestRequest::get().uri("/api/coupons"))]
    #[case::unknown_nested(actix_test::TestRequest::post().uri("/nowhere/at/all"))]
    #[actix_web::test]
    async fn unknown_routes_get_a_json_404(#[case] request: actix_test::TestRequest) {
        let (status, body) = call(request).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"code": "not_found", "message": "Route not found"}));
    }

    #[rstest]
    #[actix_web::test]
    async fn malformed_json_is_a_bad_request() {
        let request = actix_test::TestRequest::post()
            .uri("/api/users/login")
            .insert_header(("content-type", "application/json"))
            .set_payload("{");

        let (status, body) = call(request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_request");
    }
}
