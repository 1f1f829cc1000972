//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint from the inbound layer together
//! with the bearer token security scheme. Swagger UI serves it in debug
//! builds and `cargo run --bin openapi-dump` exports it for tooling.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode, Role};
use crate::inbound::http::deal_form::DealJsonBody;
use crate::inbound::http::deals_dto::{DealEnvelope, DealResponse};
use crate::inbound::http::users::{
    LoginRequest, LoginResponse, MessageResponse, ProfileResponse, RegisterRequest,
};

/// Name of the bearer token security scheme.
pub const BEARER_SCHEME: &str = "BearerToken";

/// Adds the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Token issued by POST /api/users/login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Deals API",
        description = "Owners publish time-bounded discount deals; everyone browses them."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::routes::welcome,
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::profile,
        crate::inbound::http::deals::list_deals,
        crate::inbound::http::deals::my_deals,
        crate::inbound::http::deals::get_deal,
        crate::inbound::http::deals::create_deal,
        crate::inbound::http::deals::update_deal,
        crate::inbound::http::deals::delete_deal,
        crate::inbound::http::uploads::serve_upload,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Role,
        RegisterRequest,
        LoginRequest,
        LoginResponse,
        MessageResponse,
        ProfileResponse,
        DealJsonBody,
        DealResponse,
        DealEnvelope,
    )),
    tags(
        (name = "meta", description = "API root"),
        (name = "users", description = "Registration, login, and profile"),
        (name = "deals", description = "Publishing and browsing deals"),
        (name = "uploads", description = "Stored deal images"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn object_fields(schema: &RefOr<Schema>) -> Vec<String> {
        match schema {
            RefOr::T(Schema::Object(obj)) => obj.properties.keys().cloned().collect(),
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("/api/users/register")]
    #[case("/api/users/login")]
    #[case("/api/users/profile")]
    #[case("/api/deals")]
    #[case("/api/deals/my-deals")]
    #[case("/api/deals/{id}")]
    #[case("/uploads/{file}")]
    #[case("/health/ready")]
    fn documents_every_route(#[case] path: &str) {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn registers_the_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");

        assert!(components.security_schemes.contains_key(BEARER_SCHEME));
    }

    #[rstest]
    fn deal_schema_uses_camel_case_fields() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        let fields = object_fields(components.schemas.get("DealResponse").expect("DealResponse"));

        for field in ["id", "user", "startDate", "endDate", "createdAt", "updatedAt"] {
            assert!(fields.iter().any(|name| name == field), "missing {field}");
        }
    }
}
