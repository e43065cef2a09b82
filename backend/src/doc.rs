//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint, the request and response DTOs,
//! the error envelope, and the session cookie security scheme. Swagger UI
//! serves it in debug builds and `openapi-dump` prints it for tooling.

use crate::inbound::http::dto::{
    AdminStatusDto, AuthStatusDto, CheckDto, CustodianDto, IncidentDto, LogCheckBody,
    PasswordBody, ReportIncidentBody, ResolveIncidentBody, RestroomDto, RestroomStatusDto,
};
use crate::inbound::http::health::HealthBody;
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /auth/login or POST /admin/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Facility backend API",
        description = "Restroom checks, incident reports, and the staff/admin session guard."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::auth_status,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::admin_status,
        crate::inbound::http::auth::admin_login,
        crate::inbound::http::auth::admin_logout,
        crate::inbound::http::facilities::list_restrooms,
        crate::inbound::http::facilities::list_restroom_statuses,
        crate::inbound::http::facilities::get_restroom_status,
        crate::inbound::http::facilities::list_custodians,
        crate::inbound::http::checks::list_checks,
        crate::inbound::http::checks::log_check,
        crate::inbound::http::incidents::list_incidents,
        crate::inbound::http::incidents::report_incident,
        crate::inbound::http::incidents::resolve_incident,
        crate::inbound::http::health::live,
        crate::inbound::http::health::ready,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RestroomDto,
        CustodianDto,
        CheckDto,
        IncidentDto,
        RestroomStatusDto,
        LogCheckBody,
        ReportIncidentBody,
        ResolveIncidentBody,
        PasswordBody,
        AuthStatusDto,
        AdminStatusDto,
        HealthBody,
    )),
    tags(
        (name = "auth", description = "Staff and admin sessions"),
        (name = "facilities", description = "Restrooms, custodians, and derived status"),
        (name = "checks", description = "Restroom inspections"),
        (name = "incidents", description = "Problem reports and resolution"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::openapi::{property_names, unwrap_object_schema};
    use rstest::rstest;

    // utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";

    #[rstest]
    #[case(ERROR_SCHEMA_NAME, &["code", "message", "traceId", "details"])]
    #[case("IncidentDto", &["id", "custodianId", "restroomId", "pending", "resolvedAt"])]
    #[case("RestroomStatusDto", &["restroomId", "lastCheckedAt", "hasActiveIncident"])]
    fn schemas_expose_camel_case_fields(#[case] name: &str, #[case] expected: &[&str]) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas
            .get(name)
            .unwrap_or_else(|| panic!("{name} schema registered"));
        let fields = property_names(unwrap_object_schema(schema, name));

        for field in expected {
            assert!(fields.contains(field), "{name} should have field '{field}'");
        }
    }

    #[rstest]
    #[case("/checks")]
    #[case("/incidents/resolve")]
    #[case("/restrooms/{id}/status")]
    #[case("/admin/login")]
    #[case("/health/ready")]
    fn paths_are_registered(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "{path} missing");
    }

    #[test]
    fn websocket_feed_is_not_documented_as_rest() {
        let doc = ApiDoc::openapi();
        assert!(!doc.paths.paths.contains_key("/events"));
    }
}
