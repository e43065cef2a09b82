//! Check endpoints.
//!
//! ```text
//! GET  /checks
//! POST /checks {"custodianId":1,"restroomId":2,"notes":"restocked"}
//! ```

use actix_web::{HttpResponse, get, post, web};

use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{CheckDto, LogCheckBody};
use crate::inbound::http::error::accept_json;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Most recent checks, newest first.
#[utoipa::path(
    get,
    path = "/checks",
    responses(
        (status = 200, description = "Up to 100 checks", body = [CheckDto]),
        (status = 401, description = "Login required", body = ErrorSchema)
    ),
    tags = ["checks"],
    operation_id = "listChecks"
)]
#[get("/checks")]
pub async fn list_checks(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<CheckDto>>> {
    let checks = state.queries.recent_checks(session.capabilities()).await?;
    Ok(web::Json(checks.iter().map(CheckDto::from).collect()))
}

/// Log a check. Refused with 403 while the restroom has a pending incident.
#[utoipa::path(
    post,
    path = "/checks",
    request_body = LogCheckBody,
    responses(
        (status = 201, description = "Check logged", body = CheckDto),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Restroom has an active incident", body = ErrorSchema)
    ),
    tags = ["checks"],
    operation_id = "logCheck"
)]
#[post("/checks")]
pub async fn log_check(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: Result<web::Json<LogCheckBody>, actix_web::Error>,
) -> ApiResult<HttpResponse> {
    let capabilities = session.capabilities();
    capabilities.require_authenticated()?;
    let body = accept_json(payload)?;
    let check = state.commands.log_check(capabilities, body.into()).await?;
    Ok(HttpResponse::Created().json(CheckDto::from(&check)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use serde_json::{Value, json};

    use crate::inbound::http::test_utils::{login_cookie, test_session_middleware};
    use crate::test_support::harness::{FacilityHarness, STAFF_PASSWORD};

    #[actix_web::test]
    async fn anonymous_post_writes_nothing() {
        let harness = FacilityHarness::new();
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(harness.http_state()))
                .wrap(test_session_middleware())
                .service(log_check),
        )
        .await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/checks")
                .set_json(json!({ "custodianId": 1, "restroomId": 1 }))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(harness.audit.entries().is_empty());
    }

    #[actix_web::test]
    async fn logged_check_is_listed() {
        let harness = FacilityHarness::new();
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(harness.http_state()))
                .wrap(test_session_middleware())
                .configure(crate::inbound::http::configure),
        )
        .await;
        let cookie = login_cookie(&app, "/auth/login", STAFF_PASSWORD, None).await;

        let created = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/checks")
                .cookie(cookie.clone())
                .set_json(json!({ "custodianId": 1, "restroomId": 2, "notes": "mopped" }))
                .to_request(),
        )
        .await;
        assert_eq!(created.status(), StatusCode::CREATED);

        let listed = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/checks")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(listed).await;
        assert_eq!(body[0]["restroomId"], 2);
        assert_eq!(body[0]["notes"], "mopped");
    }

    #[actix_web::test]
    async fn malformed_body_is_a_bad_request() {
        let harness = FacilityHarness::new();
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(harness.http_state()))
                .wrap(test_session_middleware())
                .configure(crate::inbound::http::configure),
        )
        .await;
        let cookie = login_cookie(&app, "/auth/login", STAFF_PASSWORD, None).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/checks")
                .cookie(cookie)
                .set_json(json!({ "restroomId": "two" }))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn anonymous_malformed_body_is_unauthorised() {
        let harness = FacilityHarness::new();
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(harness.http_state()))
                .wrap(test_session_middleware())
                .configure(crate::inbound::http::configure),
        )
        .await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/checks")
                .set_json(json!({}))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
