//! Restroom and custodian read endpoints.
//!
//! ```text
//! GET /restrooms
//! GET /restrooms/status
//! GET /restrooms/{id}/status
//! GET /custodians
//! ```

use actix_web::{get, web};

use crate::domain::RestroomId;
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{CustodianDto, RestroomDto, RestroomStatusDto};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// List every restroom ordered by id.
#[utoipa::path(
    get,
    path = "/restrooms",
    responses(
        (status = 200, description = "Restrooms", body = [RestroomDto]),
        (status = 401, description = "Login required", body = ErrorSchema)
    ),
    tags = ["facilities"],
    operation_id = "listRestrooms"
)]
#[get("/restrooms")]
pub async fn list_restrooms(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<RestroomDto>>> {
    let restrooms = state.queries.list_restrooms(session.capabilities()).await?;
    Ok(web::Json(restrooms.iter().map(RestroomDto::from).collect()))
}

/// Derived status of every restroom.
#[utoipa::path(
    get,
    path = "/restrooms/status",
    responses(
        (status = 200, description = "Restroom statuses", body = [RestroomStatusDto]),
        (status = 401, description = "Login required", body = ErrorSchema)
    ),
    tags = ["facilities"],
    operation_id = "listRestroomStatuses"
)]
#[get("/restrooms/status")]
pub async fn list_restroom_statuses(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<RestroomStatusDto>>> {
    let statuses = state
        .queries
        .restroom_statuses(session.capabilities())
        .await?;
    Ok(web::Json(
        statuses.into_iter().map(RestroomStatusDto::from).collect(),
    ))
}

/// Derived status of one restroom.
#[utoipa::path(
    get,
    path = "/restrooms/{id}/status",
    params(("id" = i32, Path, description = "Restroom id")),
    responses(
        (status = 200, description = "Restroom status", body = RestroomStatusDto),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "Unknown restroom", body = ErrorSchema)
    ),
    tags = ["facilities"],
    operation_id = "getRestroomStatus"
)]
#[get("/restrooms/{id}/status")]
pub async fn get_restroom_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<web::Json<RestroomStatusDto>> {
    let restroom_id = RestroomId::new(path.into_inner());
    let status = state
        .queries
        .restroom_status(session.capabilities(), restroom_id)
        .await?;
    Ok(web::Json(status.into()))
}

/// List every custodian ordered by id.
#[utoipa::path(
    get,
    path = "/custodians",
    responses(
        (status = 200, description = "Custodians", body = [CustodianDto]),
        (status = 401, description = "Login required", body = ErrorSchema)
    ),
    tags = ["facilities"],
    operation_id = "listCustodians"
)]
#[get("/custodians")]
pub async fn list_custodians(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<CustodianDto>>> {
    let custodians = state
        .queries
        .list_custodians(session.capabilities())
        .await?;
    Ok(web::Json(custodians.iter().map(CustodianDto::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use serde_json::Value;

    use crate::domain::ports::MockFacilityQuery;
    use crate::domain::{Capabilities, Error, ErrorCode};
    use crate::inbound::http::test_utils::{login_cookie, test_session_middleware};
    use crate::test_support::harness::{FacilityHarness, STAFF_PASSWORD};

    fn app_with(
        state: HttpState,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(state))
            .wrap(test_session_middleware())
            .configure(crate::inbound::http::configure)
    }

    #[actix_web::test]
    async fn listings_require_login() {
        let harness = FacilityHarness::new();
        let app = actix_test::init_service(app_with(harness.http_state())).await;

        for uri in ["/restrooms", "/restrooms/status", "/restrooms/1/status", "/custodians"] {
            let res =
                actix_test::call_service(&app, actix_test::TestRequest::get().uri(uri).to_request())
                    .await;
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{uri}");
        }
    }

    #[actix_web::test]
    async fn restrooms_are_listed_in_camel_case() {
        let harness = FacilityHarness::new();
        let app = actix_test::init_service(app_with(harness.http_state())).await;
        let cookie = login_cookie(&app, "/auth/login", STAFF_PASSWORD, None).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/restrooms")
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        let rows = body.as_array().expect("array");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["name"], "Lobby");
        assert_eq!(rows[0]["building"], "Main");
    }

    #[actix_web::test]
    async fn unknown_restroom_status_is_not_found() {
        let mut queries = MockFacilityQuery::new();
        queries
            .expect_restroom_status()
            .withf(|caps, id| *caps == Capabilities::STAFF && *id == RestroomId::new(77))
            .times(1)
            .returning(|_, _| Err(Error::not_found("restroom 77 not found")));
        let harness = FacilityHarness::new();
        let state = HttpState {
            queries: std::sync::Arc::new(queries),
            ..harness.http_state()
        };
        let app = actix_test::init_service(app_with(state)).await;
        let cookie = login_cookie(&app, "/auth/login", STAFF_PASSWORD, None).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/restrooms/77/status")
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body: Error = actix_test::read_body_json(res).await;
        assert_eq!(body.code(), ErrorCode::NotFound);
    }
}
