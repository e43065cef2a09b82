//! Shared app builder and session helpers for facility integration tests.

#![allow(dead_code, reason = "each test crate uses a different subset")]

use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use serde_json::{Value, json};

use facility_backend::Trace;
use facility_backend::inbound::http::configure;
use facility_backend::test_support::harness::FacilityHarness;

pub use facility_backend::test_support::harness::{ADMIN_PASSWORD, STAFF_PASSWORD};

/// Full HTTP surface over the in-process store, with session records kept
/// in `harness.sessions`.
pub async fn init_app(
    harness: &FacilityHarness,
) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(harness.http_state()))
            .wrap(harness.session_middleware())
            .wrap(Trace)
            .configure(configure),
    )
    .await
}

pub fn session_cookie(res: &ServiceResponse<BoxBody>) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}

/// Log in through `uri`, optionally on top of an existing session.
pub async fn login<S>(
    app: &S,
    uri: &str,
    password: &str,
    existing: Option<Cookie<'static>>,
) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let mut req = TestRequest::post()
        .uri(uri)
        .set_json(json!({ "password": password }));
    if let Some(cookie) = existing {
        req = req.cookie(cookie);
    }
    let res = test::call_service(app, req.to_request()).await;
    assert!(res.status().is_success(), "login via {uri}: {}", res.status());
    session_cookie(&res).unwrap_or_else(|| panic!("login via {uri} set no cookie"))
}

/// Staff session with the admin bit added.
pub async fn admin_session<S>(app: &S) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let staff = login(app, "/auth/login", STAFF_PASSWORD, None).await;
    login(app, "/admin/login", ADMIN_PASSWORD, Some(staff)).await
}

pub async fn get_json<S>(app: &S, uri: &str, cookie: &Cookie<'static>) -> (u16, Value)
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let res = test::call_service(
        app,
        TestRequest::get().uri(uri).cookie(cookie.clone()).to_request(),
    )
    .await;
    let status = res.status().as_u16();
    (status, test::read_body_json(res).await)
}

pub async fn post_json<S>(app: &S, uri: &str, cookie: &Cookie<'static>, body: Value) -> (u16, Value)
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let res = test::call_service(
        app,
        TestRequest::post()
            .uri(uri)
            .cookie(cookie.clone())
            .set_json(body)
            .to_request(),
    )
    .await;
    let status = res.status().as_u16();
    (status, test::read_body_json(res).await)
}

/// `hasActiveIncident` for restroom `id`.
pub async fn is_blocked<S>(app: &S, cookie: &Cookie<'static>, id: i32) -> bool
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let (status, body) = get_json(app, &format!("/restrooms/{id}/status"), cookie).await;
    assert_eq!(status, 200);
    body["hasActiveIncident"]
        .as_bool()
        .unwrap_or_else(|| panic!("status body without hasActiveIncident: {body}"))
}
