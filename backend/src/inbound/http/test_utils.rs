//! Test helpers for inbound HTTP components.

use actix_session::SessionMiddleware;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;

use crate::inbound::http::session_store::MemorySessionStore;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Keeps records in a store nothing else can see.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<MemorySessionStore> {
    test_session_middleware_over(MemorySessionStore::new())
}

/// Like [`test_session_middleware`] but over a store the test can inspect.
pub fn test_session_middleware_over(
    store: MemorySessionStore,
) -> SessionMiddleware<MemorySessionStore> {
    SessionMiddleware::builder(store, Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// The `session` cookie set by `res`, if any.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}

/// Log in through `uri` and return the resulting session cookie.
///
/// Pass an existing cookie to add a capability to an open session.
pub async fn login_cookie<S, B>(
    app: &S,
    uri: &str,
    password: &str,
    existing: Option<Cookie<'static>>,
) -> Cookie<'static>
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse<B>,
            Error = actix_web::Error,
        >,
{
    let mut request = actix_web::test::TestRequest::post()
        .uri(uri)
        .set_json(serde_json::json!({ "password": password }));
    if let Some(cookie) = existing {
        request = request.cookie(cookie);
    }
    let res = actix_web::test::call_service(app, request.to_request()).await;
    assert!(res.status().is_success(), "login via {uri} failed: {}", res.status());
    match session_cookie(&res) {
        Some(cookie) => cookie,
        None => panic!("login via {uri} did not set a session cookie"),
    }
}
