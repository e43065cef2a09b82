//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! The session record carries two independent booleans. Handlers read them
//! once as a [`Capabilities`] value and pass that to the domain. A staff login
//! also stamps a login id so long-lived connections can tell when the login
//! has ended.

use std::collections::HashMap;

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::domain::{Capabilities, Error};
use crate::inbound::http::session_store::MemorySessionStore;

pub(crate) const AUTHENTICATED_KEY: &str = "authenticated";
pub(crate) const ADMIN_KEY: &str = "admin";
pub(crate) const LOGIN_KEY: &str = "login";

/// Newtype wrapper that exposes capability-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    fn flag(&self, key: &str) -> bool {
        match self.0.get::<bool>(key) {
            Ok(value) => value.unwrap_or(false),
            Err(error) => {
                warn!(key, error = %error, "unreadable session flag; treating as unset");
                false
            }
        }
    }

    fn set_flag(&self, key: &str, value: bool) -> Result<(), Error> {
        self.0
            .insert(key, value)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Capabilities held by this session. Missing or malformed flags read
    /// as unset.
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            authenticated: self.flag(AUTHENTICATED_KEY),
            admin: self.flag(ADMIN_KEY),
        }
    }

    /// Identifier stamped by the staff login, if any.
    pub fn login_id(&self) -> Option<String> {
        self.0.get::<String>(LOGIN_KEY).ok().flatten()
    }

    pub fn grant_authenticated(&self) -> Result<(), Error> {
        self.0.renew();
        if self.login_id().is_none() {
            self.0
                .insert(LOGIN_KEY, Uuid::new_v4().to_string())
                .map_err(|error| Error::internal(format!("failed to persist session: {error}")))?;
        }
        self.set_flag(AUTHENTICATED_KEY, true)
    }

    pub fn grant_admin(&self) -> Result<(), Error> {
        self.0.renew();
        self.set_flag(ADMIN_KEY, true)
    }

    /// Drop only the admin bit.
    pub fn revoke_admin(&self) {
        self.0.remove(ADMIN_KEY);
    }

    /// Delete the record and expire the cookie.
    pub fn purge(&self) {
        self.0.purge();
    }
}

fn stored_equals(state: &HashMap<String, String>, key: &str, expected: &Value) -> bool {
    state
        .get(key)
        .and_then(|raw| serde_json::from_str::<Value>(raw).ok())
        .is_some_and(|value| &value == expected)
}

/// True while a stored session still authenticates `login_id`.
pub fn login_is_active(store: &MemorySessionStore, login_id: &str) -> bool {
    let login = Value::from(login_id);
    let authenticated = Value::Bool(true);
    store.any_live(|state| {
        stored_equals(state, LOGIN_KEY, &login)
            && stored_equals(state, AUTHENTICATED_KEY, &authenticated)
    })
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    use crate::inbound::http::test_utils::{session_cookie, test_session_middleware_over};

    fn session_test_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        session_test_app_over(MemorySessionStore::new())
    }

    fn session_test_app_over(
        store: MemorySessionStore,
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
            .wrap(test_session_middleware_over(store))
            .route(
                "/grant",
                web::get().to(|session: SessionContext| async move {
                    session.grant_authenticated()?;
                    session.grant_admin()?;
                    Ok::<_, Error>(HttpResponse::Ok())
                }),
            )
            .route(
                "/revoke-admin",
                web::get().to(|session: SessionContext| async move {
                    session.revoke_admin();
                    HttpResponse::Ok()
                }),
            )
            .route(
                "/purge",
                web::get().to(|session: SessionContext| async move {
                    session.purge();
                    HttpResponse::Ok()
                }),
            )
            .route(
                "/login-id",
                web::get().to(|session: SessionContext| async move {
                    HttpResponse::Ok().body(session.login_id().unwrap_or_default())
                }),
            )
            .route(
                "/caps",
                web::get().to(|session: SessionContext| async move {
                    let caps = session.capabilities();
                    HttpResponse::Ok().body(format!("{}:{}", caps.authenticated, caps.admin))
                }),
            )
    }

    #[actix_web::test]
    async fn fresh_session_has_no_capabilities() {
        let app = test::init_service(session_test_app()).await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/caps").to_request()).await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(test::read_body(res).await, "false:false");
    }

    #[actix_web::test]
    async fn revoking_admin_keeps_authentication() {
        let app = test::init_service(session_test_app()).await;
        let granted =
            test::call_service(&app, test::TestRequest::get().uri("/grant").to_request()).await;
        let cookie = session_cookie(&granted).expect("session cookie set");

        let revoked = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/revoke-admin")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let cookie = session_cookie(&revoked).expect("session cookie set");
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/caps").cookie(cookie).to_request(),
        )
        .await;

        assert_eq!(test::read_body(res).await, "true:false");
    }

    #[actix_web::test]
    async fn malformed_flag_reads_as_unset() {
        let app = test::init_service(session_test_app().route(
            "/tamper",
            web::get().to(|session: Session| async move {
                session
                    .insert(AUTHENTICATED_KEY, "yes")
                    .expect("set malformed flag");
                HttpResponse::Ok()
            }),
        ))
        .await;
        let tampered =
            test::call_service(&app, test::TestRequest::get().uri("/tamper").to_request()).await;
        let cookie = session_cookie(&tampered).expect("session cookie set");

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/caps").cookie(cookie).to_request(),
        )
        .await;

        assert_eq!(test::read_body(res).await, "false:false");
    }

    #[actix_web::test]
    async fn purged_cookie_cannot_be_replayed() {
        let store = MemorySessionStore::new();
        let app = test::init_service(session_test_app_over(store.clone())).await;
        let granted =
            test::call_service(&app, test::TestRequest::get().uri("/grant").to_request()).await;
        let cookie = session_cookie(&granted).expect("session cookie set");
        assert_eq!(store.live_count(), 1);

        test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/purge")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/caps").cookie(cookie).to_request(),
        )
        .await;

        assert_eq!(test::read_body(res).await, "false:false");
        assert_eq!(store.live_count(), 0);
    }

    #[actix_web::test]
    async fn login_stays_active_until_purged() {
        let store = MemorySessionStore::new();
        let app = test::init_service(session_test_app_over(store.clone())).await;
        let granted =
            test::call_service(&app, test::TestRequest::get().uri("/grant").to_request()).await;
        let cookie = session_cookie(&granted).expect("session cookie set");
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/login-id")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        let login_id = String::from_utf8(test::read_body(res).await.to_vec()).expect("utf-8 id");
        assert!(!login_id.is_empty());
        assert!(login_is_active(&store, &login_id));

        let revoked = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/revoke-admin")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert!(revoked.status().is_success());
        assert!(login_is_active(&store, &login_id));

        test::call_service(
            &app,
            test::TestRequest::get().uri("/purge").cookie(cookie).to_request(),
        )
        .await;
        assert!(!login_is_active(&store, &login_id));
        assert!(!login_is_active(&store, "someone-else"));
    }
}
