//! Staff and admin session endpoints.
//!
//! ```text
//! GET  /auth/status            {"isAuthenticated":false,"isAdmin":false}
//! POST /auth/login             {"password":"..."}
//! POST /auth/logout
//! GET  /admin/status           {"isAdmin":false}
//! POST /admin/login            {"password":"..."}
//! POST /admin/logout
//! ```
//!
//! The two logins are independent: admin login does not require a staff
//! session, and staff logout clears both bits.

use actix_web::{get, post, web};
use serde_json::json;
use tracing::info;

use crate::domain::{Error, LoginValidationError, Password, Role};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{AdminStatusDto, AuthStatusDto, PasswordBody};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

fn parse_password(body: PasswordBody) -> Result<Password, Error> {
    Password::new(&body.password).map_err(|err| match err {
        LoginValidationError::EmptyPassword => Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })),
    })
}

/// Report which capabilities the current session holds.
#[utoipa::path(
    get,
    path = "/auth/status",
    responses((status = 200, description = "Session capabilities", body = AuthStatusDto)),
    tags = ["auth"],
    operation_id = "authStatus",
    security([])
)]
#[get("/auth/status")]
pub async fn auth_status(session: SessionContext) -> web::Json<AuthStatusDto> {
    web::Json(session.capabilities().into())
}

/// Exchange the staff password for an authenticated session.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = PasswordBody,
    responses(
        (status = 200, description = "Login success", body = AuthStatusDto,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Blank password", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<PasswordBody>,
) -> ApiResult<web::Json<AuthStatusDto>> {
    let password = parse_password(payload.into_inner())?;
    state.login.authenticate(Role::Staff, &password).await?;
    session.grant_authenticated()?;
    info!("staff session opened");
    Ok(web::Json(session.capabilities().into()))
}

/// End the session entirely.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 200, description = "Session cleared", body = AuthStatusDto)),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> web::Json<AuthStatusDto> {
    session.purge();
    web::Json(AuthStatusDto {
        is_authenticated: false,
        is_admin: false,
    })
}

/// Report whether the session holds the admin bit.
#[utoipa::path(
    get,
    path = "/admin/status",
    responses((status = 200, description = "Admin flag", body = AdminStatusDto)),
    tags = ["auth"],
    operation_id = "adminStatus",
    security([])
)]
#[get("/admin/status")]
pub async fn admin_status(session: SessionContext) -> web::Json<AdminStatusDto> {
    web::Json(AdminStatusDto {
        is_admin: session.capabilities().admin,
    })
}

/// Exchange the admin password for the admin bit.
#[utoipa::path(
    post,
    path = "/admin/login",
    request_body = PasswordBody,
    responses(
        (status = 200, description = "Admin login success", body = AdminStatusDto),
        (status = 400, description = "Blank password", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "adminLogin",
    security([])
)]
#[post("/admin/login")]
pub async fn admin_login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<PasswordBody>,
) -> ApiResult<web::Json<AdminStatusDto>> {
    let password = parse_password(payload.into_inner())?;
    state.login.authenticate(Role::Admin, &password).await?;
    session.grant_admin()?;
    info!("admin session opened");
    Ok(web::Json(AdminStatusDto { is_admin: true }))
}

/// Drop the admin bit, keeping any staff login.
#[utoipa::path(
    post,
    path = "/admin/logout",
    responses((status = 200, description = "Admin flag cleared", body = AdminStatusDto)),
    tags = ["auth"],
    operation_id = "adminLogout",
    security([])
)]
#[post("/admin/logout")]
pub async fn admin_logout(session: SessionContext) -> web::Json<AdminStatusDto> {
    session.revoke_admin();
    web::Json(AdminStatusDto { is_admin: false })
}
