//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod checks;
pub mod dto;
pub mod error;
pub mod facilities;
pub mod health;
pub mod incidents;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod session_store;
pub mod state;
#[cfg(test)]
pub mod test_utils;

use actix_web::web;

pub use error::ApiResult;

/// Register the session and facility endpoints.
///
/// Handlers expect `web::Data<HttpState>` and a session middleware on the
/// enclosing app. Health probes are registered separately by the server.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
        .service(auth::auth_status)
        .service(auth::login)
        .service(auth::logout)
        .service(auth::admin_status)
        .service(auth::admin_login)
        .service(auth::admin_logout)
        .service(facilities::list_restrooms)
        .service(facilities::list_restroom_statuses)
        .service(facilities::get_restroom_status)
        .service(facilities::list_custodians)
        .service(checks::list_checks)
        .service(checks::log_check)
        .service(incidents::list_incidents)
        .service(incidents::report_incident)
        .service(incidents::resolve_incident);
}
