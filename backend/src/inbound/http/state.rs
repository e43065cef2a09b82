//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{FacilityCommand, FacilityQuery, LoginService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub commands: Arc<dyn FacilityCommand>,
    pub queries: Arc<dyn FacilityQuery>,
}

impl HttpState {
    /// Construct state from the driving ports.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use facility_backend::domain::ports::SharedSecretLoginService;
    /// use facility_backend::inbound::http::state::HttpState;
    /// # use facility_backend::domain::ports::{FacilityCommand, FacilityQuery};
    /// # fn wire(service: Arc<impl FacilityCommand + FacilityQuery + 'static>) {
    /// let login = Arc::new(SharedSecretLoginService::new(None, None));
    /// let state = HttpState::new(login, service.clone(), service);
    /// # let _ = state;
    /// # }
    /// ```
    pub fn new(
        login: Arc<dyn LoginService>,
        commands: Arc<dyn FacilityCommand>,
        queries: Arc<dyn FacilityQuery>,
    ) -> Self {
        Self {
            login,
            commands,
            queries,
        }
    }
}
