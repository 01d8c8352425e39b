//! Library entrypoint for the trader gateway.
//!
//! The binary only wires configuration, logging and the listener; everything
//! else lives here so integration tests under `tests/` can build the router
//! against their own collaborators.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod models;

// Mounted at crate root so handlers can refer to `crate::auth`.
#[path = "middleware/auth.rs"]
pub mod auth;

pub mod services;

pub mod controllers;
pub mod routes;

use services::{
    capabilities::{CredentialVerifier, ExecutionEngine, MarketData},
    paper_venue::PaperVenue,
    session_service::SessionManager,
};

#[derive(Clone)]
pub struct AppState {
    pub settings: config::Settings,
    pub sessions: SessionManager,
    pub credentials: Arc<dyn CredentialVerifier>,
    pub market: Arc<dyn MarketData>,
    pub engine: Arc<dyn ExecutionEngine>,
}

impl AppState {
    pub fn new(
        settings: config::Settings,
        credentials: Arc<dyn CredentialVerifier>,
        market: Arc<dyn MarketData>,
        engine: Arc<dyn ExecutionEngine>,
    ) -> Self {
        let sessions = SessionManager::from_settings(&settings);
        Self {
            settings,
            sessions,
            credentials,
            market,
            engine,
        }
    }

    /// All three collaborators backed by one in-memory venue.
    pub fn with_paper_venue(settings: config::Settings) -> Result<Self, error::VenueError> {
        let venue = Arc::new(PaperVenue::from_settings(&settings)?);
        Ok(Self::new(settings, venue.clone(), venue.clone(), venue))
    }
}
