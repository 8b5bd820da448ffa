//! Lead portal server
//!
//! HTTP endpoints for the three portal surfaces: the read-only dashboard,
//! the rep drawer (claiming), and the admin panel (CSV upload).

pub mod http;
pub mod metrics;
pub mod session;
pub mod state;

pub use http::create_router;
pub use metrics::{init_metrics, record_claim, record_upload};
pub use session::{Role, Session, SessionManager};
pub use state::AppState;

use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Upload rejected: {0}")]
    Ingest(#[from] lead_portal_ingest::IngestError),

    #[error("Store error: {0}")]
    Store(#[from] lead_portal_store::StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        use lead_portal_store::StoreError;

        match self {
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Session(_) => StatusCode::UNAUTHORIZED,
            Self::Ingest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Store(StoreError::MissingPhone) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl axum::response::IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        let body = axum::Json(serde_json::json!({
            "status": "error",
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}
