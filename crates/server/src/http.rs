//! HTTP endpoints
//!
//! REST API for the lead portal. Three surfaces: the read-only dashboard
//! (`GET /api/leads`), the rep drawer (login + claim), and the admin panel
//! (unlock + CSV upload + config reload).

use axum::{
    extract::{Json, Path, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use lead_portal_core::{IntentScore, Lead};
use lead_portal_ingest::{map_to_canonical, parse_csv};
use lead_portal_store::ClaimOutcome;

use crate::metrics::{metrics_handler, record_claim, record_upload};
use crate::session::Role;
use crate::state::AppState;
use crate::ServerError;

/// Session tokens travel in this header.
pub const SESSION_HEADER: &str = "x-session-token";

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let config = state.config.read();
    let cors_layer = build_cors_layer(&config.server.cors_origins, config.server.cors_enabled);
    drop(config);

    Router::new()
        // Sessions
        .route("/api/login", post(login))
        .route("/api/admin/unlock", post(unlock_admin))
        .route("/api/sessions/:token", delete(logout))
        // Dashboard + rep drawer
        .route("/api/leads", get(list_leads))
        .route("/api/leads/upload", post(upload_leads))
        .route("/api/leads/:phone/claim", post(claim_lead))
        // Health + metrics
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        // Admin
        .route("/admin/reload-config", post(reload_config))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        tracing::info!("No CORS origins configured, defaulting to localhost:3000");
        return CorsLayer::new()
            .allow_origin("http://localhost:3000".parse::<HeaderValue>().unwrap())
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any);
    }

    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .allow_credentials(true)
}

fn session_token(headers: &HeaderMap) -> Result<&str, ServerError> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ServerError::Session(format!("Missing {} header", SESSION_HEADER)))
}

/// Login request
#[derive(Debug, Deserialize)]
struct LoginRequest {
    name: String,
    password: String,
}

/// Session response
#[derive(Debug, Serialize)]
struct SessionResponse {
    token: String,
    name: String,
    role: Role,
}

/// Start a representative session
async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ServerError> {
    let auth = state.get_config().auth.clone();
    let session = state
        .sessions
        .login_rep(&auth, &request.name, &request.password)?;
    Ok(Json(SessionResponse {
        token: session.token.clone(),
        name: session.name.clone(),
        role: session.role,
    }))
}

/// Admin unlock request
#[derive(Debug, Deserialize)]
struct UnlockRequest {
    password: String,
}

/// Start an admin session
async fn unlock_admin(
    State(state): State<AppState>,
    Json(request): Json<UnlockRequest>,
) -> Result<Json<SessionResponse>, ServerError> {
    let auth = state.get_config().auth.clone();
    let session = state.sessions.unlock_admin(&auth, &request.password)?;
    Ok(Json(SessionResponse {
        token: session.token.clone(),
        name: session.name.clone(),
        role: session.role,
    }))
}

/// End a session
async fn logout(State(state): State<AppState>, Path(token): Path<String>) -> StatusCode {
    state.sessions.remove(&token);
    StatusCode::NO_CONTENT
}

/// One lead as the dashboard renders it.
#[derive(Debug, Serialize)]
struct LeadView {
    row: usize,
    phone: String,
    name: String,
    reason: String,
    timeline: String,
    city: String,
    objection_type: String,
    call_outcome: String,
    consultation_status: String,
    status: String,
    intent_score: IntentScore,
    intent_band: &'static str,
    lead_state: &'static str,
    picked: bool,
    picked_by: String,
    picked_at: String,
    last_refresh: String,
}

impl LeadView {
    fn from_stored(row: usize, lead: Lead) -> Self {
        Self {
            row,
            phone: lead.phone,
            name: lead.name,
            reason: lead.reason,
            timeline: lead.timeline,
            city: lead.city,
            objection_type: lead.objection_type,
            call_outcome: lead.call_outcome,
            consultation_status: lead.consultation_status,
            status: lead.status,
            intent_score: lead.intent_score,
            intent_band: lead.intent_band.as_str(),
            lead_state: lead.lead_state.as_str(),
            picked: lead.ownership.picked,
            picked_by: lead.ownership.picked_by,
            picked_at: lead.ownership.picked_at,
            last_refresh: lead.last_refresh,
        }
    }

    fn sort_score(&self) -> i64 {
        match self.intent_score {
            IntentScore::Scored(n) => n,
            IntentScore::Insufficient => i64::MIN,
        }
    }
}

/// Full lead list, freshest first, high intent first. Every call re-reads
/// the backing sheet; there is no push channel, clients refetch.
async fn list_leads(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let stored = state.store.load().await?;

    let mut leads: Vec<LeadView> = stored
        .into_iter()
        .map(|s| LeadView::from_stored(s.row, s.lead))
        .collect();
    leads.sort_by(|a, b| {
        b.last_refresh
            .cmp(&a.last_refresh)
            .then_with(|| b.sort_score().cmp(&a.sort_score()))
    });

    Ok(Json(serde_json::json!({
        "leads": leads,
        "count": leads.len(),
    })))
}

/// Upload response
#[derive(Debug, Serialize)]
struct UploadResponse {
    inserted: usize,
    updated: usize,
    skipped: usize,
    total: usize,
}

/// Accept a CSV upload, score it and upsert it into the sheet.
/// Admin session required; body is raw CSV text.
async fn upload_leads(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<UploadResponse>, ServerError> {
    state
        .sessions
        .require(session_token(&headers)?, Role::Admin)?;

    let table = parse_csv(&body)?;
    let batch = map_to_canonical(&table)?;

    let rules = state.scoring_rules();
    let refreshed_at = Utc::now().to_rfc3339();
    let mut leads = batch.leads;
    for lead in &mut leads {
        lead_portal_scoring::apply(lead, &rules);
        lead.last_refresh = refreshed_at.clone();
    }

    let summary = state.store.upsert_batch(&leads).await?;
    record_upload(summary.inserted, summary.updated, batch.skipped);

    tracing::info!(
        inserted = summary.inserted,
        updated = summary.updated,
        skipped = batch.skipped,
        "Processed CSV upload"
    );

    Ok(Json(UploadResponse {
        inserted: summary.inserted,
        updated: summary.updated,
        skipped: batch.skipped,
        total: leads.len(),
    }))
}

/// Claim response
#[derive(Debug, Serialize)]
struct ClaimResponse {
    ok: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    picked_by: Option<String>,
}

/// Claim a lead for the calling representative's session.
/// The outcome (success, conflict, not found) always comes back as a flag
/// plus a message; only transport/store failures become error statuses.
async fn claim_lead(
    State(state): State<AppState>,
    Path(phone): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ClaimResponse>, ServerError> {
    let session = state.sessions.require(session_token(&headers)?, Role::Rep)?;

    let outcome = state.store.claim(&phone, &session.name).await?;
    let response = match &outcome {
        ClaimOutcome::Picked { .. } => {
            record_claim("picked");
            ClaimResponse {
                ok: true,
                message: outcome.message(),
                picked_by: Some(session.name.clone()),
            }
        }
        ClaimOutcome::AlreadyPicked { by } => {
            record_claim("conflict");
            ClaimResponse {
                ok: false,
                message: outcome.message(),
                picked_by: Some(by.clone()),
            }
        }
        ClaimOutcome::NotFound => {
            record_claim("not_found");
            ClaimResponse {
                ok: false,
                message: outcome.message(),
                picked_by: None,
            }
        }
    };

    Ok(Json(response))
}

/// Health check: verifies the backing sheet answers a read.
async fn health_check(State(state): State<AppState>) -> (StatusCode, axum::Json<serde_json::Value>) {
    let mut checks = serde_json::Map::new();
    let mut healthy = true;

    match state.store.load().await {
        Ok(leads) => {
            checks.insert(
                "sheet".to_string(),
                serde_json::json!({ "status": "ok", "leads": leads.len() }),
            );
        }
        Err(e) => {
            healthy = false;
            checks.insert(
                "sheet".to_string(),
                serde_json::json!({ "status": "error", "message": e.to_string() }),
            );
        }
    }

    checks.insert(
        "sessions".to_string(),
        serde_json::json!({ "status": "ok", "count": state.sessions.count() }),
    );

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        axum::Json(serde_json::json!({
            "status": if healthy { "healthy" } else { "degraded" },
            "version": env!("CARGO_PKG_VERSION"),
            "checks": checks,
        })),
    )
}

/// Reload settings and scoring rules from disk. Admin session required.
async fn reload_config(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ServerError> {
    state
        .sessions
        .require(session_token(&headers)?, Role::Admin)?;

    match state.reload_config() {
        Ok(()) => Ok((
            StatusCode::OK,
            axum::Json(serde_json::json!({
                "status": "success",
                "message": "Configuration reloaded successfully",
            })),
        )),
        Err(e) => {
            tracing::error!("Config reload failed: {}", e);
            Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(serde_json::json!({
                    "status": "error",
                    "message": e,
                })),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lead_portal_config::Settings;

    fn settings() -> Settings {
        let mut settings = Settings::default();
        settings
            .auth
            .reps
            .insert("Rahul".to_string(), "rahul123".to_string());
        settings
            .auth
            .reps
            .insert("Priya".to_string(), "priya123".to_string());
        settings.auth.admin_password = "admin123".to_string();
        settings
    }

    fn token_headers(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, token.parse().unwrap());
        headers
    }

    const UPLOAD: &str = "Phone,Name,Reason,Timeline,City\n\
                          9876543210,Asha,high eye power,within 15 days,Mumbai\n";

    #[test]
    fn test_router_creation() {
        let state = AppState::new(Settings::default());
        let _ = create_router(state);
    }

    #[tokio::test]
    async fn test_upload_requires_admin_session() {
        let state = AppState::new(settings());

        let no_session = upload_leads(
            State(state.clone()),
            HeaderMap::new(),
            UPLOAD.to_string(),
        )
        .await;
        assert!(no_session.is_err());

        let rep = state
            .sessions
            .login_rep(&state.get_config().auth.clone(), "Rahul", "rahul123")
            .unwrap();
        let rep_session = upload_leads(
            State(state.clone()),
            token_headers(&rep.token),
            UPLOAD.to_string(),
        )
        .await;
        assert!(rep_session.is_err());
    }

    #[tokio::test]
    async fn test_upload_then_claim_flow() {
        let state = AppState::new(settings());
        let auth = state.get_config().auth.clone();

        let admin = state.sessions.unlock_admin(&auth, "admin123").unwrap();
        let upload = upload_leads(
            State(state.clone()),
            token_headers(&admin.token),
            UPLOAD.to_string(),
        )
        .await
        .unwrap();
        assert_eq!(upload.inserted, 1);
        assert_eq!(upload.updated, 0);

        // Scored on the way in
        let listed = list_leads(State(state.clone())).await.unwrap();
        assert_eq!(listed.0["count"], 1);
        assert_eq!(listed.0["leads"][0]["intent_score"], 70);
        assert_eq!(listed.0["leads"][0]["intent_band"], "High");
        assert_eq!(listed.0["leads"][0]["lead_state"], "High Intent");

        // First claim wins
        let rahul = state.sessions.login_rep(&auth, "Rahul", "rahul123").unwrap();
        let won = claim_lead(
            State(state.clone()),
            Path("9876543210".to_string()),
            token_headers(&rahul.token),
        )
        .await
        .unwrap();
        assert!(won.ok);

        // Second claim names the winner
        let priya = state.sessions.login_rep(&auth, "Priya", "priya123").unwrap();
        let lost = claim_lead(
            State(state.clone()),
            Path("9876543210".to_string()),
            token_headers(&priya.token),
        )
        .await
        .unwrap();
        assert!(!lost.ok);
        assert_eq!(lost.message, "Already picked by Rahul");
    }

    #[tokio::test]
    async fn test_upload_without_phone_column_is_rejected() {
        let state = AppState::new(settings());
        let admin = state
            .sessions
            .unlock_admin(&state.get_config().auth.clone(), "admin123")
            .unwrap();

        let result = upload_leads(
            State(state.clone()),
            token_headers(&admin.token),
            "Name,City\nAsha,Mumbai\n".to_string(),
        )
        .await;
        assert!(result.is_err());

        // Nothing was written
        let listed = list_leads(State(state)).await.unwrap();
        assert_eq!(listed.0["count"], 0);
    }
}
