use actix_web::{error::BlockingError, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

use crate::core::{
    deferred_acceptance, IncrementalUpdater, Matching, MatchingError, RoundContext, RoundOutcome,
};
use crate::models::{
    CreateSessionRequest, ErrorResponse, HealthResponse, Role, RoundResponse, SessionResponse,
    SubmitRoundRequest, UpdateRequest,
};
use crate::services::{SessionError, SessionStore};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub updater: IncrementalUpdater,
}

/// Configure all round and session routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/rounds", web::post().to(run_round))
        .route("/sessions", web::post().to(create_session))
        .route("/sessions/{id}", web::get().to(get_session))
        .route("/sessions/{id}", web::delete().to(close_session))
        .route("/sessions/{id}/rounds", web::post().to(submit_round));
}

fn validation_failed(message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message,
        status_code: 400,
    })
}

fn session_not_found(err: SessionError) -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse {
        error: "Session not found".to_string(),
        message: err.to_string(),
        status_code: 404,
    })
}

fn worker_failed(err: BlockingError) -> HttpResponse {
    tracing::error!("Round worker failed: {}", err);
    HttpResponse::InternalServerError().json(ErrorResponse {
        error: "Internal error".to_string(),
        message: err.to_string(),
        status_code: 500,
    })
}

/// Map a core error to a response
///
/// Rejected input is reported to the caller. A consistency fault means the
/// matching can no longer be trusted, so the process goes down instead.
fn round_failed(err: MatchingError) -> HttpResponse {
    if err.is_fatal() {
        tracing::error!("Internal consistency fault, aborting: {}", err);
        panic!("Internal consistency fault: {}", err);
    }

    tracing::info!("Round input rejected: {}", err);
    HttpResponse::UnprocessableEntity().json(ErrorResponse {
        error: "Rejected input".to_string(),
        message: err.to_string(),
        status_code: 422,
    })
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        active_sessions: state.sessions.len(),
    })
}

/// Stateless round
///
/// POST /api/v1/rounds
///
/// Request body:
/// ```json
/// {
///   "previous": { "men": { "m1": ["w1", "w2"] }, "women": { "w1": ["m1", "m2"] } },
///   "current":  { "men": { ... }, "women": { ... } },
///   "matching": { "m1": "w1" }
/// }
/// ```
async fn run_round(
    state: web::Data<AppState>,
    req: web::Json<UpdateRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate_payloads() {
        return validation_failed(errors.to_string());
    }

    let (previous, current, matching) = match req.into_inner().into_parts() {
        Ok(parts) => parts,
        Err(e) => return round_failed(e),
    };

    // Size is checked before the baseline scan; the round itself runs on the blocking pool
    let updater = state.updater.clone();
    let round = web::block(move || -> Result<(u64, RoundOutcome), MatchingError> {
        updater.admit_population(&previous)?;
        let mut context = RoundContext::new(previous, matching)?;
        let outcome = context.advance(current, &updater)?;
        Ok((context.round, outcome))
    })
    .await;

    match round {
        Ok(Ok((round, outcome))) => HttpResponse::Ok().json(RoundResponse::from_outcome(None, round, outcome)),
        Ok(Err(e)) => round_failed(e),
        Err(e) => worker_failed(e),
    }
}

/// Open a session
///
/// POST /api/v1/sessions
///
/// Without a `matching`, the baseline is the men-optimal stable matching.
async fn create_session(
    state: web::Data<AppState>,
    req: web::Json<CreateSessionRequest>,
) -> impl Responder {
    if let Err(errors) = req.preferences.validate() {
        return validation_failed(errors.to_string());
    }

    let CreateSessionRequest { preferences, matching } = req.into_inner();
    let preferences = match preferences.into_snapshot() {
        Ok(snapshot) => snapshot,
        Err(e) => return round_failed(e),
    };
    if let Err(e) = state.updater.admit_population(&preferences) {
        return round_failed(e);
    }

    let seeded = web::block(move || -> Result<RoundContext, MatchingError> {
        let matching = match matching {
            Some(pairs) => Matching::from_map(pairs)?,
            None => deferred_acceptance(&preferences, Role::Man)?,
        };
        RoundContext::new(preferences, matching)
    })
    .await;
    let context = match seeded {
        Ok(Ok(context)) => context,
        Ok(Err(e)) => return round_failed(e),
        Err(e) => return worker_failed(e),
    };

    let response_context = context.clone();
    let id = state.sessions.create(context).await;

    tracing::info!(
        "Opened session {} with {} pairs",
        id,
        response_context.matching.len()
    );

    HttpResponse::Created().json(SessionResponse::from_context(id, &response_context))
}

/// GET /api/v1/sessions/{id}
async fn get_session(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let id = path.into_inner();
    match state.sessions.get(&id).await {
        Ok(shared) => {
            let context = shared.lock().await;
            HttpResponse::Ok().json(SessionResponse::from_context(id, &context))
        }
        Err(e) => session_not_found(e),
    }
}

/// DELETE /api/v1/sessions/{id}
async fn close_session(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> impl Responder {
    match state.sessions.remove(&path.into_inner()).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => session_not_found(e),
    }
}

/// Run the next round on a session
///
/// POST /api/v1/sessions/{id}/rounds
///
/// Request body:
/// ```json
/// { "current": { "men": { ... }, "women": { ... } } }
/// ```
async fn submit_round(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<SubmitRoundRequest>,
) -> impl Responder {
    if let Err(errors) = req.current.validate() {
        return validation_failed(errors.to_string());
    }

    let id = path.into_inner();
    let shared = match state.sessions.get(&id).await {
        Ok(shared) => shared,
        Err(e) => return session_not_found(e),
    };

    let current = match req.into_inner().current.into_snapshot() {
        Ok(snapshot) => snapshot,
        Err(e) => return round_failed(e),
    };

    // Held for the whole round: one writer per session
    let mut context = shared.lock_owned().await;
    let updater = state.updater.clone();
    let round = web::block(move || -> Result<(u64, RoundOutcome), MatchingError> {
        let outcome = context.advance(current, &updater)?;
        Ok((context.round, outcome))
    })
    .await;

    match round {
        Ok(Ok((round, outcome))) => {
            tracing::debug!(
                "Session {} round {}: {} broken pairs",
                id,
                round,
                outcome.broken_pairs.len()
            );
            HttpResponse::Ok().json(RoundResponse::from_outcome(Some(id), round, outcome))
        }
        Ok(Err(e)) => round_failed(e),
        Err(e) => worker_failed(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_rejection_is_unprocessable() {
        let response = round_failed(MatchingError::PopulationChanged);

        assert_eq!(response.status(), actix_web::http::StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    #[should_panic(expected = "Internal consistency fault")]
    fn test_consistency_fault_aborts() {
        round_failed(MatchingError::Inconsistent("diverged".to_string()));
    }
}
