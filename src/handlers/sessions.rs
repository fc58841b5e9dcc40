// src/handlers/sessions.rs
// DOCUMENTATION: HTTP handlers for public session listings
// PURPOSE: Session search and seat maps

use crate::errors::CinemaError;
use crate::models::SessionQuery;
use crate::services::CatalogService;
use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;

/// GET /api/sessions
/// Scheduled sessions, optionally for one film, hall or day
pub async fn list_sessions(
    pool: web::Data<PgPool>,
    query: web::Query<SessionQuery>,
) -> Result<impl Responder, CinemaError> {
    let sessions = CatalogService::list_sessions(pool.get_ref(), &query, Utc::now()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": sessions.len(),
        "data": sessions,
    })))
}

/// GET /api/sessions/{id}/seats
/// Hall layout with occupied seats and seat types
pub async fn session_seats(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
) -> Result<impl Responder, CinemaError> {
    let seat_map = CatalogService::session_seats(pool.get_ref(), &path).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": seat_map,
    })))
}

/// Configuration for session routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/sessions")
            .route("", web::get().to(list_sessions))
            .route("/{id}/seats", web::get().to(session_seats)),
    );
}
