// src/handlers/admin.rs
// DOCUMENTATION: Admin handlers for films, sessions, bookings and data refresh
// PURPOSE: Management endpoints behind the X-Admin-Token header

use crate::config::Config;
use crate::errors::CinemaError;
use crate::models::{CreateFilmRequest, CreateSessionRequest, UpdateFilmRequest, UpdateSessionRequest};
use crate::services::{AdminService, ApolloKinoClient, BookingService, SyncService};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use chrono::{Local, Utc};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

/// Days planned by POST /api/admin/sessions/generate when none are given
const DEFAULT_GENERATE_DAYS: i64 = 7;
const MAX_GENERATE_DAYS: i64 = 60;

/// Query parameters for session generation
#[derive(Debug, Default, Deserialize)]
pub struct GenerateQuery {
    pub days: Option<i64>,
}

/// Helper function to verify admin authentication
/// DOCUMENTATION: Checks X-Admin-Token header against configured admin token.
/// With no token configured the admin routes are open.
pub(crate) fn verify_admin_token(req: &HttpRequest, config: &Config) -> Result<(), CinemaError> {
    if config.admin_token.is_empty() {
        return Ok(());
    }

    let token = req
        .headers()
        .get("X-Admin-Token")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            log::warn!("Admin request without token");
            CinemaError::Unauthorized
        })?;

    if token != config.admin_token {
        log::warn!("Admin request with invalid token");
        return Err(CinemaError::Forbidden);
    }

    Ok(())
}

// ---- Films ----

/// GET /api/admin/movies
pub async fn list_movies(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    req: HttpRequest,
) -> Result<impl Responder, CinemaError> {
    verify_admin_token(&req, &config)?;

    let films = AdminService::list_films(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": films.len(),
        "data": films,
    })))
}

/// POST /api/admin/movies
pub async fn create_movie(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    req: HttpRequest,
    body: web::Json<CreateFilmRequest>,
) -> Result<impl Responder, CinemaError> {
    verify_admin_token(&req, &config)?;

    let film = AdminService::create_film(pool.get_ref(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "data": film,
    })))
}

/// PUT /api/admin/movies/{id}
pub async fn update_movie(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<UpdateFilmRequest>,
) -> Result<impl Responder, CinemaError> {
    verify_admin_token(&req, &config)?;

    let film = AdminService::update_film(pool.get_ref(), &path, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": film,
    })))
}

/// DELETE /api/admin/movies/{id}
pub async fn delete_movie(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<impl Responder, CinemaError> {
    verify_admin_token(&req, &config)?;

    AdminService::delete_film(pool.get_ref(), &path).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Movie deleted successfully",
    })))
}

// ---- Sessions ----

/// GET /api/admin/sessions
pub async fn list_sessions(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    req: HttpRequest,
) -> Result<impl Responder, CinemaError> {
    verify_admin_token(&req, &config)?;

    let sessions = AdminService::list_sessions(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": sessions.len(),
        "data": sessions,
    })))
}

/// GET /api/admin/sessions/{id}
pub async fn get_session(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<impl Responder, CinemaError> {
    verify_admin_token(&req, &config)?;

    let session = AdminService::get_session(pool.get_ref(), &path).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": session,
    })))
}

/// POST /api/admin/sessions
pub async fn create_session(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    req: HttpRequest,
    body: web::Json<CreateSessionRequest>,
) -> Result<impl Responder, CinemaError> {
    verify_admin_token(&req, &config)?;

    let session = AdminService::create_session(pool.get_ref(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "data": session,
    })))
}

/// PUT /api/admin/sessions/{id}
pub async fn update_session(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<UpdateSessionRequest>,
) -> Result<impl Responder, CinemaError> {
    verify_admin_token(&req, &config)?;

    let session = AdminService::update_session(pool.get_ref(), &path, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": session,
    })))
}

/// DELETE /api/admin/sessions/{id}
pub async fn delete_session(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<impl Responder, CinemaError> {
    verify_admin_token(&req, &config)?;

    AdminService::delete_session(pool.get_ref(), &path).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Session deleted successfully",
    })))
}

/// POST /api/admin/sessions/generate?days=N
/// Replace past sessions with a timetable for the coming days
pub async fn generate_sessions(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    req: HttpRequest,
    query: web::Query<GenerateQuery>,
) -> Result<impl Responder, CinemaError> {
    verify_admin_token(&req, &config)?;

    let days = query.days.unwrap_or(DEFAULT_GENERATE_DAYS);
    if !(1..=MAX_GENERATE_DAYS).contains(&days) {
        return Err(CinemaError::InvalidInput(format!(
            "days must be between 1 and {}",
            MAX_GENERATE_DAYS
        )));
    }

    let stats =
        SyncService::generate_upcoming_sessions(pool.get_ref(), days, Local::now().date_naive())
            .await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": format!("Generated {} sessions for the next {} days", stats.created, days),
        "data": stats,
    })))
}

// ---- Bookings ----

/// GET /api/admin/bookings
pub async fn list_bookings(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    req: HttpRequest,
) -> Result<impl Responder, CinemaError> {
    verify_admin_token(&req, &config)?;

    let bookings = BookingService::list_all(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": bookings.len(),
        "data": bookings,
    })))
}

/// DELETE /api/admin/bookings/{id}
pub async fn delete_booking(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<impl Responder, CinemaError> {
    verify_admin_token(&req, &config)?;

    BookingService::delete(pool.get_ref(), &path).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Booking deleted successfully",
    })))
}

// ---- Refresh ----

/// POST /api/admin/refresh
/// Wipe the catalogue and rebuild it from Apollo Kino
pub async fn refresh(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    client: web::Data<ApolloKinoClient>,
    req: HttpRequest,
) -> Result<impl Responder, CinemaError> {
    verify_admin_token(&req, &config)?;

    log::info!("Admin database refresh requested");
    let stats = SyncService::refresh_database(pool.get_ref(), client.get_ref(), Utc::now()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Database refreshed from Apollo Kino",
        "data": stats,
    })))
}

/// Configuration for admin routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/admin")
            .route("/movies", web::get().to(list_movies))
            .route("/movies", web::post().to(create_movie))
            .route("/movies/{id}", web::put().to(update_movie))
            .route("/movies/{id}", web::delete().to(delete_movie))
            .route("/sessions", web::get().to(list_sessions))
            .route("/sessions", web::post().to(create_session))
            .route("/sessions/generate", web::post().to(generate_sessions))
            .route("/sessions/{id}", web::get().to(get_session))
            .route("/sessions/{id}", web::put().to(update_session))
            .route("/sessions/{id}", web::delete().to(delete_session))
            .route("/bookings", web::get().to(list_bookings))
            .route("/bookings/{id}", web::delete().to(delete_booking))
            .route("/refresh", web::post().to(refresh))
            .configure(super::halls::config),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::Value;

    fn lazy_pool() -> web::Data<PgPool> {
        web::Data::new(
            sqlx::postgres::PgPoolOptions::new()
                .connect_lazy("postgres://localhost/unused")
                .unwrap(),
        )
    }

    fn config_with_token(token: &str) -> Config {
        let mut config = Config::for_tests();
        config.admin_token = token.to_string();
        config
    }

    #[actix_web::test]
    async fn test_verify_admin_token() {
        let config = config_with_token("secret");

        let req = test::TestRequest::default().to_http_request();
        assert!(matches!(
            verify_admin_token(&req, &config),
            Err(CinemaError::Unauthorized)
        ));

        let req = test::TestRequest::default()
            .insert_header(("X-Admin-Token", "wrong"))
            .to_http_request();
        assert!(matches!(
            verify_admin_token(&req, &config),
            Err(CinemaError::Forbidden)
        ));

        let req = test::TestRequest::default()
            .insert_header(("X-Admin-Token", "secret"))
            .to_http_request();
        assert!(verify_admin_token(&req, &config).is_ok());
    }

    #[actix_web::test]
    async fn test_empty_token_leaves_admin_open() {
        let config = config_with_token("");
        let req = test::TestRequest::default().to_http_request();
        assert!(verify_admin_token(&req, &config).is_ok());
    }

    #[actix_web::test]
    async fn test_admin_route_requires_token() {
        let app = test::init_service(
            App::new()
                .app_data(lazy_pool())
                .app_data(web::Data::new(config_with_token("secret")))
                .configure(config),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/admin/movies").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_generate_rejects_out_of_range_days() {
        let app = test::init_service(
            App::new()
                .app_data(lazy_pool())
                .app_data(web::Data::new(config_with_token("")))
                .configure(config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/admin/sessions/generate?days=0")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_create_session_validation_message() {
        let app = test::init_service(
            App::new()
                .app_data(lazy_pool())
                .app_data(web::Data::new(config_with_token("")))
                .configure(config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/admin/sessions")
            .set_json(json!({ "film": "abc", "hall": "def" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body["error"]["message"],
            "film, hall, startTime, endTime, and price.standard are required"
        );
    }
}
