// src/handlers/films.rs
// DOCUMENTATION: HTTP handlers for the public film catalogue
// PURPOSE: Parse requests, call services, return responses

use crate::errors::CinemaError;
use crate::models::FilmQuery;
use crate::services::CatalogService;
use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;

/// GET /api/films
/// Active films, newest release first
pub async fn list_films(
    pool: web::Data<PgPool>,
    query: web::Query<FilmQuery>,
) -> Result<impl Responder, CinemaError> {
    let films = CatalogService::list_films(pool.get_ref(), &query).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": films.len(),
        "data": films,
    })))
}

/// GET /api/films/{id}
pub async fn get_film(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
) -> Result<impl Responder, CinemaError> {
    let film = CatalogService::get_film(pool.get_ref(), &path).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": film,
    })))
}

/// GET /api/films/{id}/sessions
/// Upcoming scheduled sessions of one film
pub async fn film_sessions(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
) -> Result<impl Responder, CinemaError> {
    let (film, sessions) = CatalogService::film_sessions(pool.get_ref(), &path, Utc::now()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "film": film,
        "count": sessions.len(),
        "data": sessions,
    })))
}

/// Configuration for film routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/films")
            .route("", web::get().to(list_films))
            .route("/{id}", web::get().to(get_film))
            .route("/{id}/sessions", web::get().to(film_sessions)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};
    use sqlx::postgres::PgPoolOptions;

    fn lazy_pool() -> PgPool {
        PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap()
    }

    #[actix_web::test]
    async fn test_malformed_film_id() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(lazy_pool()))
                .configure(config),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/films/not-a-uuid").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["message"], "Invalid film ID");
    }

    #[actix_web::test]
    async fn test_malformed_id_on_sessions_route() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(lazy_pool()))
                .configure(config),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/films/123/sessions").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
