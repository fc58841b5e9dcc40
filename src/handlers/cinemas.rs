// src/handlers/cinemas.rs
// DOCUMENTATION: HTTP handlers for cinemas and their halls
// PURPOSE: Rate-limited cinema listings backed by Apollo Kino

use crate::config::Config;
use crate::errors::CinemaError;
use crate::services::{ApolloKinoClient, CatalogService, CinemaRateLimiter};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

/// Rate limiter key for a request: the peer IP, or the forwarded client
/// address when the server runs behind a trusted proxy
fn client_key(req: &HttpRequest, trust_proxy: bool) -> String {
    if trust_proxy {
        if let Some(addr) = req.connection_info().realip_remote_addr() {
            return addr.to_string();
        }
    }
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// GET /api/cinemas
/// Apollo theatre areas merged with local cinema records
pub async fn list_cinemas(
    pool: web::Data<PgPool>,
    client: web::Data<ApolloKinoClient>,
    limiter: web::Data<Arc<CinemaRateLimiter>>,
    config: web::Data<Config>,
    req: HttpRequest,
) -> Result<impl Responder, CinemaError> {
    limiter.check(&client_key(&req, config.trust_proxy))?;

    let cinemas = CatalogService::list_cinemas(pool.get_ref(), client.get_ref()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": cinemas.len(),
        "data": cinemas,
    })))
}

/// GET /api/cinemas/{id}/halls
/// The id may be a cinema UUID or its Apollo ID
pub async fn cinema_halls(
    pool: web::Data<PgPool>,
    limiter: web::Data<Arc<CinemaRateLimiter>>,
    config: web::Data<Config>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<impl Responder, CinemaError> {
    limiter.check(&client_key(&req, config.trust_proxy))?;

    let (cinema, halls) = CatalogService::cinema_halls(pool.get_ref(), &path).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "cinema": cinema,
        "count": halls.len(),
        "data": halls,
    })))
}

/// Configuration for cinema routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/cinemas")
            .route("", web::get().to(list_cinemas))
            .route("/{id}/halls", web::get().to(cinema_halls)),
    );
}
