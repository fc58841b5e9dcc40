// src/handlers/halls.rs
// DOCUMENTATION: Admin handlers for halls and seat layouts
// PURPOSE: Hall CRUD and seat grid management, mounted under /api/admin

use super::admin::verify_admin_token;
use crate::config::Config;
use crate::errors::CinemaError;
use crate::models::{HallRequest, SeatLayoutRequest};
use crate::services::AdminService;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;

/// GET /api/admin/halls
pub async fn list_halls(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    req: HttpRequest,
) -> Result<impl Responder, CinemaError> {
    verify_admin_token(&req, &config)?;

    let halls = AdminService::list_halls(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": halls.len(),
        "data": halls,
    })))
}

/// POST /api/admin/halls
pub async fn create_hall(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    req: HttpRequest,
    body: web::Json<HallRequest>,
) -> Result<impl Responder, CinemaError> {
    verify_admin_token(&req, &config)?;

    let hall = AdminService::create_hall(pool.get_ref(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Hall created successfully",
        "data": hall,
    })))
}

/// PUT /api/admin/halls/{id}
pub async fn update_hall(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<HallRequest>,
) -> Result<impl Responder, CinemaError> {
    verify_admin_token(&req, &config)?;

    let hall = AdminService::update_hall(pool.get_ref(), &path, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Hall updated successfully",
        "data": hall,
    })))
}

/// DELETE /api/admin/halls/{id}
pub async fn delete_hall(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<impl Responder, CinemaError> {
    verify_admin_token(&req, &config)?;

    AdminService::delete_hall(pool.get_ref(), &path).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Hall and associated seats deleted successfully",
    })))
}

/// GET /api/admin/halls/{id}/seats
pub async fn hall_seats(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<impl Responder, CinemaError> {
    verify_admin_token(&req, &config)?;

    let seats = AdminService::hall_seats(pool.get_ref(), &path).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": seats,
    })))
}

/// POST /api/admin/halls/{id}/seats/generate
/// Body: {"vipRows": [1, 2], "twinRows": "9,10"}
pub async fn generate_seats(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    req: HttpRequest,
    path: web::Path<String>,
    body: Option<web::Json<SeatLayoutRequest>>,
) -> Result<impl Responder, CinemaError> {
    verify_admin_token(&req, &config)?;

    let layout = body.map(web::Json::into_inner).unwrap_or_default();
    let result = AdminService::generate_seats(pool.get_ref(), &path, layout).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Seat layout regenerated successfully",
        "data": result,
    })))
}

/// Hall routes, relative to the admin scope
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/halls", web::get().to(list_halls))
        .route("/halls", web::post().to(create_hall))
        .route("/halls/{id}", web::put().to(update_hall))
        .route("/halls/{id}", web::delete().to(delete_hall))
        .route("/halls/{id}/seats", web::get().to(hall_seats))
        .route("/halls/{id}/seats/generate", web::post().to(generate_seats));
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::Value;

    async fn call(req: test::TestRequest) -> (StatusCode, Value) {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(pool))
                .app_data(web::Data::new(Config::for_tests()))
                .service(web::scope("/api/admin").configure(config)),
        )
        .await;

        let resp = test::call_service(&app, req.to_request()).await;
        let status = resp.status();
        (status, test::read_body_json(resp).await)
    }

    #[actix_web::test]
    async fn test_create_hall_missing_fields() {
        let (status, body) = call(
            test::TestRequest::post()
                .uri("/api/admin/halls")
                .set_json(json!({ "name": "Hall 4", "rows": 10 })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"]["message"],
            "Missing required fields: cinema, name, rows, seatsPerRow, capacity"
        );
    }

    #[actix_web::test]
    async fn test_hall_routes_reject_bad_ids() {
        let (status, body) = call(test::TestRequest::delete().uri("/api/admin/halls/77")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Invalid hall ID");

        let (status, _) = call(
            test::TestRequest::post()
                .uri("/api/admin/halls/77/seats/generate")
                .set_json(json!({ "vipRows": "1,2" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
