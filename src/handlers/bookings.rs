// src/handlers/bookings.rs
// DOCUMENTATION: HTTP handlers for public bookings
// PURPOSE: Book seats and look bookings up by number

use crate::errors::CinemaError;
use crate::models::CreateBookingRequest;
use crate::services::BookingService;
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;

/// POST /api/bookings
/// Book seats for a session
pub async fn create_booking(
    pool: web::Data<PgPool>,
    req: web::Json<CreateBookingRequest>,
) -> Result<impl Responder, CinemaError> {
    let booking = BookingService::create_booking(pool.get_ref(), req.into_inner()).await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "data": booking,
    })))
}

/// GET /api/bookings/{booking_number}
pub async fn get_booking(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
) -> Result<impl Responder, CinemaError> {
    let booking = BookingService::get_by_number(pool.get_ref(), &path).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": booking,
    })))
}

/// Configuration for booking routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/bookings")
            .route("", web::post().to(create_booking))
            .route("/{booking_number}", web::get().to(get_booking)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;

    #[actix_web::test]
    async fn test_create_booking_missing_fields() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(pool))
                .configure(config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/bookings")
            .set_json(json!({ "sessionId": "abc", "seats": [] }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(
            body["error"]["message"],
            "sessionId, seats[], and contactEmail are required"
        );
    }
}
