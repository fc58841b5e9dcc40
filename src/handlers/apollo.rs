// src/handlers/apollo.rs
// DOCUMENTATION: Apollo Kino proxy and sync handlers
// PURPOSE: Expose feed data and the incremental sync operations

use crate::errors::CinemaError;
use crate::services::date_range::default_date_range;
use crate::services::{ApolloKinoClient, ApolloMapper, SyncService};
use actix_web::{web, HttpResponse, Responder};
use chrono::{Local, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::PgPool;

/// Query parameters for GET /api/apollo-kino/schedule
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleQuery {
    /// YYYY-MM-DD, defaults to today
    pub dt_from: Option<String>,
    /// YYYY-MM-DD, defaults to dtFrom + 14 days
    pub dt_to: Option<String>,
}

fn collection_response(items: Vec<Value>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "success": true,
        "count": items.len(),
        "data": items,
    }))
}

/// GET /api/apollo-kino/sync
/// Upsert films from the Apollo Events feed
pub async fn sync_films(
    pool: web::Data<PgPool>,
    client: web::Data<ApolloKinoClient>,
) -> Result<impl Responder, CinemaError> {
    let stats = SyncService::sync_films(pool.get_ref(), client.get_ref()).await?;

    log::info!(
        "Film sync completed: {} added, {} updated, {} failed",
        stats.movies.added,
        stats.movies.updated,
        stats.movies.errors.len()
    );

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Apollo Kino data sync completed",
        "results": {
            "movies": stats.movies,
            "sessions": stats.sessions,
        },
        "totalMovies": stats.total_movies,
        "totalShows": stats.total_shows,
    })))
}

/// GET /api/apollo-kino/sync-cinemas
/// Upsert cinemas and their default halls from TheatreAreas
pub async fn sync_cinemas(
    pool: web::Data<PgPool>,
    client: web::Data<ApolloKinoClient>,
) -> Result<impl Responder, CinemaError> {
    let stats = SyncService::sync_cinemas(pool.get_ref(), client.get_ref()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Cinemas and halls synced successfully",
        "results": {
            "cinemas": stats.cinemas,
            "halls": stats.halls,
            "seats": stats.seats,
        },
        "count": stats.count,
    })))
}

/// GET /api/apollo-kino/raw
/// Raw Schedule document, for debugging the feed
pub async fn raw_schedule(client: web::Data<ApolloKinoClient>) -> impl Responder {
    let path = ApolloKinoClient::schedule_path(None, None, None);
    let (data, error) = match client.fetch_document(&path).await {
        Ok(document) => (Some(document), None),
        Err(e) => (None, Some(e.to_string())),
    };

    HttpResponse::Ok().json(json!({
        "success": true,
        "data": data,
        "error": error,
    }))
}

/// GET /api/apollo-kino/events
/// Events mapped to film records, not stored
pub async fn events(client: web::Data<ApolloKinoClient>) -> Result<impl Responder, CinemaError> {
    let now = Utc::now();
    let films: Vec<_> = client
        .fetch_events()
        .await?
        .iter()
        .map(|event| ApolloMapper::event_to_film(event, now))
        .collect();

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": films.len(),
        "movies": films,
    })))
}

/// GET /api/apollo-kino/schedule
/// Schedule and Events for a date range
pub async fn schedule(
    client: web::Data<ApolloKinoClient>,
    query: web::Query<ScheduleQuery>,
) -> Result<impl Responder, CinemaError> {
    let range = default_date_range(
        query.dt_from.as_deref(),
        query.dt_to.as_deref(),
        Local::now().date_naive(),
    )?;

    let dt_from = range.dt_from.format("%Y-%m-%d").to_string();
    let dt_to = range.dt_to.format("%Y-%m-%d").to_string();
    let data = client
        .fetch_schedule(Some(&dt_from), Some(&dt_to), None)
        .await;

    if let Some(error) = data.error {
        return Err(CinemaError::ServiceUnavailable(format!(
            "Failed to fetch Apollo Kino schedule data: {}",
            error
        )));
    }

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "dtFrom": dt_from,
        "dtTo": dt_to,
        "movies": data.movies,
        "shows": data.shows,
        "schedule": data.schedule,
        "events": data.events,
    })))
}

/// GET /api/apollo-kino/TheatreAreas
pub async fn theatre_areas(
    client: web::Data<ApolloKinoClient>,
) -> Result<impl Responder, CinemaError> {
    Ok(collection_response(client.fetch_theatre_areas().await?))
}

/// GET /api/apollo-kino/NewsCategories
pub async fn news_categories(
    client: web::Data<ApolloKinoClient>,
) -> Result<impl Responder, CinemaError> {
    Ok(collection_response(client.fetch_news_categories().await?))
}

/// GET /api/apollo-kino/News
pub async fn news(client: web::Data<ApolloKinoClient>) -> Result<impl Responder, CinemaError> {
    Ok(collection_response(client.fetch_news().await?))
}

/// Configuration for Apollo Kino routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/apollo-kino")
            .route("/sync", web::get().to(sync_films))
            .route("/sync-cinemas", web::get().to(sync_cinemas))
            .route("/raw", web::get().to(raw_schedule))
            .route("/events", web::get().to(events))
            .route("/schedule", web::get().to(schedule))
            .route("/TheatreAreas", web::get().to(theatre_areas))
            .route("/NewsCategories", web::get().to(news_categories))
            .route("/News", web::get().to(news)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const AREAS_XML: &str = r#"<TheatreAreas>
  <TheatreArea><ID>1004</ID><Name>Apollo Kino Solaris</Name></TheatreArea>
  <TheatreArea><ID>1005</ID><Name>Apollo Kino Ülemiste</Name></TheatreArea>
</TheatreAreas>"#;

    fn client_for(server: &MockServer) -> web::Data<ApolloKinoClient> {
        web::Data::new(ApolloKinoClient::new(&server.uri(), 5).unwrap())
    }

    #[actix_web::test]
    async fn test_theatre_areas_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/TheatreAreas"))
            .respond_with(ResponseTemplate::new(200).set_body_string(AREAS_XML))
            .mount(&server)
            .await;

        let app = test::init_service(App::new().app_data(client_for(&server)).configure(config)).await;

        let req = test::TestRequest::get()
            .uri("/api/apollo-kino/TheatreAreas")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["success"], true);
        assert_eq!(body["count"], 2);
        assert_eq!(body["data"][0]["Name"], "Apollo Kino Solaris");
    }

    #[actix_web::test]
    async fn test_schedule_rejects_inverted_range() {
        let server = MockServer::start().await;
        let app = test::init_service(App::new().app_data(client_for(&server)).configure(config)).await;

        let req = test::TestRequest::get()
            .uri("/api/apollo-kino/schedule?dtFrom=2025-03-10&dtTo=2025-03-01")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_schedule_upstream_failure_is_503() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let app = test::init_service(App::new().app_data(client_for(&server)).configure(config)).await;

        let req = test::TestRequest::get()
            .uri("/api/apollo-kino/schedule?dtFrom=2025-03-01")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
