// src/services/apollo_client.rs
// DOCUMENTATION: Apollo Kino feed client
// PURPOSE: Fetch TheatreAreas, Events, Schedule and News documents from Apollo Kino

use crate::config::Config;
use crate::errors::CinemaError;
use crate::services::apollo_feed::{
    extract_feed_collection, extract_shows, parse_document, FeedCollection,
};
use crate::services::date_range::to_apollo_date;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; CinemaBookingBot/1.0)";

/// Apollo Kino feed client
/// DOCUMENTATION: One shared instance per process, handed to handlers through web::Data
pub struct ApolloKinoClient {
    /// HTTP client with timeout and bot User-Agent
    client: Client,
    /// Feed base URL, e.g. https://www.apollokino.ee/xml
    base_url: String,
}

/// Result of a schedule fetch
/// DOCUMENTATION: Upstream failures are reported through `error` instead of
/// failing the call, so callers can degrade gracefully
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScheduleData {
    /// Events extracted from the Events document
    pub movies: Vec<Value>,
    /// Shows extracted from the Schedule document
    pub shows: Vec<Value>,
    /// Raw Schedule document
    pub schedule: Option<Value>,
    /// Raw Events document
    pub events: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApolloKinoClient {
    /// Create a new client
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, CinemaError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                log::error!("Failed to build Apollo Kino HTTP client: {}", e);
                CinemaError::ExternalApiError(format!("Client error: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, CinemaError> {
        Self::new(&config.apollo_api_url, config.apollo_timeout_secs)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch one feed document
    /// DOCUMENTATION: XML bodies are converted to a JSON tree, anything else
    /// is parsed as JSON
    pub async fn fetch_document(&self, path: &str) -> Result<Value, CinemaError> {
        let url = format!("{}{}", self.base_url, path);

        log::debug!("Apollo Kino request: {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            log::error!("Apollo Kino request failed: {}", e);
            CinemaError::ExternalApiError(format!("Failed to fetch Apollo Kino data: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            log::error!("Apollo Kino error {} for {}", status, path);
            return Err(CinemaError::ExternalApiError(format!(
                "Failed to fetch Apollo Kino data: status {}",
                status
            )));
        }

        let body = response.text().await.map_err(|e| {
            log::error!("Failed to read Apollo Kino response: {}", e);
            CinemaError::ExternalApiError(format!("Read error: {}", e))
        })?;

        parse_document(&body).map_err(|e| {
            log::error!("Failed to parse Apollo Kino response for {}: {}", path, e);
            CinemaError::ExternalApiError(format!("Parse error: {}", e))
        })
    }

    /// Fetch a feed and unwrap its item list
    pub async fn fetch_collection(
        &self,
        collection: FeedCollection,
    ) -> Result<Vec<Value>, CinemaError> {
        let document = self.fetch_document(collection.path()).await?;
        let items = extract_feed_collection(&document, collection);

        log::info!("Apollo Kino {} returned {} items", collection.path(), items.len());

        Ok(items)
    }

    pub async fn fetch_theatre_areas(&self) -> Result<Vec<Value>, CinemaError> {
        self.fetch_collection(FeedCollection::TheatreAreas).await
    }

    pub async fn fetch_events(&self) -> Result<Vec<Value>, CinemaError> {
        self.fetch_collection(FeedCollection::Events).await
    }

    pub async fn fetch_news_categories(&self) -> Result<Vec<Value>, CinemaError> {
        self.fetch_collection(FeedCollection::NewsCategories).await
    }

    pub async fn fetch_news(&self) -> Result<Vec<Value>, CinemaError> {
        self.fetch_collection(FeedCollection::News).await
    }

    /// Build /Schedule?dt=..&dtFrom=..&dtTo=.. with Apollo DD.MM.YYYY dates
    /// Values that are neither ISO nor Apollo dates are passed through
    pub fn schedule_path(date_from: Option<&str>, date_to: Option<&str>, date: Option<&str>) -> String {
        let params: Vec<String> = [("dt", date), ("dtFrom", date_from), ("dtTo", date_to)]
            .iter()
            .filter_map(|(name, value)| {
                let value = value.filter(|v| !v.is_empty())?;
                let apollo = to_apollo_date(value).unwrap_or_else(|_| value.to_string());
                Some(format!("{}={}", name, apollo))
            })
            .collect();

        if params.is_empty() {
            "/Schedule".to_string()
        } else {
            format!("/Schedule?{}", params.join("&"))
        }
    }

    /// Fetch Schedule and Events together
    /// DOCUMENTATION: Never fails; see ScheduleData::error
    pub async fn fetch_schedule(
        &self,
        date_from: Option<&str>,
        date_to: Option<&str>,
        date: Option<&str>,
    ) -> ScheduleData {
        let schedule_path = Self::schedule_path(date_from, date_to, date);

        let documents = async {
            let schedule = self.fetch_document(&schedule_path).await?;
            let events = self.fetch_document(FeedCollection::Events.path()).await?;
            Ok::<_, CinemaError>((schedule, events))
        };

        match documents.await {
            Ok((schedule, events)) => ScheduleData {
                movies: extract_feed_collection(&events, FeedCollection::Events),
                shows: extract_shows(&schedule),
                schedule: Some(schedule),
                events: Some(events),
                error: None,
            },
            Err(e) => {
                log::error!("Apollo Kino schedule fetch failed: {}", e);
                ScheduleData {
                    error: Some(e.to_string()),
                    ..Default::default()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const AREAS_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<TheatreAreas>
  <TheatreArea><ID>1004</ID><Name>Apollo Kino Solaris</Name></TheatreArea>
  <TheatreArea><ID>1005</ID><Name>Apollo Kino Ülemiste</Name></TheatreArea>
</TheatreAreas>"#;

    const SCHEDULE_XML: &str = r#"<Schedule>
  <Shows>
    <Show><ID>1</ID><EventID>303502</EventID><TheatreID>1004</TheatreID></Show>
  </Shows>
</Schedule>"#;

    const EVENTS_XML: &str = r#"<Events><Event><ID>303502</ID><Title>Film</Title></Event></Events>"#;

    #[test]
    fn test_schedule_path() {
        assert_eq!(ApolloKinoClient::schedule_path(None, None, None), "/Schedule");
        assert_eq!(
            ApolloKinoClient::schedule_path(Some("2025-03-01"), Some("15.03.2025"), None),
            "/Schedule?dtFrom=01.03.2025&dtTo=15.03.2025"
        );
        assert_eq!(
            ApolloKinoClient::schedule_path(None, None, Some("2025-03-02")),
            "/Schedule?dt=02.03.2025"
        );
    }

    #[tokio::test]
    async fn test_fetch_theatre_areas_from_xml() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/TheatreAreas"))
            .and(header("user-agent", USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_string(AREAS_XML))
            .mount(&server)
            .await;

        let client = ApolloKinoClient::new(&server.uri(), 5).unwrap();
        let areas = client.fetch_theatre_areas().await.unwrap();

        assert_eq!(areas.len(), 2);
        assert_eq!(areas[1]["Name"], "Apollo Kino Ülemiste");
    }

    #[tokio::test]
    async fn test_fetch_events_from_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Events": [{"ID": 1, "Title": "A"}, {"ID": 2, "Title": "B"}]
            })))
            .mount(&server)
            .await;

        let client = ApolloKinoClient::new(&server.uri(), 5).unwrap();
        let events = client.fetch_events().await.unwrap();
        assert_eq!(events.len(), 2);
    }

    #[tokio::test]
    async fn test_upstream_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/News"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = ApolloKinoClient::new(&server.uri(), 5).unwrap();
        let err = client.fetch_news().await.unwrap_err();
        assert!(matches!(err, CinemaError::ExternalApiError(_)));
    }

    #[tokio::test]
    async fn test_fetch_schedule_passes_dates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Schedule"))
            .and(query_param("dtFrom", "01.03.2025"))
            .and(query_param("dtTo", "15.03.2025"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SCHEDULE_XML))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/Events"))
            .respond_with(ResponseTemplate::new(200).set_body_string(EVENTS_XML))
            .mount(&server)
            .await;

        let client = ApolloKinoClient::new(&server.uri(), 5).unwrap();
        let data = client
            .fetch_schedule(Some("2025-03-01"), Some("2025-03-15"), None)
            .await;

        assert!(data.error.is_none());
        assert_eq!(data.shows.len(), 1);
        assert_eq!(data.shows[0]["EventID"], "303502");
        assert_eq!(data.movies.len(), 1);
        assert!(data.schedule.is_some());
    }

    #[tokio::test]
    async fn test_fetch_schedule_degrades_on_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Schedule"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = ApolloKinoClient::new(&server.uri(), 5).unwrap();
        let data = client.fetch_schedule(None, None, None).await;

        assert!(data.error.is_some());
        assert!(data.shows.is_empty());
        assert!(data.schedule.is_none());
    }
}
