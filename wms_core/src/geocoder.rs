//! This client turns postcodes into coordinates through a Nominatim compatible service.

use serde::Deserialize;
use tracing::debug;

use crate::{error::GeocodeError, skip::Coordinate};

pub static DEFAULT_URL: &str = "https://nominatim.openstreetmap.org";
static USER_AGENT: &str = "WhereMegaSkip/1.0 (https://github.com/JosephSalisbury/wheremegaskip)";

/// One search hit. Nominatim sends the coordinates as strings.
#[derive(Debug, Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
}

#[derive(Debug, Clone)]
pub struct Geocoder {
    client: reqwest::Client,
    base_url: String,
}

impl Geocoder {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Look up a postcode within London.
    pub async fn geocode(&self, postcode: &str) -> Result<Coordinate, GeocodeError> {
        let query = format!("{postcode} London UK");
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("q", query.as_str()),
                ("format", "json"),
                ("limit", "1"),
                ("countrycodes", "gb"),
            ])
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?;
        if response.status() != reqwest::StatusCode::OK {
            return Err(GeocodeError::UnexpectedStatus {
                postcode: postcode.to_string(),
                status: response.status().as_u16(),
            });
        }
        let body = response.text().await?;
        let results: Vec<SearchResult> =
            serde_json::from_str(&body).map_err(|source| GeocodeError::Decode {
                postcode: postcode.to_string(),
                source,
            })?;
        let Some(result) = results.into_iter().next() else {
            return Err(GeocodeError::NoResults(postcode.to_string()));
        };
        let coordinate = Coordinate::new(
            parse_degrees(postcode, &result.lat)?,
            parse_degrees(postcode, &result.lon)?,
        );
        debug!(postcode, ?coordinate, "geocoded postcode");
        Ok(coordinate)
    }
}

fn parse_degrees(postcode: &str, value: &str) -> Result<f64, GeocodeError> {
    value
        .trim()
        .parse()
        .map_err(|_| GeocodeError::InvalidCoordinate {
            postcode: postcode.to_string(),
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        matchers::{header, method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    use crate::{
        error::GeocodeError,
        geocoder::{Geocoder, USER_AGENT},
        http_client,
        skip::Coordinate,
    };

    async fn geocoder(server: &MockServer) -> Geocoder {
        Geocoder::new(http_client().unwrap(), server.uri())
    }

    #[tokio::test]
    async fn test_geocode() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "SW11 5TU London UK"))
            .and(query_param("format", "json"))
            .and(query_param("limit", "1"))
            .and(query_param("countrycodes", "gb"))
            .and(header("user-agent", USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"lat": "51.4634", "lon": "-0.1627", "display_name": "Pountney Road"}
            ])))
            .expect(1)
            .mount(&server)
            .await;
        let coordinate = geocoder(&server).await.geocode("SW11 5TU").await.unwrap();
        assert_eq!(coordinate, Coordinate::new(51.4634, -0.1627));
    }

    #[tokio::test]
    async fn test_geocode_no_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        let result = geocoder(&server).await.geocode("ZZ1 1ZZ").await;
        assert!(matches!(result, Err(GeocodeError::NoResults(postcode)) if postcode == "ZZ1 1ZZ"));
    }

    #[tokio::test]
    async fn test_geocode_bad_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;
        let result = geocoder(&server).await.geocode("SW11 5TU").await;
        assert!(matches!(
            result,
            Err(GeocodeError::UnexpectedStatus { status: 429, .. })
        ));
    }

    #[tokio::test]
    async fn test_geocode_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        let result = geocoder(&server).await.geocode("SW11 5TU").await;
        assert!(matches!(
            result,
            Err(GeocodeError::UnexpectedStatus { status: 204, .. })
        ));
    }

    #[tokio::test]
    async fn test_geocode_invalid_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"lat": "north", "lon": "-0.1627"}
            ])))
            .mount(&server)
            .await;
        let result = geocoder(&server).await.geocode("SW11 5TU").await;
        assert!(matches!(result, Err(GeocodeError::InvalidCoordinate { .. })));

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;
        let result = geocoder(&server).await.geocode("SW11 5TU").await;
        assert!(matches!(result, Err(GeocodeError::Decode { .. })));
    }
}
