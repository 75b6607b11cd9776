use crate::{GatewayError, RemoteGateway};
use async_trait::async_trait;
use serde::Deserialize;
use shared::Airport;
use std::collections::HashMap;
use url::Url;

const DIRECTORY_PROVIDER: &str = "aviation directory";
const WEATHER_PROVIDER: &str = "weather service";

/// Airport entry as returned by the aviation directory API. All values are
/// strings on the wire, including latitude/longitude.
#[derive(Deserialize, Debug)]
struct DirectoryAirport {
    #[serde(default)]
    site_number: String,
    #[serde(default)]
    facility_name: String,
    #[serde(default)]
    faa: String,
    #[serde(default)]
    icao: String,
    #[serde(default)]
    state_code: String,
    #[serde(default)]
    state_full: String,
    #[serde(default)]
    county: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    ownership_type: String,
    #[serde(default)]
    use_type: String,
    #[serde(default)]
    manager: String,
    #[serde(default)]
    manager_phone: String,
    #[serde(default)]
    latitude: String,
    #[serde(default)]
    longitude: String,
    #[serde(default)]
    airport_status: String,
}

impl DirectoryAirport {
    /// Weather is never part of the directory payload; it is filled in by
    /// the sync engine afterwards.
    fn into_airport(self) -> Airport {
        Airport {
            site_number: self.site_number,
            facility_name: self.facility_name,
            faa: self.faa,
            icao: self.icao,
            state_code: self.state_code,
            state_full: self.state_full,
            county: self.county,
            city: self.city,
            ownership_type: self.ownership_type,
            use_type: self.use_type,
            manager: self.manager,
            manager_phone: self.manager_phone,
            latitude: self.latitude,
            longitude: self.longitude,
            airport_status: self.airport_status,
            weather: String::new(),
        }
    }
}

/// The directory keys its response by the requested FAA code; unrecognized
/// codes are either absent or map to an empty list.
type DirectoryResponse = HashMap<String, Vec<DirectoryAirport>>;

#[derive(Deserialize)]
struct WeatherResponse {
    current: WeatherCurrent,
}

#[derive(Deserialize)]
struct WeatherCurrent {
    condition: WeatherCondition,
}

#[derive(Deserialize)]
struct WeatherCondition {
    text: String,
}

/// Production [`RemoteGateway`] over the two HTTP providers.
#[derive(Clone)]
pub struct HttpRemoteGateway {
    client: reqwest::Client,
    directory_url: Url,
    weather_url: Url,
    weather_api_key: String,
}

impl HttpRemoteGateway {
    /// `directory_url` and `weather_url` are the full endpoint URLs, e.g.
    /// `https://api.aviationapi.com/v1/airports` and
    /// `https://api.weatherapi.com/v1/current.json`.
    pub fn new(directory_url: Url, weather_url: Url, weather_api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            directory_url,
            weather_url,
            weather_api_key,
        }
    }

    /// One directory call; `query` is a single FAA code or a comma-separated
    /// list of codes.
    async fn lookup_directory(&self, query: &str) -> Result<DirectoryResponse, GatewayError> {
        let response = self
            .client
            .get(self.directory_url.clone())
            .query(&[("apt", query)])
            .send()
            .await
            .map_err(|source| GatewayError::Transport {
                provider: DIRECTORY_PROVIDER,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status {
                provider: DIRECTORY_PROVIDER,
                status,
            });
        }

        response
            .json::<DirectoryResponse>()
            .await
            .map_err(|source| GatewayError::Decode {
                provider: DIRECTORY_PROVIDER,
                source,
            })
    }
}

#[async_trait]
impl RemoteGateway for HttpRemoteGateway {
    async fn fetch_airport(&self, faa: &str) -> Result<Airport, GatewayError> {
        let mut by_faa = self.lookup_directory(faa).await?;

        by_faa
            .remove(faa)
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(DirectoryAirport::into_airport)
            .ok_or_else(|| GatewayError::AirportNotFound(faa.to_string()))
    }

    async fn fetch_airports(&self, faas: &[String]) -> Result<Vec<Airport>, GatewayError> {
        let mut by_faa = self.lookup_directory(&faas.join(",")).await?;

        // Preserve request order; codes the directory did not recognize are
        // simply omitted from the result.
        let mut airports = Vec::with_capacity(faas.len());
        for faa in faas {
            if let Some(airport) = by_faa.remove(faa).and_then(|list| list.into_iter().next()) {
                airports.push(airport.into_airport());
            } else {
                tracing::debug!(faa, "directory returned no data for airport");
            }
        }

        Ok(airports)
    }

    async fn fetch_weather(&self, city: &str) -> Result<String, GatewayError> {
        if self.weather_api_key.is_empty() {
            return Err(GatewayError::MissingApiKey);
        }

        let response = self
            .client
            .get(self.weather_url.clone())
            .query(&[("key", self.weather_api_key.as_str()), ("q", city)])
            .send()
            .await
            .map_err(|source| GatewayError::Transport {
                provider: WEATHER_PROVIDER,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status {
                provider: WEATHER_PROVIDER,
                status,
            });
        }

        let weather = response
            .json::<WeatherResponse>()
            .await
            .map_err(|source| GatewayError::Decode {
                provider: WEATHER_PROVIDER,
                source,
            })?;

        Ok(weather.current.condition.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn test_gateway(server: &MockServer) -> HttpRemoteGateway {
        HttpRemoteGateway::new(
            Url::parse(&format!("{}/v1/airports", server.uri())).unwrap(),
            Url::parse(&format!("{}/v1/current.json", server.uri())).unwrap(),
            "test-key".to_string(),
        )
    }

    #[tokio::test]
    async fn test_fetch_airport_success() {
        let mock_server = MockServer::start().await;

        let response_body = r#"{
            "ATL": [
                {
                    "site_number": "03640.*A",
                    "facility_name": "Hartsfield-Jackson Atlanta Intl",
                    "faa": "ATL",
                    "icao": "KATL",
                    "state_code": "GA",
                    "state_full": "Georgia",
                    "county": "Fulton",
                    "city": "Atlanta",
                    "ownership_type": "Public",
                    "use_type": "Public Use",
                    "manager": "Some Manager",
                    "manager_phone": "404-123-4567",
                    "latitude": "33.6404",
                    "longitude": "-84.4267",
                    "airport_status": "Operational"
                }
            ]
        }"#;

        Mock::given(method("GET"))
            .and(path("/v1/airports"))
            .and(query_param("apt", "ATL"))
            .respond_with(ResponseTemplate::new(200).set_body_string(response_body))
            .mount(&mock_server)
            .await;

        let gateway = test_gateway(&mock_server).await;
        let airport = gateway.fetch_airport("ATL").await.unwrap();

        assert_eq!(airport.faa, "ATL");
        assert_eq!(airport.city, "Atlanta");
        assert_eq!(airport.weather, "");
        assert!(!airport.is_incomplete());
    }

    #[tokio::test]
    async fn test_fetch_airport_not_found_upstream() {
        let mock_server = MockServer::start().await;

        // The directory answers unknown codes with an empty list.
        Mock::given(method("GET"))
            .and(path("/v1/airports"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ZZZ": []}"#))
            .mount(&mock_server)
            .await;

        let gateway = test_gateway(&mock_server).await;
        let err = gateway.fetch_airport("ZZZ").await.unwrap_err();
        assert!(matches!(err, GatewayError::AirportNotFound(faa) if faa == "ZZZ"));
    }

    #[tokio::test]
    async fn test_fetch_airport_http_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/airports"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let gateway = test_gateway(&mock_server).await;
        let err = gateway.fetch_airport("ATL").await.unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Status { status, .. } if status.as_u16() == 503
        ));
    }

    #[tokio::test]
    async fn test_fetch_airports_returns_recognized_subset_in_order() {
        let mock_server = MockServer::start().await;

        let response_body = r#"{
            "JFK": [{"faa": "JFK", "city": "New York"}],
            "ATL": [{"faa": "ATL", "city": "Atlanta"}],
            "ZZZ": []
        }"#;

        Mock::given(method("GET"))
            .and(path("/v1/airports"))
            .and(query_param("apt", "ATL,ZZZ,JFK"))
            .respond_with(ResponseTemplate::new(200).set_body_string(response_body))
            .mount(&mock_server)
            .await;

        let gateway = test_gateway(&mock_server).await;
        let faas = vec!["ATL".to_string(), "ZZZ".to_string(), "JFK".to_string()];
        let airports = gateway.fetch_airports(&faas).await.unwrap();

        let codes: Vec<&str> = airports.iter().map(|a| a.faa.as_str()).collect();
        assert_eq!(codes, vec!["ATL", "JFK"]);
    }

    #[tokio::test]
    async fn test_fetch_weather_success() {
        let mock_server = MockServer::start().await;

        let response_body = r#"{
            "current": {
                "condition": {
                    "text": "Partly cloudy"
                }
            }
        }"#;

        Mock::given(method("GET"))
            .and(path("/v1/current.json"))
            .and(query_param("key", "test-key"))
            .and(query_param("q", "Atlanta"))
            .respond_with(ResponseTemplate::new(200).set_body_string(response_body))
            .mount(&mock_server)
            .await;

        let gateway = test_gateway(&mock_server).await;
        let weather = gateway.fetch_weather("Atlanta").await.unwrap();
        assert_eq!(weather, "Partly cloudy");
    }

    #[tokio::test]
    async fn test_fetch_weather_without_api_key() {
        let mock_server = MockServer::start().await;

        let gateway = HttpRemoteGateway::new(
            Url::parse(&format!("{}/v1/airports", mock_server.uri())).unwrap(),
            Url::parse(&format!("{}/v1/current.json", mock_server.uri())).unwrap(),
            String::new(),
        );

        let err = gateway.fetch_weather("Atlanta").await.unwrap_err();
        assert!(matches!(err, GatewayError::MissingApiKey));
    }

    #[tokio::test]
    async fn test_fetch_weather_decode_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/current.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let gateway = test_gateway(&mock_server).await;
        let err = gateway.fetch_weather("Atlanta").await.unwrap_err();
        assert!(matches!(err, GatewayError::Decode { .. }));
    }
}
