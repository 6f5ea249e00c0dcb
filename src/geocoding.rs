//! Geocoding and geolocation
//!
//! Forward and reverse lookups against a Nominatim-compatible service,
//! restricted to the Federal District. Lookups never fail towards the
//! wizard: [`search_places`] degrades to an empty list and
//! [`describe_coordinates`] to the raw coordinates.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Appended to every free-text query
pub const REGION_SUFFIX: &str = ", Distrito Federal, Brasil";

pub const MIN_QUERY_LEN: usize = 3;
pub const MAX_RESULTS: usize = 5;

const ADDRESS_NOT_FOUND: &str = "Endereço não encontrado";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl BoundingBox {
    /// `west,north,east,south`, as Nominatim's `viewbox` expects
    pub fn viewbox(&self) -> String {
        format!("{},{},{},{}", self.west, self.north, self.east, self.south)
    }
}

pub const FEDERAL_DISTRICT_BOUNDS: BoundingBox = BoundingBox {
    north: -15.5,
    south: -16.1,
    east: -47.3,
    west: -48.3,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// `lat, lng` with 6 decimals
    pub fn label(&self) -> String {
        format!("{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoPlace {
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReverseGeocode {
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighborhood_hint: Option<String>,
}

#[derive(Debug, Error)]
pub enum GeocodingError {
    #[error("Geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Geocoding service returned status {0}")]
    Status(u16),

    #[error("Unexpected geocoding response: {0}")]
    Parse(#[from] serde_json::Error),
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<GeoPlace>, GeocodingError>;

    async fn reverse(&self, coords: Coordinates) -> Result<ReverseGeocode, GeocodingError>;
}

/// Forward search with the length guard and failure degradation applied
pub async fn search_places(geocoder: &dyn Geocoder, query: &str) -> Vec<GeoPlace> {
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_LEN {
        return Vec::new();
    }

    match geocoder.search(query).await {
        Ok(mut places) => {
            places.truncate(MAX_RESULTS);
            places
        }
        Err(e) => {
            tracing::warn!("Address search failed for '{}': {}", query, e);
            Vec::new()
        }
    }
}

/// Reverse lookup that falls back to the formatted coordinates
pub async fn describe_coordinates(geocoder: &dyn Geocoder, coords: Coordinates) -> ReverseGeocode {
    match geocoder.reverse(coords).await {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!("Reverse geocoding failed for {}: {}", coords.label(), e);
            ReverseGeocode {
                display_name: coords.label(),
                neighborhood_hint: None,
            }
        }
    }
}

// =============================================================================
// Nominatim
// =============================================================================

#[derive(Deserialize)]
struct RawPlace {
    display_name: String,
    lat: String,
    lon: String,
}

#[derive(Deserialize)]
struct RawAddress {
    suburb: Option<String>,
    neighbourhood: Option<String>,
    city_district: Option<String>,
}

#[derive(Deserialize)]
struct RawReverse {
    display_name: Option<String>,
    address: Option<RawAddress>,
}

/// Parse a `/search?format=json` body. Entries with unparsable coordinates are skipped.
pub fn parse_search_response(body: &str) -> Result<Vec<GeoPlace>, GeocodingError> {
    let raw: Vec<RawPlace> = serde_json::from_str(body)?;
    Ok(raw
        .into_iter()
        .filter_map(|p| {
            Some(GeoPlace {
                latitude: p.lat.parse().ok()?,
                longitude: p.lon.parse().ok()?,
                display_name: p.display_name,
            })
        })
        .collect())
}

/// Parse a `/reverse?format=json` body
pub fn parse_reverse_response(body: &str) -> Result<ReverseGeocode, GeocodingError> {
    let raw: RawReverse = serde_json::from_str(body)?;
    let neighborhood_hint = raw
        .address
        .and_then(|a| a.suburb.or(a.neighbourhood).or(a.city_district));

    Ok(ReverseGeocode {
        display_name: raw
            .display_name
            .unwrap_or_else(|| ADDRESS_NOT_FOUND.to_string()),
        neighborhood_hint,
    })
}

pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
    bounds: BoundingBox,
}

impl NominatimGeocoder {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GeocodingError> {
        // Nominatim's usage policy requires an identifying User-Agent
        let client = reqwest::Client::builder()
            .user_agent(concat!("ouvidoria-portal/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bounds: FEDERAL_DISTRICT_BOUNDS,
        })
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<String, GeocodingError> {
        let response = self
            .client
            .get(format!("{}/{}", self.base_url, path))
            .header("Accept-Language", "pt-BR")
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GeocodingError::Status(response.status().as_u16()));
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn search(&self, query: &str) -> Result<Vec<GeoPlace>, GeocodingError> {
        let params = [
            ("q", format!("{}{}", query, REGION_SUFFIX)),
            ("format", "json".to_string()),
            ("limit", MAX_RESULTS.to_string()),
            ("addressdetails", "1".to_string()),
            ("viewbox", self.bounds.viewbox()),
            ("bounded", "1".to_string()),
        ];
        let body = self.get("search", &params).await?;
        parse_search_response(&body)
    }

    async fn reverse(&self, coords: Coordinates) -> Result<ReverseGeocode, GeocodingError> {
        let params = [
            ("lat", coords.latitude.to_string()),
            ("lon", coords.longitude.to_string()),
            ("format", "json".to_string()),
            ("addressdetails", "1".to_string()),
        ];
        let body = self.get("reverse", &params).await?;
        parse_reverse_response(&body)
    }
}

// =============================================================================
// Geolocation
// =============================================================================

/// Why the device could not report its position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeolocationFailure {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
}

impl GeolocationFailure {
    pub fn user_message(&self) -> &'static str {
        match self {
            GeolocationFailure::PermissionDenied => {
                "Não foi possível obter sua localização. Verifique as permissões."
            }
            GeolocationFailure::PositionUnavailable => {
                "Sua localização não está disponível no momento. Informe o endereço manualmente."
            }
            GeolocationFailure::Timeout => {
                "A localização demorou demais para responder. Tente novamente ou informe o endereço."
            }
        }
    }
}

/// Outcome of the device position request, as posted by the client
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GeolocationReport {
    Ok {
        latitude: f64,
        longitude: f64,
    },
    Error {
        reason: GeolocationFailure,
    },
}
