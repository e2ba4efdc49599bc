//! Reverse geocoding with provider fallback.
//!
//! Providers are tried strictly in order (Nominatim, Photon, BigDataCloud),
//! each with a per-attempt timeout and a bounded number of retries. When all
//! of them fail the place is synthesized from the offline classifier, so
//! [`Geocoder::reverse_geocode`] never fails.
//!
//! Nominatim usage policy: https://operations.osmfoundation.org/policies/nominatim/

use std::time::Duration;

use reqwest::header::USER_AGENT;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::AppConfig;
use crate::services::classifier;
use crate::services::geometry::Coordinate;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_RETRIES: u32 = 1;
const DEFAULT_PACING: Duration = Duration::from_millis(200);

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("incomplete result: {0}")]
    Incomplete(&'static str),
}

impl GeocodeError {
    /// Incomplete answers are deterministic, so only transport failures are retried.
    fn is_retryable(&self) -> bool {
        !matches!(self, GeocodeError::Incomplete(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GeocodeSource {
    Nominatim,
    Photon,
    #[serde(rename = "bigdatacloud")]
    BigDataCloud,
    Fallback,
}

/// A normalized reverse-geocoding result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeocodedPlace {
    /// City, town or the closest named place
    pub city: String,
    /// State, province or region, when the provider reports one
    pub state: Option<String>,
    pub country: String,
    /// Display name, e.g. "Paris, Île-de-France, France"
    pub full_name: String,
    /// Which provider produced the result
    pub source: GeocodeSource,
}

impl GeocodedPlace {
    fn new(city: &str, state: Option<&str>, country: &str, source: GeocodeSource) -> Self {
        let city = translate_place_name(city);
        let state = state.filter(|s| !s.is_empty()).map(translate_place_name);
        let country = translate_place_name(country);
        let full_name = format_full_name(&city, state.as_deref(), &country);
        Self {
            city,
            state,
            country,
            full_name,
            source,
        }
    }
}

fn format_full_name(city: &str, state: Option<&str>, country: &str) -> String {
    let mut parts = vec![city];
    if let Some(state) = state.filter(|s| *s != city) {
        parts.push(state);
    }
    if !country.is_empty() && country != city {
        parts.push(country);
    }
    parts.join(", ")
}

/// Place synthesized offline from the classifier.
pub fn fallback_place(coord: Coordinate) -> GeocodedPlace {
    let city = classifier::location_name(coord.latitude, coord.longitude);
    let continent = classifier::continent_name(coord.latitude, coord.longitude);
    let full_name = if continent == "Ocean" {
        city.clone()
    } else {
        format!("{}, {}", city, continent)
    };
    GeocodedPlace {
        city,
        state: None,
        country: continent.to_string(),
        full_name,
        source: GeocodeSource::Fallback,
    }
}

// ---------------------------------------------------------------------------
// Place-name translation
// ---------------------------------------------------------------------------

/// French exonyms some providers return despite `lang=en`, most specific first.
const PLACE_TRANSLATIONS: &[(&str, &str)] = &[
    ("Afrique du Sud", "South Africa"),
    ("Arabie saoudite", "Saudi Arabia"),
    ("Émirats arabes unis", "United Arab Emirates"),
    ("Nouvelle-Zélande", "New Zealand"),
    ("Royaume-Uni", "United Kingdom"),
    ("États-Unis", "United States"),
    ("Etats-Unis", "United States"),
    ("Pays-Bas", "Netherlands"),
    ("Le Caire", "Cairo"),
    ("Le Cap", "Cape Town"),
    ("Allemagne", "Germany"),
    ("Angleterre", "England"),
    ("Argentine", "Argentina"),
    ("Australie", "Australia"),
    ("Autriche", "Austria"),
    ("Belgique", "Belgium"),
    ("Brésil", "Brazil"),
    ("Chili", "Chile"),
    ("Chine", "China"),
    ("Corée du Sud", "South Korea"),
    ("Danemark", "Denmark"),
    ("Égypte", "Egypt"),
    ("Espagne", "Spain"),
    ("Grèce", "Greece"),
    ("Indonésie", "Indonesia"),
    ("Irlande", "Ireland"),
    ("Islande", "Iceland"),
    ("Italie", "Italy"),
    ("Japon", "Japan"),
    ("Londres", "London"),
    ("Maroc", "Morocco"),
    ("Mexique", "Mexico"),
    ("Moscou", "Moscow"),
    ("Norvège", "Norway"),
    ("Pékin", "Beijing"),
    ("Pérou", "Peru"),
    ("Pologne", "Poland"),
    ("Russie", "Russia"),
    ("Suède", "Sweden"),
    ("Suisse", "Switzerland"),
    ("Thaïlande", "Thailand"),
    ("Turquie", "Turkey"),
    ("Inde", "India"),
];

/// Translate a place name: exact match first, then case-insensitive containment.
pub fn translate_place_name(name: &str) -> String {
    let trimmed = name.trim();
    if let Some((_, en)) = PLACE_TRANSLATIONS.iter().find(|(fr, _)| *fr == trimmed) {
        return en.to_string();
    }

    let lower = trimmed.to_lowercase();
    PLACE_TRANSLATIONS
        .iter()
        .find(|(fr, _)| contains_word(&lower, &fr.to_lowercase()))
        .map(|(_, en)| en.to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

/// Substring match that does not start or end inside a word ("Inde" ≠ "Independence").
fn contains_word(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, m)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + m.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

// ---------------------------------------------------------------------------
// Provider response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    #[serde(default)]
    address: Option<NominatimAddress>,
    #[serde(default)]
    namedetails: Option<NominatimNameDetails>,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    hamlet: Option<String>,
    suburb: Option<String>,
    neighbourhood: Option<String>,
    county: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NominatimNameDetails {
    #[serde(rename = "name:en")]
    name_en: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PhotonResponse {
    #[serde(default)]
    features: Vec<PhotonFeature>,
}

#[derive(Debug, Deserialize)]
struct PhotonFeature {
    properties: PhotonProperties,
}

#[derive(Debug, Default, Deserialize)]
struct PhotonProperties {
    name: Option<String>,
    city: Option<String>,
    county: Option<String>,
    district: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BigDataCloudResponse {
    city: Option<String>,
    locality: Option<String>,
    principal_subdivision: Option<String>,
    country_name: Option<String>,
}

fn first_present<'a>(candidates: &[&'a Option<String>]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|c| c.as_deref())
        .map(str::trim)
        .find(|s| !s.is_empty())
}

fn nominatim_place(resp: NominatimResponse) -> Result<GeocodedPlace, GeocodeError> {
    let address = resp.address.unwrap_or_default();
    let country = first_present(&[&address.country]).ok_or(GeocodeError::Incomplete("country"))?;
    let name_en = resp.namedetails.and_then(|n| n.name_en);
    let city = first_present(&[
        &name_en,
        &address.city,
        &address.town,
        &address.village,
        &address.hamlet,
        &address.suburb,
        &address.neighbourhood,
        &address.county,
    ])
    .ok_or(GeocodeError::Incomplete("locality"))?;

    Ok(GeocodedPlace::new(
        city,
        address.state.as_deref(),
        country,
        GeocodeSource::Nominatim,
    ))
}

fn photon_place(resp: PhotonResponse) -> Result<GeocodedPlace, GeocodeError> {
    let props = resp
        .features
        .into_iter()
        .next()
        .map(|f| f.properties)
        .ok_or(GeocodeError::Incomplete("features"))?;
    let country = first_present(&[&props.country]).ok_or(GeocodeError::Incomplete("country"))?;
    let city = first_present(&[&props.city, &props.name, &props.county, &props.district])
        .ok_or(GeocodeError::Incomplete("locality"))?;

    Ok(GeocodedPlace::new(
        city,
        props.state.as_deref(),
        country,
        GeocodeSource::Photon,
    ))
}

fn bigdatacloud_place(resp: BigDataCloudResponse) -> Result<GeocodedPlace, GeocodeError> {
    let country =
        first_present(&[&resp.country_name]).ok_or(GeocodeError::Incomplete("countryName"))?;
    let city = first_present(&[&resp.city, &resp.locality])
        .ok_or(GeocodeError::Incomplete("locality"))?;

    Ok(GeocodedPlace::new(
        city,
        resp.principal_subdivision.as_deref(),
        country,
        GeocodeSource::BigDataCloud,
    ))
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Provider {
    Nominatim,
    Photon,
    BigDataCloud,
}

const CHAIN: [Provider; 3] = [Provider::Nominatim, Provider::Photon, Provider::BigDataCloud];

impl Provider {
    fn name(&self) -> &'static str {
        match self {
            Provider::Nominatim => "nominatim",
            Provider::Photon => "photon",
            Provider::BigDataCloud => "bigdatacloud",
        }
    }
}

/// Reverse-geocoding client holding the provider chain configuration.
#[derive(Debug, Clone)]
pub struct Geocoder {
    client: reqwest::Client,
    nominatim_url: String,
    photon_url: String,
    bigdatacloud_url: String,
    user_agent: String,
    timeout: Duration,
    retries: u32,
    pacing: Duration,
}

impl Geocoder {
    pub fn new(nominatim_url: &str, photon_url: &str, bigdatacloud_url: &str, user_agent: &str) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            nominatim_url: nominatim_url.trim_end_matches('/').to_string(),
            photon_url: photon_url.trim_end_matches('/').to_string(),
            bigdatacloud_url: bigdatacloud_url.trim_end_matches('/').to_string(),
            user_agent: user_agent.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
            pacing: DEFAULT_PACING,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            &config.nominatim_url,
            &config.photon_url,
            &config.bigdatacloud_url,
            &config.geocoder_user_agent,
        )
        .with_timeout(Duration::from_secs(config.geocode_timeout_secs))
        .with_retries(config.geocode_retries)
        .with_pacing(Duration::from_millis(config.geocode_pacing_ms))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Resolve a coordinate to a place name. Never fails.
    pub async fn reverse_geocode(&self, coord: Coordinate) -> GeocodedPlace {
        for provider in CHAIN {
            match self.try_provider(provider, coord).await {
                Ok(place) => {
                    tracing::debug!(
                        "Geocoded ({}, {}) via {}: {}",
                        coord.latitude,
                        coord.longitude,
                        provider.name(),
                        place.full_name
                    );
                    return place;
                }
                Err(e) => {
                    tracing::warn!(
                        "Geocoder {} failed for ({}, {}): {}",
                        provider.name(),
                        coord.latitude,
                        coord.longitude,
                        e
                    );
                }
            }
        }

        let place = fallback_place(coord);
        tracing::info!(
            "All geocoders failed for ({}, {}), using {}",
            coord.latitude,
            coord.longitude,
            place.full_name
        );
        place
    }

    /// Resolve several coordinates one after another, pausing between chains.
    pub async fn reverse_geocode_all(&self, coords: &[Coordinate]) -> Vec<GeocodedPlace> {
        let mut places = Vec::with_capacity(coords.len());
        for (i, &coord) in coords.iter().enumerate() {
            if i > 0 && !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }
            places.push(self.reverse_geocode(coord).await);
        }
        places
    }

    async fn try_provider(
        &self,
        provider: Provider,
        coord: Coordinate,
    ) -> Result<GeocodedPlace, GeocodeError> {
        let mut attempt = 0;
        loop {
            let result = match tokio::time::timeout(self.timeout, self.query(provider, coord)).await {
                Ok(result) => result,
                Err(_) => Err(GeocodeError::Timeout(self.timeout)),
            };

            match result {
                Ok(place) => return Ok(place),
                Err(e) if e.is_retryable() && attempt < self.retries => {
                    attempt += 1;
                    tracing::debug!(
                        "Geocoder {} attempt {} failed ({}), retrying",
                        provider.name(),
                        attempt,
                        e
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn query(&self, provider: Provider, coord: Coordinate) -> Result<GeocodedPlace, GeocodeError> {
        let lat = coord.latitude.to_string();
        let lon = coord.longitude.to_string();

        let request = match provider {
            Provider::Nominatim => self
                .client
                .get(format!("{}/reverse", self.nominatim_url))
                .query(&[
                    ("format", "jsonv2"),
                    ("lat", lat.as_str()),
                    ("lon", lon.as_str()),
                    ("zoom", "10"),
                    ("addressdetails", "1"),
                    ("namedetails", "1"),
                    ("accept-language", "en"),
                ]),
            Provider::Photon => self
                .client
                .get(format!("{}/reverse", self.photon_url))
                .query(&[
                    ("lat", lat.as_str()),
                    ("lon", lon.as_str()),
                    ("lang", "en"),
                    ("limit", "1"),
                ]),
            Provider::BigDataCloud => self
                .client
                .get(format!("{}/data/reverse-geocode-client", self.bigdatacloud_url))
                .query(&[
                    ("latitude", lat.as_str()),
                    ("longitude", lon.as_str()),
                    ("localityLanguage", "en"),
                ]),
        };

        let response = request
            .header(USER_AGENT, self.user_agent.as_str())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GeocodeError::Status(response.status().as_u16()));
        }

        match provider {
            Provider::Nominatim => nominatim_place(response.json().await?),
            Provider::Photon => photon_place(response.json().await?),
            Provider::BigDataCloud => bigdatacloud_place(response.json().await?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn geocoder(server: &MockServer) -> Geocoder {
        let base = server.uri();
        Geocoder::new(
            &format!("{}/nominatim", base),
            &format!("{}/photon", base),
            &format!("{}/bdc", base),
            "climate-farm-test",
        )
        .with_timeout(Duration::from_millis(500))
        .with_pacing(Duration::ZERO)
    }

    // --- Pure parsing ---

    #[test]
    fn test_translate_exact_and_substring() {
        assert_eq!(translate_place_name("Allemagne"), "Germany");
        assert_eq!(translate_place_name("royaume-uni"), "United Kingdom");
        assert_eq!(translate_place_name("République de l'Inde"), "India");
        assert_eq!(translate_place_name("Paris"), "Paris");
        assert_eq!(translate_place_name("  France "), "France");
    }

    #[test]
    fn test_translate_ignores_partial_words() {
        assert_eq!(translate_place_name("Independence"), "Independence");
        assert_eq!(translate_place_name("Machine Lake"), "Machine Lake");
    }

    #[test]
    fn test_translate_prefers_longer_entries() {
        // "Afrique du Sud" must win over any shorter entry it contains
        assert_eq!(translate_place_name("Afrique du Sud"), "South Africa");
    }

    #[test]
    fn test_nominatim_place_prefers_english_name() {
        let resp: NominatimResponse = serde_json::from_value(json!({
            "address": {"city": "München", "state": "Bayern", "country": "Allemagne"},
            "namedetails": {"name": "München", "name:en": "Munich"}
        }))
        .unwrap();
        let place = nominatim_place(resp).unwrap();
        assert_eq!(place.city, "Munich");
        assert_eq!(place.country, "Germany");
        assert_eq!(place.full_name, "Munich, Bayern, Germany");
        assert_eq!(place.source, GeocodeSource::Nominatim);
    }

    #[test]
    fn test_nominatim_place_uses_town_and_requires_country() {
        let resp: NominatimResponse = serde_json::from_value(json!({
            "address": {"town": "Zermatt", "country": "Switzerland"}
        }))
        .unwrap();
        assert_eq!(nominatim_place(resp).unwrap().city, "Zermatt");

        let resp: NominatimResponse =
            serde_json::from_value(json!({"address": {"city": "Nowhere"}})).unwrap();
        assert!(matches!(
            nominatim_place(resp),
            Err(GeocodeError::Incomplete("country"))
        ));
    }

    #[test]
    fn test_nominatim_error_body_is_incomplete() {
        let resp: NominatimResponse =
            serde_json::from_value(json!({"error": "Unable to geocode"})).unwrap();
        assert!(nominatim_place(resp).is_err());
    }

    #[test]
    fn test_photon_place_requires_feature() {
        let resp: PhotonResponse = serde_json::from_value(json!({"features": []})).unwrap();
        assert!(matches!(
            photon_place(resp),
            Err(GeocodeError::Incomplete("features"))
        ));
    }

    #[test]
    fn test_bigdatacloud_empty_city_falls_back_to_locality() {
        let resp: BigDataCloudResponse = serde_json::from_value(json!({
            "city": "",
            "locality": "Nuuk",
            "principalSubdivision": "Sermersooq",
            "countryName": "Greenland"
        }))
        .unwrap();
        let place = bigdatacloud_place(resp).unwrap();
        assert_eq!(place.city, "Nuuk");
        assert_eq!(place.full_name, "Nuuk, Sermersooq, Greenland");
    }

    #[test]
    fn test_full_name_skips_duplicate_parts() {
        assert_eq!(format_full_name("Singapore", Some("Singapore"), "Singapore"), "Singapore");
        assert_eq!(format_full_name("Lyon", None, "France"), "Lyon, France");
    }

    #[test]
    fn test_fallback_place() {
        let place = fallback_place(Coordinate::new(48.8566, 2.3522));
        assert_eq!(place.city, "Paris");
        assert_eq!(place.full_name, "Paris, Europe");
        assert_eq!(place.source, GeocodeSource::Fallback);

        let ocean = fallback_place(Coordinate::new(-40.0, -130.0));
        assert!(!ocean.full_name.is_empty());
    }

    #[test]
    fn test_source_serialization() {
        assert_eq!(
            serde_json::to_string(&GeocodeSource::BigDataCloud).unwrap(),
            "\"bigdatacloud\""
        );
        assert_eq!(
            serde_json::to_string(&GeocodeSource::Fallback).unwrap(),
            "\"fallback\""
        );
    }

    // --- Chain against mock providers ---

    #[tokio::test]
    async fn test_chain_uses_nominatim_first() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nominatim/reverse"))
            .and(query_param("format", "jsonv2"))
            .and(query_param("zoom", "10"))
            .and(header("user-agent", "climate-farm-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "address": {"city": "Paris", "state": "Île-de-France", "country": "France"}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/photon/reverse"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let place = geocoder(&server)
            .reverse_geocode(Coordinate::new(48.8566, 2.3522))
            .await;
        assert_eq!(place.source, GeocodeSource::Nominatim);
        assert_eq!(place.full_name, "Paris, Île-de-France, France");
    }

    #[tokio::test]
    async fn test_chain_falls_through_to_photon() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nominatim/reverse"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/photon/reverse"))
            .and(query_param("lang", "en"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "features": [{"properties": {"name": "Londres", "country": "Royaume-Uni"}}]
            })))
            .mount(&server)
            .await;

        let place = geocoder(&server)
            .reverse_geocode(Coordinate::new(51.5074, -0.1278))
            .await;
        assert_eq!(place.source, GeocodeSource::Photon);
        assert_eq!(place.city, "London");
        assert_eq!(place.country, "United Kingdom");
    }

    #[tokio::test]
    async fn test_chain_reaches_bigdatacloud() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nominatim/reverse"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/photon/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"features": []})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/bdc/data/reverse-geocode-client"))
            .and(query_param("localityLanguage", "en"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "city": "Tokyo",
                "principalSubdivision": "Tokyo",
                "countryName": "Japon"
            })))
            .mount(&server)
            .await;

        let place = geocoder(&server)
            .reverse_geocode(Coordinate::new(35.6762, 139.6503))
            .await;
        assert_eq!(place.source, GeocodeSource::BigDataCloud);
        assert_eq!(place.full_name, "Tokyo, Japan");
    }

    #[tokio::test]
    async fn test_chain_all_fail_uses_fallback() {
        // No mocks mounted: every provider gets a 404
        let server = MockServer::start().await;

        let place = geocoder(&server)
            .reverse_geocode(Coordinate::new(48.8566, 2.3522))
            .await;
        assert_eq!(place.source, GeocodeSource::Fallback);
        assert_eq!(place.city, "Paris");
        assert!(!place.full_name.is_empty());
    }

    #[tokio::test]
    async fn test_transport_errors_are_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nominatim/reverse"))
            .respond_with(ResponseTemplate::new(502))
            .expect(3)
            .mount(&server)
            .await;

        let place = geocoder(&server)
            .with_retries(2)
            .reverse_geocode(Coordinate::new(0.0, 0.0))
            .await;
        assert_eq!(place.source, GeocodeSource::Fallback);
    }

    #[tokio::test]
    async fn test_incomplete_results_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nominatim/reverse"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"error": "Unable to geocode"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        geocoder(&server)
            .reverse_geocode(Coordinate::new(0.0, 0.0))
            .await;
    }

    #[tokio::test]
    async fn test_timeout_advances_chain() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nominatim/reverse"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(2))
                    .set_body_json(json!({"address": {"city": "Slow", "country": "Slowland"}})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/photon/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "features": [{"properties": {"city": "Fast", "country": "Fastland"}}]
            })))
            .mount(&server)
            .await;

        let place = geocoder(&server)
            .with_timeout(Duration::from_millis(100))
            .with_retries(0)
            .reverse_geocode(Coordinate::new(10.0, 10.0))
            .await;
        assert_eq!(place.source, GeocodeSource::Photon);
        assert_eq!(place.city, "Fast");
    }

    #[tokio::test]
    async fn test_reverse_geocode_all_keeps_order() {
        let server = MockServer::start().await;
        let coords = [
            Coordinate::new(48.8566, 2.3522),
            Coordinate::new(51.5074, -0.1278),
        ];

        let places = geocoder(&server).reverse_geocode_all(&coords).await;
        assert_eq!(places.len(), 2);
        assert_eq!(places[0].city, "Paris");
        assert_eq!(places[1].city, "London");
    }
}
