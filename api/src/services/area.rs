//! Game area and location payloads, plus external map links.

use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::services::classifier::{self, ClimateZone, SoilType};
use crate::services::geometry::Coordinate;
use crate::services::temperature::TemperatureReading;

/// Areas get an ephemeral id in `[0, AREA_ID_RANGE)`.
const AREA_ID_RANGE: u32 = 1000;
const DEFAULT_MAP_ZOOM: u8 = 10;
const SEARCH_MAP_ZOOM: u8 = 12;

/// A playable area on the globe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    pub id: u32,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Daytime land surface temperature (°C)
    pub day_temperature: i32,
    /// Night-time land surface temperature (°C)
    pub night_temperature: i32,
    pub soil_type: SoilType,
    pub description: String,
    pub climate_zone: ClimateZone,
}

impl Area {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// A resolved location for the guessing game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationData {
    pub latitude: f64,
    pub longitude: f64,
    pub day_temp: i32,
    pub night_temp: i32,
    pub location_name: String,
    pub area: Area,
    /// Whether the player has revealed the location (always false when created)
    #[serde(default)]
    pub is_revealed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_data: Option<MapData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MapData {
    pub coordinates: MapCoordinates,
    pub maps: MapLinks,
    pub location_info: LocationInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MapCoordinates {
    pub latitude: f64,
    pub longitude: f64,
    /// e.g. "48.8566°, 2.3522°"
    pub formatted: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MapLinks {
    pub google_maps: String,
    pub google_maps_search: String,
    pub google_maps_embed: String,
    pub open_street_map: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LocationInfo {
    pub name: String,
    pub climate: ClimateZone,
    pub description: String,
}

// ---------------------------------------------------------------------------
// Map links
// ---------------------------------------------------------------------------

pub fn google_maps_url(lat: f64, lon: f64, zoom: u8) -> String {
    format!("https://www.google.com/maps/@{},{},{}z", lat, lon, zoom)
}

pub fn google_maps_search_url(name: &str, lat: f64, lon: f64) -> String {
    format!(
        "https://www.google.com/maps/search/{}/@{},{},{}z",
        urlencoding::encode(name),
        lat,
        lon,
        SEARCH_MAP_ZOOM
    )
}

/// Embeddable map URL; the keyed Embed API when a key is configured.
pub fn google_maps_embed_url(lat: f64, lon: f64, zoom: u8, api_key: Option<&str>) -> String {
    match api_key {
        Some(key) => format!(
            "https://www.google.com/maps/embed/v1/view?key={}&center={},{}&zoom={}",
            urlencoding::encode(key),
            lat,
            lon,
            zoom
        ),
        None => format!(
            "https://maps.google.com/maps?q={},{}&hl=en&z={}&output=embed",
            lat, lon, zoom
        ),
    }
}

pub fn open_street_map_url(lat: f64, lon: f64, zoom: u8) -> String {
    format!("https://www.openstreetmap.org/#map={}/{}/{}", zoom, lat, lon)
}

pub fn map_data(location: &LocationData, api_key: Option<&str>) -> MapData {
    let (lat, lon) = (location.latitude, location.longitude);
    MapData {
        coordinates: MapCoordinates {
            latitude: lat,
            longitude: lon,
            formatted: format!("{:.4}°, {:.4}°", lat, lon),
        },
        maps: MapLinks {
            google_maps: google_maps_url(lat, lon, DEFAULT_MAP_ZOOM),
            google_maps_search: google_maps_search_url(&location.location_name, lat, lon),
            google_maps_embed: google_maps_embed_url(lat, lon, DEFAULT_MAP_ZOOM, api_key),
            open_street_map: open_street_map_url(lat, lon, DEFAULT_MAP_ZOOM),
        },
        location_info: LocationInfo {
            name: location.location_name.clone(),
            climate: location.area.climate_zone,
            description: location.area.description.clone(),
        },
    }
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Classify a coordinate and assemble the full game payload.
///
/// `description_temp` is the temperature quoted in the area description
/// (the average for measured locations, the day value for static ones).
pub fn build_location_data(
    coord: Coordinate,
    reading: TemperatureReading,
    description_temp: i32,
    maps_api_key: Option<&str>,
    rng: &mut impl Rng,
) -> LocationData {
    let Coordinate {
        latitude,
        longitude,
    } = coord;
    let name = classifier::location_name(latitude, longitude);
    let climate_zone = classifier::climate_zone(latitude, Some(longitude));

    let area = Area {
        id: rng.gen_range(0..AREA_ID_RANGE),
        name: name.clone(),
        latitude,
        longitude,
        day_temperature: reading.day_temp_c,
        night_temperature: reading.night_temp_c,
        soil_type: classifier::soil_type(latitude, longitude),
        description: classifier::area_description(&name, description_temp, climate_zone),
        climate_zone,
    };

    let mut location = LocationData {
        latitude,
        longitude,
        day_temp: reading.day_temp_c,
        night_temp: reading.night_temp_c,
        location_name: name,
        area,
        is_revealed: false,
        map_data: None,
    };
    location.map_data = Some(map_data(&location, maps_api_key));
    location
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn paris() -> LocationData {
        let mut rng = StdRng::seed_from_u64(5);
        build_location_data(
            Coordinate::new(48.8566, 2.3522),
            TemperatureReading::new(20, 10),
            15,
            None,
            &mut rng,
        )
    }

    #[test]
    fn test_map_urls() {
        assert_eq!(
            google_maps_url(48.8566, 2.3522, 10),
            "https://www.google.com/maps/@48.8566,2.3522,10z"
        );
        assert_eq!(
            open_street_map_url(48.8566, 2.3522, 10),
            "https://www.openstreetmap.org/#map=10/48.8566/2.3522"
        );
        assert_eq!(
            google_maps_embed_url(48.8566, 2.3522, 10, None),
            "https://maps.google.com/maps?q=48.8566,2.3522&hl=en&z=10&output=embed"
        );
    }

    #[test]
    fn test_search_url_encodes_name() {
        assert_eq!(
            google_maps_search_url("São Paulo", -23.5505, -46.6333),
            "https://www.google.com/maps/search/S%C3%A3o%20Paulo/@-23.5505,-46.6333,12z"
        );
    }

    #[test]
    fn test_embed_url_with_key() {
        let url = google_maps_embed_url(1.0, 2.0, 10, Some("abc"));
        assert_eq!(
            url,
            "https://www.google.com/maps/embed/v1/view?key=abc&center=1,2&zoom=10"
        );
    }

    #[test]
    fn test_build_location_data() {
        let loc = paris();
        assert_eq!(loc.location_name, "Paris");
        assert_eq!(loc.day_temp, 20);
        assert_eq!(loc.night_temp, 10);
        assert!(!loc.is_revealed);
        assert!(loc.area.id < 1000);
        assert_eq!(loc.area.climate_zone, ClimateZone::Temperate);
        assert_eq!(loc.area.soil_type, SoilType::Rocky);
        assert!(loc.area.description.contains("with cool temperatures"));

        let map = loc.map_data.as_ref().unwrap();
        assert_eq!(map.coordinates.formatted, "48.8566°, 2.3522°");
        assert_eq!(map.location_info.name, "Paris");
        assert_eq!(map.location_info.climate, ClimateZone::Temperate);
    }

    #[test]
    fn test_location_data_json_shape() {
        let json = serde_json::to_value(paris()).unwrap();
        assert_eq!(json["locationName"], "Paris");
        assert_eq!(json["isRevealed"], false);
        assert_eq!(json["area"]["climateZone"], "Temperate");
        assert_eq!(json["area"]["soilType"], "Rocky");
        assert_eq!(json["area"]["dayTemperature"], 20);
        assert!(json["mapData"]["maps"]["openStreetMap"].is_string());
    }

    #[test]
    fn test_location_data_accepts_client_payload_without_map() {
        let json = serde_json::json!({
            "latitude": 1.0, "longitude": 2.0, "dayTemp": 30, "nightTemp": 20,
            "locationName": "Somewhere",
            "area": {
                "id": 3, "name": "Somewhere", "latitude": 1.0, "longitude": 2.0,
                "dayTemperature": 30, "nightTemperature": 20, "soilType": "Clay-rich",
                "description": "", "climateZone": "Tropical Monsoon"
            }
        });
        let loc: LocationData = serde_json::from_value(json).unwrap();
        assert!(!loc.is_revealed);
        assert!(loc.map_data.is_none());
        assert_eq!(loc.area.climate_zone, ClimateZone::TropicalMonsoon);
    }
}
