//! Geographic classification heuristics.
//!
//! Everything here is a pure function of the coordinate: nearest major city,
//! regional / ocean naming, climate zone and soil type. The bounding boxes
//! are deliberately coarse and overlap; each table is evaluated top-down and
//! the first match wins, so table order is part of the behaviour.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::services::geometry::{haversine_km, Coordinate};

/// A city further away than this is not used to name a location (km).
const NEAREST_CITY_MAX_KM: f64 = 500.0;

/// Final label when no regional rule matches.
pub const REMOTE_REGION: &str = "Remote Geographic Region";

// ---------------------------------------------------------------------------
// Climate zones & soil types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ClimateZone {
    Tropical,
    #[serde(rename = "Tropical Rainforest")]
    TropicalRainforest,
    #[serde(rename = "Tropical Monsoon")]
    TropicalMonsoon,
    Subtropical,
    Mediterranean,
    Temperate,
    Continental,
    Steppe,
    #[serde(rename = "Arid Desert")]
    AridDesert,
    #[serde(rename = "Cold Desert")]
    ColdDesert,
    #[serde(rename = "Semi-Arid")]
    SemiArid,
    Subarctic,
    Tundra,
    Polar,
}

impl ClimateZone {
    pub fn label(&self) -> &'static str {
        match self {
            ClimateZone::Tropical => "Tropical",
            ClimateZone::TropicalRainforest => "Tropical Rainforest",
            ClimateZone::TropicalMonsoon => "Tropical Monsoon",
            ClimateZone::Subtropical => "Subtropical",
            ClimateZone::Mediterranean => "Mediterranean",
            ClimateZone::Temperate => "Temperate",
            ClimateZone::Continental => "Continental",
            ClimateZone::Steppe => "Steppe",
            ClimateZone::AridDesert => "Arid Desert",
            ClimateZone::ColdDesert => "Cold Desert",
            ClimateZone::SemiArid => "Semi-Arid",
            ClimateZone::Subarctic => "Subarctic",
            ClimateZone::Tundra => "Tundra",
            ClimateZone::Polar => "Polar",
        }
    }

    /// Sentence appended to an area description.
    fn description(&self) -> &'static str {
        match self {
            ClimateZone::Tropical => {
                "offers year-round growing seasons with high biodiversity potential"
            }
            ClimateZone::TropicalRainforest => {
                "sustains dense vegetation with heavy rainfall and constant warmth"
            }
            ClimateZone::TropicalMonsoon => {
                "alternates between drenching monsoon rains and a pronounced dry season"
            }
            ClimateZone::Subtropical => {
                "provides excellent conditions for diverse crop cultivation"
            }
            ClimateZone::Mediterranean => {
                "enjoys mild wet winters and dry summers suited to olives, vines and citrus"
            }
            ClimateZone::Temperate => {
                "features seasonal variations ideal for traditional agriculture"
            }
            ClimateZone::Continental => {
                "experiences distinct seasons suitable for grain production"
            }
            ClimateZone::Steppe => "supports grasslands and grazing with careful water management",
            ClimateZone::AridDesert => "demands irrigation and heat-tolerant crops to farm at all",
            ClimateZone::ColdDesert => "combines scarce rainfall with harsh winters",
            ClimateZone::SemiArid => "rewards drought-resistant crops and water harvesting",
            ClimateZone::Subarctic => "allows only a brief but intense summer growing window",
            ClimateZone::Tundra => "limits farming to hardy plants over permafrost soils",
            ClimateZone::Polar => "requires specialized techniques for short-season cultivation",
        }
    }
}

impl fmt::Display for ClimateZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum SoilType {
    Sandy,
    #[serde(rename = "Clay-rich")]
    ClayRich,
    Volcanic,
    Rocky,
    Loamy,
    Peaty,
}

impl SoilType {
    /// Hash order used by [`soil_type`].
    pub const ALL: [SoilType; 6] = [
        SoilType::Sandy,
        SoilType::ClayRich,
        SoilType::Volcanic,
        SoilType::Rocky,
        SoilType::Loamy,
        SoilType::Peaty,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SoilType::Sandy => "Sandy",
            SoilType::ClayRich => "Clay-rich",
            SoilType::Volcanic => "Volcanic",
            SoilType::Rocky => "Rocky",
            SoilType::Loamy => "Loamy",
            SoilType::Peaty => "Peaty",
        }
    }
}

impl fmt::Display for SoilType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Stable (not physically meaningful) soil hash: `floor(|lat*lon| * 10) mod 6`.
pub fn soil_type(lat: f64, lon: f64) -> SoilType {
    let hash = ((lat * lon).abs() * 10.0).floor();
    let idx = if hash.is_finite() {
        (hash % SoilType::ALL.len() as f64) as usize
    } else {
        0
    };
    SoilType::ALL[idx]
}

// ---------------------------------------------------------------------------
// Climate-zone boxes
// ---------------------------------------------------------------------------

/// Inclusive lat/lon rectangle mapped to a climate zone.
#[derive(Debug)]
struct ZoneBox {
    #[allow(dead_code)] // only read through Debug
    name: &'static str,
    lat: (f64, f64),
    lon: (f64, f64),
    zone: ClimateZone,
}

impl ZoneBox {
    fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.lat.0 && lat <= self.lat.1 && lon >= self.lon.0 && lon <= self.lon.1
    }
}

const fn zone_box(
    name: &'static str,
    lat: (f64, f64),
    lon: (f64, f64),
    zone: ClimateZone,
) -> ZoneBox {
    ZoneBox {
        name,
        lat,
        lon,
        zone,
    }
}

/// Regional climate boxes, highest precedence first.
const CLIMATE_BOXES: &[ZoneBox] = &[
    // Hot deserts
    zone_box("Sahara", (15.0, 30.0), (-17.0, 35.0), ClimateZone::AridDesert),
    zone_box("Arabian Desert", (12.0, 32.0), (35.0, 60.0), ClimateZone::AridDesert),
    zone_box("Thar Desert", (24.0, 30.0), (69.0, 76.0), ClimateZone::AridDesert),
    zone_box("Sonoran & Mojave", (25.0, 37.0), (-118.0, -108.0), ClimateZone::AridDesert),
    zone_box("Atacama", (-30.0, -18.0), (-72.0, -68.0), ClimateZone::AridDesert),
    zone_box("Australian Outback", (-32.0, -20.0), (115.0, 145.0), ClimateZone::AridDesert),
    zone_box("Kalahari & Namib", (-28.0, -18.0), (12.0, 25.0), ClimateZone::SemiArid),
    // Cold deserts
    zone_box("Gobi", (38.0, 46.0), (90.0, 115.0), ClimateZone::ColdDesert),
    zone_box("Taklamakan", (36.0, 42.0), (75.0, 90.0), ClimateZone::ColdDesert),
    zone_box("Patagonian Desert", (-52.0, -40.0), (-72.0, -64.0), ClimateZone::ColdDesert),
    // Mediterranean climates
    zone_box("Mediterranean Basin", (30.0, 45.0), (-10.0, 36.0), ClimateZone::Mediterranean),
    zone_box("California", (32.0, 42.0), (-124.0, -117.0), ClimateZone::Mediterranean),
    zone_box("Central Chile", (-38.0, -30.0), (-74.0, -70.0), ClimateZone::Mediterranean),
    zone_box("Western Cape", (-35.0, -32.0), (17.0, 21.0), ClimateZone::Mediterranean),
    zone_box("Southwest Australia", (-36.0, -30.0), (114.0, 120.0), ClimateZone::Mediterranean),
    // Rainforests
    zone_box("Amazon Basin", (-15.0, 5.0), (-75.0, -45.0), ClimateZone::TropicalRainforest),
    zone_box("Congo Basin", (-5.0, 5.0), (10.0, 30.0), ClimateZone::TropicalRainforest),
    zone_box("Maritime Southeast Asia", (-10.0, 7.0), (95.0, 150.0), ClimateZone::TropicalRainforest),
    // Monsoon belt
    zone_box("Indian Subcontinent", (8.0, 28.0), (68.0, 92.0), ClimateZone::TropicalMonsoon),
    zone_box("Mainland Southeast Asia", (8.0, 25.0), (92.0, 110.0), ClimateZone::TropicalMonsoon),
    // Steppes and semi-arid belts
    zone_box("Sahel", (10.0, 15.0), (-17.0, 35.0), ClimateZone::SemiArid),
    zone_box("Eurasian Steppe", (42.0, 55.0), (35.0, 90.0), ClimateZone::Steppe),
    zone_box("Great Plains", (35.0, 50.0), (-105.0, -95.0), ClimateZone::Steppe),
    // Polar fringe
    zone_box("Arctic Tundra", (66.5, 80.0), (-180.0, 180.0), ClimateZone::Tundra),
    zone_box("Siberian Taiga", (55.0, 66.5), (60.0, 180.0), ClimateZone::Subarctic),
    zone_box("Canadian Boreal", (50.0, 66.5), (-170.0, -55.0), ClimateZone::Subarctic),
    // Mid-latitude regions
    zone_box("Eastern Europe & Russia", (45.0, 60.0), (15.0, 60.0), ClimateZone::Continental),
    zone_box("Northeastern North America", (40.0, 50.0), (-95.0, -60.0), ClimateZone::Continental),
    zone_box("Northeast China & Korea", (38.0, 50.0), (115.0, 135.0), ClimateZone::Continental),
    zone_box("Western Europe", (43.0, 60.0), (-10.0, 15.0), ClimateZone::Temperate),
    zone_box("Pacific Northwest", (40.0, 50.0), (-125.0, -117.0), ClimateZone::Temperate),
    zone_box("New Zealand", (-47.0, -34.0), (166.0, 179.0), ClimateZone::Temperate),
    zone_box("Southeastern United States", (25.0, 35.0), (-100.0, -75.0), ClimateZone::Subtropical),
    zone_box("Southern China", (22.0, 35.0), (105.0, 122.0), ClimateZone::Subtropical),
    zone_box("Pampas & Southern Brazil", (-40.0, -23.0), (-65.0, -45.0), ClimateZone::Subtropical),
    zone_box("Eastern Australia", (-38.0, -25.0), (145.0, 154.0), ClimateZone::Subtropical),
];

/// Climate zone from latitude alone.
pub fn climate_zone_by_latitude(lat: f64) -> ClimateZone {
    let abs_lat = lat.abs();
    if abs_lat < 23.5 {
        ClimateZone::Tropical
    } else if abs_lat < 35.0 {
        ClimateZone::Subtropical
    } else if abs_lat < 45.0 {
        ClimateZone::Temperate
    } else if abs_lat < 50.0 {
        ClimateZone::Continental
    } else if abs_lat < 66.5 {
        ClimateZone::Subarctic
    } else {
        ClimateZone::Polar
    }
}

/// Climate zone for a location.
///
/// With a longitude the regional boxes are tried first; without one, or when
/// no box matches, the latitude bands decide.
pub fn climate_zone(lat: f64, lon: Option<f64>) -> ClimateZone {
    lon.and_then(|lon| {
        CLIMATE_BOXES
            .iter()
            .find(|b| b.contains(lat, lon))
            .map(|b| b.zone)
    })
    .unwrap_or_else(|| climate_zone_by_latitude(lat))
}

// ---------------------------------------------------------------------------
// Naming
// ---------------------------------------------------------------------------

struct City {
    name: &'static str,
    lat: f64,
    lon: f64,
}

const fn city(name: &'static str, lat: f64, lon: f64) -> City {
    City { name, lat, lon }
}

const MAJOR_CITIES: &[City] = &[
    // North America
    city("New York", 40.7128, -74.0060),
    city("Los Angeles", 34.0522, -118.2437),
    city("Chicago", 41.8781, -87.6298),
    city("Toronto", 43.6532, -79.3832),
    city("Mexico City", 19.4326, -99.1332),
    // Europe
    city("London", 51.5074, -0.1278),
    city("Paris", 48.8566, 2.3522),
    city("Berlin", 52.5200, 13.4050),
    city("Madrid", 40.4168, -3.7038),
    city("Rome", 41.9028, 12.4964),
    city("Moscow", 55.7558, 37.6173),
    // Asia
    city("Tokyo", 35.6762, 139.6503),
    city("Beijing", 39.9042, 116.4074),
    city("Shanghai", 31.2304, 121.4737),
    city("Mumbai", 19.0760, 72.8777),
    city("Delhi", 28.7041, 77.1025),
    city("Bangkok", 13.7563, 100.5018),
    city("Seoul", 37.5665, 126.9780),
    // Middle East & Africa
    city("Cairo", 30.0444, 31.2357),
    city("Istanbul", 41.0082, 28.9784),
    city("Dubai", 25.2048, 55.2708),
    city("Cape Town", -33.9249, 18.4241),
    city("Lagos", 6.5244, 3.3792),
    // South America
    city("São Paulo", -23.5505, -46.6333),
    city("Buenos Aires", -34.6118, -58.3960),
    city("Lima", -12.0464, -77.0428),
    // Oceania
    city("Sydney", -33.8688, 151.2093),
    city("Melbourne", -37.8136, 144.9631),
    city("Auckland", -36.8485, 174.7633),
];

/// Closest major city within 500 km, if any.
pub fn nearest_city(lat: f64, lon: f64) -> Option<&'static str> {
    let mut nearest = None;
    let mut min_distance = f64::INFINITY;

    for c in MAJOR_CITIES {
        let distance = haversine_km(lat, lon, c.lat, c.lon);
        if distance < min_distance && distance < NEAREST_CITY_MAX_KM {
            min_distance = distance;
            nearest = Some(c.name);
        }
    }

    nearest
}

/// Nearest major city, or a regional name when none is close enough.
pub fn location_name(lat: f64, lon: f64) -> String {
    match nearest_city(lat, lon) {
        Some(name) => name.to_string(),
        None => regional_name(lat, lon).to_string(),
    }
}

/// Continent-level bucketing, deferring to [`geographic_region`] outside the four boxes.
pub fn regional_name(lat: f64, lon: f64) -> &'static str {
    if (-60.0..=75.0).contains(&lat) && (-180.0..=-30.0).contains(&lon) {
        if lat >= 23.5 {
            return "North American Plains";
        }
        if lat >= 0.0 {
            return "Central American Highlands";
        }
        return "South American Region";
    }

    if (35.0..=71.0).contains(&lat) && (-10.0..=40.0).contains(&lon) {
        if lon <= 15.0 {
            return "Western European Region";
        }
        return "Eastern European Plains";
    }

    if (-35.0..=55.0).contains(&lat) && (25.0..=60.0).contains(&lon) {
        if lat >= 15.0 {
            return "Northern African Region";
        }
        if lat >= -10.0 {
            return "Central African Basin";
        }
        return "Southern African Region";
    }

    if (-50.0..=75.0).contains(&lat) && (60.0..=180.0).contains(&lon) {
        if lat >= 50.0 {
            return "Siberian Region";
        }
        if lat >= 20.0 {
            return "Central Asian Steppes";
        }
        if lat >= -10.0 {
            return "Southeast Asian Region";
        }
        return "Australian Outback";
    }

    geographic_region(lat, lon)
}

/// Finer geographic naming: oceans first, then land regions, then ocean bands.
pub fn geographic_region(lat: f64, lon: f64) -> &'static str {
    if is_ocean_region(lat, lon) {
        return ocean_region_name(lat, lon);
    }

    if (-60.0..=83.0).contains(&lat) && (-180.0..=-30.0).contains(&lon) {
        if lat >= 60.0 {
            return "Alaska Region";
        }
        if lat >= 49.0 {
            return "Canadian Prairies";
        }
        if lat >= 25.5 {
            if (-125.0..=-66.0).contains(&lon) {
                return "United States Plains";
            }
            if lon >= -125.0 {
                return "US West Coast";
            }
            return "US East Coast";
        }
        if lat >= 14.0 {
            return "Mexico & Central America";
        }
        if lat >= -23.0 {
            return "Amazon Basin";
        }
        if lat >= -35.0 {
            return "Brazilian Highlands";
        }
        return "Patagonia Region";
    }

    if (35.0..=71.0).contains(&lat) && (-10.0..=60.0).contains(&lon) {
        if lat >= 60.0 {
            return "Scandinavian Peninsula";
        }
        if lon <= 30.0 {
            if lat >= 50.0 {
                return "Northern European Plains";
            }
            if lat >= 40.0 {
                return "Mediterranean Region";
            }
            return "Southern Europe";
        }
        if lat >= 55.0 {
            return "Russian Taiga";
        }
        if lat >= 45.0 {
            return "Eastern European Steppes";
        }
        return "Caucasus Region";
    }

    if (-35.0..=38.0).contains(&lat) && (-18.0..=52.0).contains(&lon) {
        if lat >= 25.0 {
            if lon >= 32.0 {
                return "Arabian Peninsula";
            }
            return "Sahara Desert";
        }
        if lat >= 10.0 {
            return "Sahel Region";
        }
        if lat >= 0.0 {
            return "Congo Basin";
        }
        if lat >= -15.0 {
            return "East African Highlands";
        }
        if lat >= -25.0 {
            return "Zambezi Basin";
        }
        return "Kalahari Region";
    }

    if (-50.0..=75.0).contains(&lat) && (60.0..=180.0).contains(&lon) {
        if lat >= 65.0 {
            return "Siberian Tundra";
        }
        if lat >= 50.0 {
            return "Central Siberia";
        }
        if lat >= 35.0 {
            if lon >= 135.0 {
                return "Manchurian Plains";
            }
            if lon >= 100.0 {
                return "Mongolian Steppes";
            }
            return "Central Asian Desert";
        }
        if lat >= 20.0 {
            if lon >= 135.0 {
                return "East China Plains";
            }
            if lon >= 100.0 {
                return "Southeast Asian Highlands";
            }
            return "Indian Subcontinent";
        }
        if lat >= -10.0 {
            if lon >= 140.0 {
                return "Indonesian Archipelago";
            }
            return "Indochina Peninsula";
        }
        if lat >= -30.0 {
            return "Northern Australia";
        }
        return "Australian Outback";
    }

    // Pacific
    if lon >= 120.0 || lon <= -120.0 {
        if lat >= 20.0 {
            return "North Pacific Region";
        }
        if lat >= 0.0 {
            return "Equatorial Pacific";
        }
        return "South Pacific Islands";
    }

    // Atlantic
    if (-60.0..=20.0).contains(&lon) {
        if lat >= 40.0 {
            return "North Atlantic Region";
        }
        if lat >= 0.0 {
            return "Tropical Atlantic";
        }
        return "South Atlantic Region";
    }

    // Indian Ocean
    if (40.0..=100.0).contains(&lon) {
        if lat >= 0.0 {
            return "Arabian Sea Region";
        }
        return "Indian Ocean Basin";
    }

    REMOTE_REGION
}

/// Simplified ocean detection by longitude band with land exclusions.
///
/// Enclosed seas are ignored and whole longitude bands count as ocean.
pub fn is_ocean_region(lat: f64, lon: f64) -> bool {
    // Pacific
    if (120.0..=180.0).contains(&lon) || (-180.0..=-120.0).contains(&lon) {
        return true;
    }

    // Atlantic, minus Europe/Africa and the Americas
    let europe_africa = (25.0..=75.0).contains(&lat) && (-25.0..=50.0).contains(&lon);
    let americas = (-35.0..=35.0).contains(&lat) && (-60.0..=-35.0).contains(&lon);
    if (-60.0..=75.0).contains(&lat)
        && (-80.0..=20.0).contains(&lon)
        && !(europe_africa || americas)
    {
        return true;
    }

    // Indian, minus Africa
    let africa = (-35.0..=35.0).contains(&lat) && (20.0..=52.0).contains(&lon);
    if (-60.0..=30.0).contains(&lat) && (20.0..=120.0).contains(&lon) && !africa {
        return true;
    }

    // Arctic / Southern
    lat >= 75.0 || lat <= -60.0
}

pub fn ocean_region_name(lat: f64, lon: f64) -> &'static str {
    if lat >= 75.0 {
        return "Arctic Ocean Region";
    }
    if lat <= -60.0 {
        return "Antarctic Waters";
    }

    if (120.0..=180.0).contains(&lon) || (-180.0..=-120.0).contains(&lon) {
        if lat >= 20.0 {
            return "North Pacific Basin";
        }
        if lat >= -20.0 {
            return "Equatorial Pacific";
        }
        return "South Pacific Basin";
    }

    if (-80.0..=20.0).contains(&lon) {
        if lat >= 25.0 {
            return "North Atlantic Basin";
        }
        if lat >= -25.0 {
            return "Equatorial Atlantic";
        }
        return "South Atlantic Basin";
    }

    if (20.0..=120.0).contains(&lon) {
        if lat >= 10.0 {
            return "Arabian Sea";
        }
        return "Indian Ocean Basin";
    }

    "Open Ocean Region"
}

/// Coarse continent name for map pins.
pub fn continent_name(lat: f64, lon: f64) -> &'static str {
    if (-60.0..=83.0).contains(&lat) && (-180.0..=-30.0).contains(&lon) {
        if lat >= 15.0 {
            return "North America";
        }
        return "South America";
    }
    if (35.0..=71.0).contains(&lat) && (-10.0..=60.0).contains(&lon) {
        return "Europe";
    }
    if (-35.0..=40.0).contains(&lat) && (-18.0..=52.0).contains(&lon) {
        return "Africa";
    }
    if (-50.0..=75.0).contains(&lat) && (60.0..=180.0).contains(&lon) {
        if lat >= -10.0 {
            return "Asia";
        }
        return "Australia";
    }
    "Ocean"
}

// ---------------------------------------------------------------------------
// Classification & descriptions
// ---------------------------------------------------------------------------

/// Name, climate zone and soil type for a coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub name: String,
    pub climate_zone: ClimateZone,
    pub soil_type: SoilType,
    pub continent: String,
}

pub fn classify(coord: Coordinate) -> Classification {
    let Coordinate {
        latitude,
        longitude,
    } = coord;
    Classification {
        name: location_name(latitude, longitude),
        climate_zone: climate_zone(latitude, Some(longitude)),
        soil_type: soil_type(latitude, longitude),
        continent: continent_name(latitude, longitude).to_string(),
    }
}

pub fn temperature_description(temp_c: i32) -> &'static str {
    if temp_c > 30 {
        "hot"
    } else if temp_c > 25 {
        "warm"
    } else if temp_c > 15 {
        "moderate"
    } else if temp_c > 5 {
        "cool"
    } else {
        "cold"
    }
}

/// "metropolitan area" when the name mentions a major city, "region" otherwise.
pub fn city_type(name: &str) -> &'static str {
    if MAJOR_CITIES.iter().any(|c| name.contains(c.name)) {
        "metropolitan area"
    } else {
        "region"
    }
}

pub fn area_description(name: &str, temp_c: i32, zone: ClimateZone) -> String {
    format!(
        "{} {} with {} temperatures. {} {}",
        zone,
        city_type(name),
        temperature_description(temp_c),
        name,
        zone.description()
    )
}
