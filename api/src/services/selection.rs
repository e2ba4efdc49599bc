//! Location selection for the game.
//!
//! Random locations are drawn from `lst_statistics` with one of three paging
//! strategies. A strategy that errors or yields no usable rows hands over to
//! the next one in the fixed order count → large-offset → multi-batch, and
//! the chain ends in a static list of well-known cities, so selection never
//! fails.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::db::models::{CountRow, StatisticRecord};
use crate::db::{queries, Postgrest};
use crate::errors::AppError;
use crate::helpers::opt_value_to_f64;
use crate::services::area::{build_location_data, map_data, Area, LocationData};
use crate::services::classifier::{self, ClimateZone};
use crate::services::geocoding::Geocoder;
use crate::services::geometry::Coordinate;
use crate::services::temperature::{fetch_temperatures, SampleDepth, TemperatureReading};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Assumed table size when the count body is not an array.
const DEFAULT_TOTAL_RECORDS: u64 = 10_000;
/// Lower bound for an estimated table size.
const MIN_ESTIMATED_RECORDS: u64 = 5_000;
/// Lower bound for the count strategy's offset range.
const MIN_MAX_OFFSET: u64 = 1_000;
const COUNT_BATCH_SIZE: u32 = 10;

const LARGE_OFFSET_MAX: u64 = 50_000;
const LARGE_OFFSET_RETRY_MAX: u64 = 5_000;
const LARGE_OFFSET_BATCH_SIZE: u32 = 15;

/// Offset windows for the multi-batch strategy; one is picked per call.
const MULTI_BATCH_WINDOWS: [(u64, u64); 3] = [(0, 10_000), (10_000, 30_000), (25_000, 40_000)];
const MULTI_BATCH_SIZE: u32 = 20;

/// Temperature quoted in descriptions of areas that have not been measured yet.
const UNMEASURED_DESCRIPTION_TEMP: i32 = 20;

/// Last-resort random locations: (latitude, longitude, day °C, night °C).
pub const FALLBACK_LOCATIONS: [(f64, f64, i32, i32); 8] = [
    (40.7128, -74.0060, 22, 12),  // New York
    (51.5074, -0.1278, 18, 8),    // London
    (35.6762, 139.6503, 25, 15),  // Tokyo
    (-33.8688, 151.2093, 28, 18), // Sydney
    (48.8566, 2.3522, 20, 10),    // Paris
    (34.0522, -118.2437, 26, 16), // Los Angeles
    (19.0760, 72.8777, 32, 24),   // Mumbai
    (-23.5505, -46.6333, 24, 14), // São Paulo
];

/// Areas offered when the statistics table is empty or unreachable.
const FALLBACK_AREAS: [(&str, f64, f64, ClimateZone); 15] = [
    ("New York", 40.7128, -74.0060, ClimateZone::Temperate),
    ("London", 51.5074, -0.1278, ClimateZone::Temperate),
    ("Tokyo", 35.6762, 139.6503, ClimateZone::Subtropical),
    ("Sydney", -33.8688, 151.2093, ClimateZone::Subtropical),
    ("Paris", 48.8566, 2.3522, ClimateZone::Temperate),
    ("Los Angeles", 34.0522, -118.2437, ClimateZone::Subtropical),
    ("Mumbai", 19.0760, 72.8777, ClimateZone::Tropical),
    ("São Paulo", -23.5505, -46.6333, ClimateZone::Subtropical),
    ("Cairo", 30.0444, 31.2357, ClimateZone::Subtropical),
    ("Moscow", 55.7558, 37.6173, ClimateZone::Continental),
    ("Beijing", 39.9042, 116.4074, ClimateZone::Continental),
    ("Cape Town", -33.9249, 18.4241, ClimateZone::Temperate),
    ("Bangkok", 13.7563, 100.5018, ClimateZone::Tropical),
    ("Berlin", 52.5200, 13.4050, ClimateZone::Temperate),
    ("Buenos Aires", -34.6118, -58.3960, ClimateZone::Subtropical),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    CountBased,
    LargeOffset,
    MultiBatch,
}

/// Chain order; a call starts at a random position and walks to the end.
pub const STRATEGIES: [Strategy; 3] = [
    Strategy::CountBased,
    Strategy::LargeOffset,
    Strategy::MultiBatch,
];

impl Strategy {
    fn name(&self) -> &'static str {
        match self {
            Strategy::CountBased => "count-based",
            Strategy::LargeOffset => "large-offset",
            Strategy::MultiBatch => "multi-batch",
        }
    }
}

/// Table size from a `select=count` response.
///
/// Uses the first row's `count` when it is a positive number, otherwise
/// estimates from the number of rows returned.
pub fn estimate_total(rows: &[CountRow]) -> u64 {
    let counted = rows
        .first()
        .and_then(|r| opt_value_to_f64(r.count.as_ref()))
        .filter(|c| *c > 0.0);

    match counted {
        Some(count) => count as u64,
        None => (rows.len() as u64 * 100).max(MIN_ESTIMATED_RECORDS),
    }
}

/// Unique coordinates in first-seen order.
pub fn unique_coordinates(records: &[StatisticRecord]) -> Vec<Coordinate> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter_map(StatisticRecord::coordinate)
        .filter(|c| seen.insert((c.latitude.to_bits(), c.longitude.to_bits())))
        .collect()
}

pub fn fallback_areas() -> Vec<Area> {
    FALLBACK_AREAS
        .iter()
        .enumerate()
        .map(|(i, &(name, latitude, longitude, climate_zone))| Area {
            id: i as u32 + 1,
            name: name.to_string(),
            latitude,
            longitude,
            day_temperature: 0,
            night_temperature: 0,
            soil_type: classifier::soil_type(latitude, longitude),
            description: classifier::area_description(
                name,
                UNMEASURED_DESCRIPTION_TEMP,
                climate_zone,
            ),
            climate_zone,
        })
        .collect()
}

fn unmeasured_area(id: u32, coord: Coordinate, name: String) -> Area {
    let climate_zone = classifier::climate_zone(coord.latitude, Some(coord.longitude));
    Area {
        id,
        description: classifier::area_description(&name, UNMEASURED_DESCRIPTION_TEMP, climate_zone),
        name,
        latitude: coord.latitude,
        longitude: coord.longitude,
        day_temperature: 0,
        night_temperature: 0,
        soil_type: classifier::soil_type(coord.latitude, coord.longitude),
        climate_zone,
    }
}

/// One of the static fallback locations, chosen uniformly.
pub fn static_fallback_location(maps_api_key: Option<&str>, rng: &mut impl Rng) -> LocationData {
    let idx = rng.gen_range(0..FALLBACK_LOCATIONS.len());
    let (lat, lon, day, night) = FALLBACK_LOCATIONS[idx];
    build_location_data(
        Coordinate::new(lat, lon),
        TemperatureReading::new(day, night),
        day,
        maps_api_key,
        rng,
    )
}

/// Resolves game locations against the LST statistics store.
#[derive(Debug, Clone)]
pub struct LocationService {
    db: Postgrest,
    geocoder: Geocoder,
    maps_api_key: Option<String>,
}

impl LocationService {
    pub fn new(db: Postgrest, geocoder: Geocoder, maps_api_key: Option<String>) -> Self {
        Self {
            db,
            geocoder,
            maps_api_key,
        }
    }

    pub fn geocoder(&self) -> &Geocoder {
        &self.geocoder
    }

    /// Pick a random measured location. Never fails.
    pub async fn pick_random_area(&self, rng: &mut impl Rng) -> LocationData {
        let start = rng.gen_range(0..STRATEGIES.len());
        self.pick_with_strategies(&STRATEGIES[start..], rng).await
    }

    async fn pick_with_strategies(
        &self,
        strategies: &[Strategy],
        rng: &mut impl Rng,
    ) -> LocationData {
        for &strategy in strategies {
            let batch = match self.fetch_batch(strategy, rng).await {
                Ok(batch) => batch,
                Err(e) => {
                    tracing::warn!("{} strategy failed: {}", strategy.name(), e);
                    continue;
                }
            };

            let candidates: Vec<Coordinate> =
                batch.iter().filter_map(StatisticRecord::coordinate).collect();
            let Some(&coord) = candidates.choose(rng) else {
                tracing::warn!("{} strategy returned no usable rows", strategy.name());
                continue;
            };

            tracing::debug!(
                "{}: selected ({}, {}) from {} rows",
                strategy.name(),
                coord.latitude,
                coord.longitude,
                batch.len()
            );
            return self
                .location_for_coordinates(coord, SampleDepth::Enhanced, rng)
                .await;
        }

        tracing::warn!("All random-location strategies failed, using static fallback");
        static_fallback_location(self.maps_api_key.as_deref(), rng)
    }

    async fn fetch_batch(
        &self,
        strategy: Strategy,
        rng: &mut impl Rng,
    ) -> Result<Vec<StatisticRecord>, AppError> {
        match strategy {
            Strategy::CountBased => {
                let total = match queries::statistics_count(&self.db).await? {
                    Some(rows) => estimate_total(&rows),
                    None => {
                        tracing::debug!("Unexpected count body, assuming {}", DEFAULT_TOTAL_RECORDS);
                        DEFAULT_TOTAL_RECORDS
                    }
                };
                let max_offset = total.saturating_sub(10).max(MIN_MAX_OFFSET);
                let offset = rng.gen_range(0..max_offset);
                queries::statistics_batch(&self.db, COUNT_BATCH_SIZE, offset).await
            }
            Strategy::LargeOffset => {
                let offset = rng.gen_range(0..LARGE_OFFSET_MAX);
                let batch =
                    queries::statistics_batch(&self.db, LARGE_OFFSET_BATCH_SIZE, offset).await?;
                if !batch.is_empty() {
                    return Ok(batch);
                }
                let retry = rng.gen_range(0..LARGE_OFFSET_RETRY_MAX);
                tracing::debug!("Offset {} past end of table, retrying at {}", offset, retry);
                queries::statistics_batch(&self.db, LARGE_OFFSET_BATCH_SIZE, retry).await
            }
            Strategy::MultiBatch => {
                let offsets: Vec<u64> = MULTI_BATCH_WINDOWS
                    .iter()
                    .map(|&(lo, hi)| rng.gen_range(lo..hi))
                    .collect();
                let offset = offsets[rng.gen_range(0..offsets.len())];
                queries::statistics_batch(&self.db, MULTI_BATCH_SIZE, offset).await
            }
        }
    }

    /// Measure and classify an arbitrary coordinate.
    pub async fn location_for_coordinates(
        &self,
        coord: Coordinate,
        depth: SampleDepth,
        rng: &mut impl Rng,
    ) -> LocationData {
        let reading = fetch_temperatures(&self.db, coord, depth, rng).await;
        build_location_data(
            coord,
            reading,
            reading.avg_temp_c,
            self.maps_api_key.as_deref(),
            rng,
        )
    }

    /// Measure a selected area and copy the temperatures into it.
    pub async fn location_for_area(&self, mut area: Area, rng: &mut impl Rng) -> LocationData {
        let mut location = self
            .location_for_coordinates(area.coordinate(), SampleDepth::Enhanced, rng)
            .await;

        area.day_temperature = location.day_temp;
        area.night_temperature = location.night_temp;
        location.area = area;
        location.map_data = Some(map_data(&location, self.maps_api_key.as_deref()));
        location
    }

    /// Every distinct coordinate in the statistics table as an unmeasured area.
    ///
    /// With `resolve_names` each area is named by the geocoding chain instead
    /// of the offline classifier.
    pub async fn available_areas(&self, resolve_names: bool) -> Vec<Area> {
        let records = match queries::statistic_coordinates(&self.db).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Failed to fetch areas, using fallback list: {}", e);
                return fallback_areas();
            }
        };

        let coords = unique_coordinates(&records);
        if coords.is_empty() {
            tracing::warn!("No areas found in statistics table, using fallback list");
            return fallback_areas();
        }
        tracing::debug!(
            "Found {} unique locations in {} records",
            coords.len(),
            records.len()
        );

        let names: Vec<String> = if resolve_names {
            self.geocoder
                .reverse_geocode_all(&coords)
                .await
                .into_iter()
                .map(|place| place.full_name)
                .collect()
        } else {
            coords
                .iter()
                .map(|c| classifier::location_name(c.latitude, c.longitude))
                .collect()
        };

        coords
            .into_iter()
            .zip(names)
            .enumerate()
            .map(|(i, (coord, name))| unmeasured_area(i as u32 + 1, coord, name))
            .collect()
    }
}
