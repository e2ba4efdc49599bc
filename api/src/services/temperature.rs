//! Day/night temperature derivation from MODIS LST statistics.
//!
//! Statistic rows carry Kelvin mean/min/max values per band. Day readings
//! weight the maxima, night readings the minima; when no usable rows exist a
//! plausible random value is synthesized instead.

use std::ops::RangeInclusive;

use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::models::{StatisticRecord, DAY_BAND, NIGHT_BAND};
use crate::db::{queries, Postgrest};
use crate::helpers::round_half_up;
use crate::services::geometry::Coordinate;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Absolute zero offset between Kelvin and Celsius.
const KELVIN_OFFSET: f64 = 273.15;

/// Weight of the band extreme (max for day, min for night).
const EXTREME_WEIGHT: f64 = 0.7;
/// Weight of the band mean.
const MEAN_WEIGHT: f64 = 0.3;

/// Derived temperatures are clamped to plausible Earth surface values (°C).
pub const MIN_TEMP_C: i32 = -50;
pub const MAX_TEMP_C: i32 = 60;

/// Random day temperature range when no samples are usable (°C).
pub const DAY_FALLBACK_C: RangeInclusive<i32> = 20..=45;
/// Random night temperature range when no samples are usable (°C).
pub const NIGHT_FALLBACK_C: RangeInclusive<i32> = 5..=25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOfDay {
    Day,
    Night,
}

impl TimeOfDay {
    pub fn band(&self) -> &'static str {
        match self {
            TimeOfDay::Day => DAY_BAND,
            TimeOfDay::Night => NIGHT_BAND,
        }
    }

    fn fallback_range(&self) -> RangeInclusive<i32> {
        match self {
            TimeOfDay::Day => DAY_FALLBACK_C,
            TimeOfDay::Night => NIGHT_FALLBACK_C,
        }
    }
}

/// How many statistic rows to fetch per band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleDepth {
    /// Random-location pipeline
    Enhanced,
    /// Lookups for a given coordinate or area
    Legacy,
}

impl SampleDepth {
    pub fn limit(&self) -> u32 {
        match self {
            SampleDepth::Enhanced => 20,
            SampleDepth::Legacy => 10,
        }
    }
}

/// Derived day, night and average temperature in whole °C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureReading {
    pub day_temp_c: i32,
    pub night_temp_c: i32,
    pub avg_temp_c: i32,
}

impl TemperatureReading {
    pub fn new(day_temp_c: i32, night_temp_c: i32) -> Self {
        let avg = round_half_up(f64::from(day_temp_c + night_temp_c) / 2.0) as i32;
        Self {
            day_temp_c,
            night_temp_c,
            avg_temp_c: avg,
        }
    }
}

/// Kelvin to whole degrees Celsius, rounding half up (308.68 K → 36 °C).
pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    round_half_up(kelvin - KELVIN_OFFSET)
}

/// (mean, min, max) in Kelvin when all three are present and non-zero.
///
/// A zero statistic is treated as missing; MODIS writes 0 for fill pixels.
fn usable_kelvin(record: &StatisticRecord) -> Option<(f64, f64, f64)> {
    let mean = record.mean_kelvin().filter(|v| *v != 0.0)?;
    let min = record.min_kelvin().filter(|v| *v != 0.0)?;
    let max = record.max_kelvin().filter(|v| *v != 0.0)?;
    Some((mean, min, max))
}

fn average(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Derive one temperature (°C) from a batch of statistic rows for a band.
pub fn derive_temperature(
    samples: &[StatisticRecord],
    time_of_day: TimeOfDay,
    rng: &mut impl Rng,
) -> i32 {
    let usable: Vec<(f64, f64, f64)> = samples.iter().filter_map(usable_kelvin).collect();

    if usable.is_empty() {
        let temp = rng.gen_range(time_of_day.fallback_range());
        tracing::debug!(
            "No usable {} samples, using random {}°C",
            time_of_day.band(),
            temp
        );
        return temp;
    }

    let means: Vec<f64> = usable.iter().map(|&(mean, _, _)| kelvin_to_celsius(mean)).collect();
    let extremes: Vec<f64> = usable
        .iter()
        .map(|&(_, min, max)| match time_of_day {
            TimeOfDay::Day => kelvin_to_celsius(max),
            TimeOfDay::Night => kelvin_to_celsius(min),
        })
        .collect();

    let weighted = average(&extremes) * EXTREME_WEIGHT + average(&means) * MEAN_WEIGHT;
    (round_half_up(weighted) as i32).clamp(MIN_TEMP_C, MAX_TEMP_C)
}

/// Fetch day and night statistics concurrently and derive a reading.
///
/// A failed fetch is treated as an empty batch.
pub async fn fetch_temperatures(
    db: &Postgrest,
    coord: Coordinate,
    depth: SampleDepth,
    rng: &mut impl Rng,
) -> TemperatureReading {
    let limit = depth.limit();
    let (day, night) = futures::join!(
        queries::band_statistics(db, coord, DAY_BAND, limit),
        queries::band_statistics(db, coord, NIGHT_BAND, limit),
    );

    let day = day.unwrap_or_else(|e| {
        tracing::warn!("Day statistics unavailable for {:?}: {}", coord, e);
        Vec::new()
    });
    let night = night.unwrap_or_else(|e| {
        tracing::warn!("Night statistics unavailable for {:?}: {}", coord, e);
        Vec::new()
    });

    let reading = TemperatureReading::new(
        derive_temperature(&day, TimeOfDay::Day, rng),
        derive_temperature(&night, TimeOfDay::Night, rng),
    );
    tracing::debug!(
        "Temperatures at ({}, {}): day {}°C, night {}°C ({} / {} samples)",
        coord.latitude,
        coord.longitude,
        reading.day_temp_c,
        reading.night_temp_c,
        day.len(),
        night.len()
    );
    reading
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn record(mean: f64, min: f64, max: f64) -> StatisticRecord {
        serde_json::from_value(json!({
            "value_mean": mean,
            "value_min": min,
            "value_max": max
        }))
        .unwrap()
    }

    #[test]
    fn test_kelvin_to_celsius() {
        assert_eq!(kelvin_to_celsius(308.68), 36.0);
        assert_eq!(kelvin_to_celsius(273.15), 0.0);
        assert_eq!(kelvin_to_celsius(250.0), -23.0);
    }

    #[test]
    fn test_day_weighting() {
        let samples = [record(300.0, 290.0, 310.0), record(302.0, 291.0, 312.0)];
        let mut rng = StdRng::seed_from_u64(1);
        // max_c = [37, 39] → 38; mean_c = [27, 29] → 28; 0.7*38 + 0.3*28 = 35
        assert_eq!(derive_temperature(&samples, TimeOfDay::Day, &mut rng), 35);
    }

    #[test]
    fn test_night_weighting() {
        let samples = [record(290.0, 280.0, 300.0)];
        let mut rng = StdRng::seed_from_u64(1);
        // min_c = 7, mean_c = 17 → 0.7*7 + 0.3*17 = 10
        assert_eq!(derive_temperature(&samples, TimeOfDay::Night, &mut rng), 10);
    }

    #[test]
    fn test_empty_batch_uses_random_ranges() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let day = derive_temperature(&[], TimeOfDay::Day, &mut rng);
            assert!(DAY_FALLBACK_C.contains(&day), "day {}", day);
            let night = derive_temperature(&[], TimeOfDay::Night, &mut rng);
            assert!(NIGHT_FALLBACK_C.contains(&night), "night {}", night);
        }
    }

    #[test]
    fn test_zero_and_missing_statistics_are_unusable() {
        let samples: Vec<StatisticRecord> = vec![
            record(0.0, 280.0, 300.0),
            serde_json::from_value(json!({"value_mean": 300.0, "value_min": null, "value_max": 310.0}))
                .unwrap(),
            serde_json::from_value(json!({"value_mean": "abc", "value_min": 280.0, "value_max": 310.0}))
                .unwrap(),
        ];
        let mut rng = StdRng::seed_from_u64(7);
        let day = derive_temperature(&samples, TimeOfDay::Day, &mut rng);
        assert!(DAY_FALLBACK_C.contains(&day));
    }

    #[test]
    fn test_string_statistics_are_accepted() {
        let samples: Vec<StatisticRecord> = vec![serde_json::from_value(json!({
            "value_mean": "300", "value_min": "290", "value_max": "310"
        }))
        .unwrap()];
        let mut rng = StdRng::seed_from_u64(7);
        // max_c = 37, mean_c = 27 → 25.9 + 8.1 = 34
        assert_eq!(derive_temperature(&samples, TimeOfDay::Day, &mut rng), 34);
    }

    #[test]
    fn test_result_is_clamped() {
        let mut rng = StdRng::seed_from_u64(3);
        let hot = [record(400.0, 390.0, 410.0)];
        assert_eq!(derive_temperature(&hot, TimeOfDay::Day, &mut rng), MAX_TEMP_C);
        let cold = [record(150.0, 140.0, 160.0)];
        assert_eq!(derive_temperature(&cold, TimeOfDay::Night, &mut rng), MIN_TEMP_C);
    }

    #[test]
    fn test_reading_average_rounds_half_up() {
        assert_eq!(TemperatureReading::new(35, 20).avg_temp_c, 28);
        assert_eq!(TemperatureReading::new(22, 12).avg_temp_c, 17);
        assert_eq!(TemperatureReading::new(-3, -2).avg_temp_c, -2);
    }

    #[test]
    fn test_sample_depth_limits() {
        assert_eq!(SampleDepth::Enhanced.limit(), 20);
        assert_eq!(SampleDepth::Legacy.limit(), 10);
    }

    #[tokio::test]
    async fn test_fetch_temperatures_queries_both_bands() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/lst_statistics"))
            .and(query_param("band", "eq.LST_Day_1km"))
            .and(query_param("limit", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"value_mean": 300.0, "value_min": 290.0, "value_max": 310.0},
                {"value_mean": 302.0, "value_min": 291.0, "value_max": 312.0}
            ])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/lst_statistics"))
            .and(query_param("band", "eq.LST_Night_1km"))
            .and(query_param("limit", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"value_mean": 290.0, "value_min": 280.0, "value_max": 300.0}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let db = Postgrest::new(&server.uri());
        let mut rng = StdRng::seed_from_u64(0);
        let reading = fetch_temperatures(
            &db,
            Coordinate::new(40.0, -100.0),
            SampleDepth::Enhanced,
            &mut rng,
        )
        .await;

        assert_eq!(reading, TemperatureReading::new(35, 10));
        assert_eq!(reading.avg_temp_c, 23);
    }

    #[tokio::test]
    async fn test_fetch_temperatures_failed_band_is_random() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/lst_statistics"))
            .and(query_param("band", "eq.LST_Day_1km"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"value_mean": 300.0, "value_min": 290.0, "value_max": 310.0}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/lst_statistics"))
            .and(query_param("band", "eq.LST_Night_1km"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let db = Postgrest::new(&server.uri());
        let mut rng = StdRng::seed_from_u64(9);
        let reading =
            fetch_temperatures(&db, Coordinate::new(1.0, 1.0), SampleDepth::Legacy, &mut rng).await;

        assert_eq!(reading.day_temp_c, 34);
        assert!(NIGHT_FALLBACK_C.contains(&reading.night_temp_c));
    }
}
