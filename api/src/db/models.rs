use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::helpers::opt_value_to_f64;
use crate::services::geometry::Coordinate;

/// MODIS daytime land surface temperature band.
pub const DAY_BAND: &str = "LST_Day_1km";
/// MODIS night-time land surface temperature band.
pub const NIGHT_BAND: &str = "LST_Night_1km";

/// A row of `lst_statistics`.
///
/// Statistic columns are kept as raw JSON: rows written through the
/// `insert_lst_statistics` RPC can hold numbers, numeric strings or nulls.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StatisticRecord {
    #[serde(default)]
    pub latitude: Option<Value>,
    #[serde(default)]
    pub longitude: Option<Value>,
    #[serde(default)]
    pub band: Option<String>,
    #[serde(default)]
    pub calendar_date: Option<String>,
    #[serde(default)]
    pub value_mean: Option<Value>,
    #[serde(default)]
    pub value_min: Option<Value>,
    #[serde(default)]
    pub value_max: Option<Value>,
    #[serde(default)]
    pub value_stddev: Option<Value>,
}

impl StatisticRecord {
    /// The record's position, if both components parse and are in range.
    pub fn coordinate(&self) -> Option<Coordinate> {
        let lat = opt_value_to_f64(self.latitude.as_ref())?;
        let lon = opt_value_to_f64(self.longitude.as_ref())?;
        let coord = Coordinate::new(lat, lon);
        coord.is_valid().then_some(coord)
    }

    pub fn mean_kelvin(&self) -> Option<f64> {
        opt_value_to_f64(self.value_mean.as_ref())
    }

    pub fn min_kelvin(&self) -> Option<f64> {
        opt_value_to_f64(self.value_min.as_ref())
    }

    pub fn max_kelvin(&self) -> Option<f64> {
        opt_value_to_f64(self.value_max.as_ref())
    }
}

/// Row returned by `lst_statistics?select=count`.
#[derive(Debug, Clone, Deserialize)]
pub struct CountRow {
    #[serde(default)]
    pub count: Option<Value>,
}

/// Query filters for `GET /api/lst/search`.
///
/// Latitude and longitude bounds only apply when both ends are given.
#[derive(Debug, Clone, Default, Deserialize, Serialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SearchFilters {
    /// MODIS band, e.g. `LST_Day_1km`
    pub band: Option<String>,
    /// Start of the subset calendar-date range (YYYY-MM-DD)
    pub date_from: Option<String>,
    /// End of the subset calendar-date range (YYYY-MM-DD)
    pub date_to: Option<String>,
    pub min_lat: Option<String>,
    pub max_lat: Option<String>,
    pub min_lon: Option<String>,
    pub max_lon: Option<String>,
}

/// Columns of `lst_tr_sf_data` accepted on insert.
pub const LST_DATA_COLUMNS: [&str; 12] = [
    "xllcorner",
    "yllcorner",
    "cellsize",
    "nrows",
    "ncols",
    "band",
    "units",
    "scale",
    "latitude",
    "longitude",
    "header",
    "subset",
];

/// Fields a new `lst_tr_sf_data` row must carry.
pub const LST_DATA_REQUIRED: [&str; 11] = [
    "xllcorner",
    "yllcorner",
    "cellsize",
    "nrows",
    "ncols",
    "band",
    "units",
    "scale",
    "latitude",
    "longitude",
    "subset",
];

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_statistic_record_mixed_types() {
        let rec: StatisticRecord = serde_json::from_value(json!({
            "latitude": "40.7128",
            "longitude": -74.006,
            "band": "LST_Day_1km",
            "value_mean": 300.5,
            "value_min": "290",
            "value_max": null,
            "pixel_count": 1200
        }))
        .unwrap();

        assert_eq!(rec.coordinate(), Some(Coordinate::new(40.7128, -74.006)));
        assert_eq!(rec.mean_kelvin(), Some(300.5));
        assert_eq!(rec.min_kelvin(), Some(290.0));
        assert_eq!(rec.max_kelvin(), None);
    }

    #[test]
    fn test_statistic_record_missing_coordinate() {
        let rec: StatisticRecord = serde_json::from_value(json!({"latitude": 10.0})).unwrap();
        assert!(rec.coordinate().is_none());
    }

    #[test]
    fn test_statistic_record_out_of_range_coordinate() {
        let rec: StatisticRecord =
            serde_json::from_value(json!({"latitude": 123.0, "longitude": 0.0})).unwrap();
        assert!(rec.coordinate().is_none());
    }

    #[test]
    fn test_search_filters_camel_case() {
        let f: SearchFilters = serde_json::from_value(json!({
            "band": "LST_Day_1km",
            "dateFrom": "2024-01-01",
            "minLat": "40"
        }))
        .unwrap();
        assert_eq!(f.band.as_deref(), Some("LST_Day_1km"));
        assert_eq!(f.date_from.as_deref(), Some("2024-01-01"));
        assert_eq!(f.min_lat.as_deref(), Some("40"));
        assert!(f.max_lat.is_none());
    }
}
