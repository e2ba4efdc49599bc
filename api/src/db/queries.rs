use serde_json::{json, Map, Value};

use super::models::{CountRow, SearchFilters, StatisticRecord, LST_DATA_COLUMNS};
use super::{fetch_json, send, Postgrest};
use crate::errors::AppError;
use crate::services::geometry::Coordinate;

const LST_DATA: &str = "lst_tr_sf_data";
const LST_STATISTICS: &str = "lst_statistics";

/// Header asking PostgREST to echo written rows.
const RETURN_REPRESENTATION: (&str, &str) = ("Prefer", "return=representation");

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// lst_tr_sf_data
// ---------------------------------------------------------------------------

/// All LST raster subsets.
pub async fn list_lst_data(db: &Postgrest) -> Result<Vec<Value>, AppError> {
    fetch_json(db.get(LST_DATA), "Failed to fetch LST data").await
}

/// Subsets whose anchor lies inside a ±`radius` degree square around the point.
pub async fn lst_data_by_location(
    db: &Postgrest,
    latitude: f64,
    longitude: f64,
    radius: f64,
) -> Result<Vec<Value>, AppError> {
    let request = db.get(LST_DATA).query(&[
        ("latitude", format!("gte.{}", latitude - radius)),
        ("latitude", format!("lte.{}", latitude + radius)),
        ("longitude", format!("gte.{}", longitude - radius)),
        ("longitude", format!("lte.{}", longitude + radius)),
    ]);
    fetch_json(request, "Failed to fetch LST data by location").await
}

pub async fn filter_lst_by_date(
    db: &Postgrest,
    start_date: &Value,
    end_date: &Value,
) -> Result<Value, AppError> {
    let request = db.post("rpc/filter_lst_by_date").json(&json!({
        "start_date": start_date,
        "end_date": end_date,
    }));
    fetch_json(request, "Failed to filter LST data by date").await
}

pub async fn temperature_stats(
    db: &Postgrest,
    lat_min: &Value,
    lat_max: &Value,
    lon_min: &Value,
    lon_max: &Value,
) -> Result<Value, AppError> {
    let request = db.post("rpc/get_temperature_stats").json(&json!({
        "lat_min": lat_min,
        "lat_max": lat_max,
        "lon_min": lon_min,
        "lon_max": lon_max,
    }));
    fetch_json(request, "Failed to get temperature statistics").await
}

/// Insert one subset. Only known columns are forwarded.
pub async fn insert_lst_data(db: &Postgrest, body: &Map<String, Value>) -> Result<Value, AppError> {
    let row: Map<String, Value> = LST_DATA_COLUMNS
        .iter()
        .filter_map(|&col| body.get(col).map(|v| (col.to_string(), v.clone())))
        .collect();

    let request = db
        .post(LST_DATA)
        .header(RETURN_REPRESENTATION.0, RETURN_REPRESENTATION.1)
        .json(&row);
    fetch_json(request, "Failed to insert LST data").await
}

/// Patch a subset by id, stamping `updated_at`.
pub async fn update_lst_data(
    db: &Postgrest,
    id: &str,
    body: Map<String, Value>,
) -> Result<Value, AppError> {
    let mut row = body;
    row.insert(
        "updated_at".to_string(),
        Value::String(chrono::Utc::now().to_rfc3339()),
    );

    let request = db
        .patch(LST_DATA)
        .query(&[("id", format!("eq.{}", id))])
        .header(RETURN_REPRESENTATION.0, RETURN_REPRESENTATION.1)
        .json(&row);
    fetch_json(request, "Failed to update LST data").await
}

pub async fn delete_lst_data(db: &Postgrest, id: &str) -> Result<(), AppError> {
    let request = db.delete(LST_DATA).query(&[("id", format!("eq.{}", id))]);
    send(request, "Failed to delete LST data").await?;
    Ok(())
}

/// Build the PostgREST filter list for a subset search.
pub(crate) fn search_params(filters: &SearchFilters) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();

    if let Some(band) = non_empty(&filters.band) {
        params.push(("band", format!("eq.{}", band)));
    }

    if let (Some(from), Some(to)) = (non_empty(&filters.date_from), non_empty(&filters.date_to)) {
        let contains = json!([{ "calendar_date": { "gte": from, "lte": to } }]);
        params.push(("subset", format!("cs.{}", contains)));
    }

    if let (Some(min), Some(max)) = (non_empty(&filters.min_lat), non_empty(&filters.max_lat)) {
        params.push(("latitude", format!("gte.{}", min)));
        params.push(("latitude", format!("lte.{}", max)));
    }

    if let (Some(min), Some(max)) = (non_empty(&filters.min_lon), non_empty(&filters.max_lon)) {
        params.push(("longitude", format!("gte.{}", min)));
        params.push(("longitude", format!("lte.{}", max)));
    }

    params
}

pub async fn search_lst_data(
    db: &Postgrest,
    filters: &SearchFilters,
) -> Result<Vec<Value>, AppError> {
    let request = db.get(LST_DATA).query(&search_params(filters));
    fetch_json(request, "Failed to search LST data").await
}

// ---------------------------------------------------------------------------
// lst_statistics
// ---------------------------------------------------------------------------

/// Bulk insert through the `insert_lst_statistics` RPC.
pub async fn insert_lst_statistics(db: &Postgrest, payload: &Value) -> Result<Value, AppError> {
    let request = db
        .post("rpc/insert_lst_statistics")
        .json(&json!({ "statistics_json": payload }));
    fetch_json(request, "Failed to insert LST statistics").await
}

pub async fn list_lst_statistics(db: &Postgrest) -> Result<Vec<Value>, AppError> {
    fetch_json(db.get(LST_STATISTICS), "Failed to fetch LST statistics").await
}

/// Subsets joined with their statistics; each filter is optional.
pub async fn lst_data_with_statistics(
    db: &Postgrest,
    latitude: Option<f64>,
    longitude: Option<f64>,
    band: Option<&str>,
) -> Result<Value, AppError> {
    let mut payload = Map::new();
    if let Some(lat) = latitude {
        payload.insert("target_latitude".to_string(), json!(lat));
    }
    if let Some(lon) = longitude {
        payload.insert("target_longitude".to_string(), json!(lon));
    }
    if let Some(band) = band.filter(|b| !b.is_empty()) {
        payload.insert("band_filter".to_string(), json!(band));
    }

    let request = db.post("rpc/get_lst_data_with_statistics").json(&payload);
    fetch_json(request, "Failed to fetch LST data with statistics").await
}

/// Vegetation-index subsets joined with their statistics.
pub async fn vegetation_with_statistics(
    db: &Postgrest,
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<Vec<Value>, AppError> {
    let mut payload = Map::new();
    if let Some(lat) = latitude {
        payload.insert("target_latitude".to_string(), json!(lat));
    }
    if let Some(lon) = longitude {
        payload.insert("target_longitude".to_string(), json!(lon));
    }

    let request = db.post("rpc/get_vgt_data_with_statistics").json(&payload);
    fetch_json(request, "Failed to fetch vegetation data with statistics").await
}

pub async fn statistics_by_band(db: &Postgrest, band: &str) -> Result<Vec<Value>, AppError> {
    let request = db
        .get(LST_STATISTICS)
        .query(&[("band", format!("eq.{}", band))]);
    fetch_json(request, "Failed to fetch statistics by band").await
}

pub async fn statistics_by_date_range(
    db: &Postgrest,
    start_date: &str,
    end_date: &str,
) -> Result<Vec<Value>, AppError> {
    let request = db.get(LST_STATISTICS).query(&[
        ("calendar_date", format!("gte.{}", start_date)),
        ("calendar_date", format!("lte.{}", end_date)),
    ]);
    fetch_json(request, "Failed to fetch statistics by date range").await
}

// ---------------------------------------------------------------------------
// Game queries
// ---------------------------------------------------------------------------

/// `lst_statistics?select=count`.
///
/// `None` when the body is not an array of count rows.
pub async fn statistics_count(db: &Postgrest) -> Result<Option<Vec<CountRow>>, AppError> {
    let request = db.get(LST_STATISTICS).query(&[("select", "count")]);
    let body: Value = fetch_json(request, "Failed to count LST statistics").await?;
    Ok(serde_json::from_value(body).ok())
}

/// A page of statistic rows at the given offset.
pub async fn statistics_batch(
    db: &Postgrest,
    limit: u32,
    offset: u64,
) -> Result<Vec<StatisticRecord>, AppError> {
    let request = db
        .get(LST_STATISTICS)
        .query(&[("limit", limit.to_string()), ("offset", offset.to_string())]);
    fetch_json(request, "Failed to fetch LST statistics batch").await
}

/// Up to `limit` statistic rows for one band at an exact coordinate.
pub async fn band_statistics(
    db: &Postgrest,
    coord: Coordinate,
    band: &str,
    limit: u32,
) -> Result<Vec<StatisticRecord>, AppError> {
    let request = db.get(LST_STATISTICS).query(&[
        ("latitude", format!("eq.{}", coord.latitude)),
        ("longitude", format!("eq.{}", coord.longitude)),
        ("band", format!("eq.{}", band)),
        ("limit", limit.to_string()),
    ]);
    fetch_json(request, "Failed to fetch band statistics").await
}

/// Every statistic row's coordinate and band.
pub async fn statistic_coordinates(db: &Postgrest) -> Result<Vec<StatisticRecord>, AppError> {
    let request = db
        .get(LST_STATISTICS)
        .query(&[("select", "latitude,longitude,band")]);
    fetch_json(request, "Failed to fetch statistic coordinates").await
}
