use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::{IntoParams, ToSchema};

use crate::db::models::{SearchFilters, LST_DATA_REQUIRED};
use crate::db::{queries, Postgrest};
use crate::errors::{AppError, ErrorResponse};
use crate::helpers::opt_value_to_f64;
use crate::services::ndvi::ndvi_status;

const DEFAULT_RADIUS_DEG: f64 = 0.1;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// `{success, data, count}` envelope.
#[derive(Debug, Serialize, ToSchema)]
pub struct ListResponse {
    pub success: bool,
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Value>,
    /// Number of rows in `data`
    pub count: usize,
}

impl ListResponse {
    fn new(data: Vec<Value>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

/// Envelope for writes: the rows PostgREST echoed plus a confirmation message.
#[derive(Debug, Serialize, ToSchema)]
pub struct MutationResponse {
    pub success: bool,
    #[schema(value_type = Object)]
    pub data: Value,
    pub message: String,
}

impl MutationResponse {
    fn new(data: Value, message: &str) -> Self {
        Self {
            success: true,
            data,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LocationEcho {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LocationResponse {
    pub success: bool,
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Value>,
    pub location: LocationEcho,
    /// Half-width of the search square in degrees
    pub radius: f64,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RadiusQuery {
    /// Search half-width in degrees (default 0.1)
    pub radius: Option<f64>,
}

/// Body of the date-range endpoints. Both dates are required.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeRequest {
    #[schema(value_type = Option<String>, example = "2024-01-01")]
    pub start_date: Option<Value>,
    #[schema(value_type = Option<String>, example = "2024-01-31")]
    pub end_date: Option<Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DateRangeResponse {
    pub success: bool,
    #[schema(value_type = Object)]
    pub data: Value,
    pub filters: DateRangeRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

/// Bounding box for `POST /api/lst/temperature-stats`. All four bounds are required.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegionRequest {
    #[schema(value_type = Option<f64>)]
    pub lat_min: Option<Value>,
    #[schema(value_type = Option<f64>)]
    pub lat_max: Option<Value>,
    #[schema(value_type = Option<f64>)]
    pub lon_min: Option<Value>,
    #[schema(value_type = Option<f64>)]
    pub lon_max: Option<Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegionResponse {
    pub success: bool,
    #[schema(value_type = Object)]
    pub data: Value,
    pub region: RegionRequest,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResponse {
    pub success: bool,
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Value>,
    pub filters: SearchFilters,
    pub count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct StatisticsFilters {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// MODIS band, e.g. `LST_Night_1km`
    pub band: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DataWithStatisticsResponse {
    pub success: bool,
    #[schema(value_type = Object)]
    pub data: Value,
    pub filters: StatisticsFilters,
    pub count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BandResponse {
    pub success: bool,
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Value>,
    pub band: String,
    pub count: usize,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VegetationQuery {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A field counts as present unless it is missing, null, false or an empty string.
fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

fn missing_fields<'a>(body: &Map<String, Value>, required: &[&'a str]) -> Vec<&'a str> {
    required
        .iter()
        .copied()
        .filter(|field| !is_present(body.get(*field)))
        .collect()
}

fn json_len(value: &Value) -> usize {
    value.as_array().map_or(0, Vec::len)
}

/// Render a date value for a PostgREST filter without JSON quoting.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn require_date_range(req: &DateRangeRequest) -> Result<(&Value, &Value), AppError> {
    match (&req.start_date, &req.end_date) {
        (Some(start), Some(end)) if is_present(Some(start)) && is_present(Some(end)) => {
            Ok((start, end))
        }
        _ => Err(AppError::BadRequest(
            "startDate and endDate are required".to_string(),
        )),
    }
}

/// Attach an `ndvi` status object to each vegetation row from its `value_mean`.
fn annotate_ndvi(rows: Vec<Value>) -> Vec<Value> {
    rows.into_iter()
        .map(|mut row| {
            let status = ndvi_status(opt_value_to_f64(row.get("value_mean")).unwrap_or(f64::NAN));
            if let (Some(obj), Ok(status)) = (row.as_object_mut(), serde_json::to_value(status)) {
                obj.insert("ndvi".to_string(), status);
            }
            row
        })
        .collect()
}

// ---------------------------------------------------------------------------
// lst_tr_sf_data
// ---------------------------------------------------------------------------

/// List all LST raster subsets.
#[utoipa::path(
    get,
    path = "/api/lst",
    tag = "LST Data",
    responses(
        (status = 200, description = "All LST subsets", body = ListResponse),
        (status = 500, description = "PostgREST unreachable or failed", body = ErrorResponse),
    )
)]
pub async fn list_lst_data(State(db): State<Postgrest>) -> Result<Json<ListResponse>, AppError> {
    let data = queries::list_lst_data(&db).await?;
    Ok(Json(ListResponse::new(data)))
}

/// Subsets anchored within a square around a coordinate.
#[utoipa::path(
    get,
    path = "/api/lst/location/{lat}/{lon}",
    tag = "LST Data",
    params(
        ("lat" = f64, Path, description = "Latitude (WGS84)"),
        ("lon" = f64, Path, description = "Longitude (WGS84)"),
        RadiusQuery,
    ),
    responses(
        (status = 200, description = "Subsets near the coordinate", body = LocationResponse),
        (status = 500, description = "PostgREST unreachable or failed", body = ErrorResponse),
    )
)]
pub async fn get_lst_data_by_location(
    State(db): State<Postgrest>,
    Path((lat, lon)): Path<(f64, f64)>,
    Query(query): Query<RadiusQuery>,
) -> Result<Json<LocationResponse>, AppError> {
    let radius = query.radius.unwrap_or(DEFAULT_RADIUS_DEG);
    let data = queries::lst_data_by_location(&db, lat, lon, radius).await?;
    Ok(Json(LocationResponse {
        success: true,
        data,
        location: LocationEcho {
            latitude: lat,
            longitude: lon,
        },
        radius,
    }))
}

/// Filter subsets by calendar date via the `filter_lst_by_date` RPC.
#[utoipa::path(
    post,
    path = "/api/lst/filter-by-date",
    tag = "LST Data",
    request_body = DateRangeRequest,
    responses(
        (status = 200, description = "Subsets in the date range", body = DateRangeResponse),
        (status = 400, description = "startDate or endDate missing", body = ErrorResponse),
    )
)]
pub async fn filter_lst_by_date(
    State(db): State<Postgrest>,
    Json(req): Json<DateRangeRequest>,
) -> Result<Json<DateRangeResponse>, AppError> {
    let (start, end) = require_date_range(&req)?;
    let data = queries::filter_lst_by_date(&db, start, end).await?;
    Ok(Json(DateRangeResponse {
        success: true,
        data,
        filters: req,
        count: None,
    }))
}

/// Aggregate temperature statistics for a bounding box.
#[utoipa::path(
    post,
    path = "/api/lst/temperature-stats",
    tag = "LST Data",
    request_body = RegionRequest,
    responses(
        (status = 200, description = "Temperature statistics for the region", body = RegionResponse),
        (status = 400, description = "A bound is missing", body = ErrorResponse),
    )
)]
pub async fn get_temperature_stats(
    State(db): State<Postgrest>,
    Json(req): Json<RegionRequest>,
) -> Result<Json<RegionResponse>, AppError> {
    let (Some(lat_min), Some(lat_max), Some(lon_min), Some(lon_max)) =
        (&req.lat_min, &req.lat_max, &req.lon_min, &req.lon_max)
    else {
        return Err(AppError::BadRequest(
            "latMin, latMax, lonMin, lonMax are required".to_string(),
        ));
    };
    if ![lat_min, lat_max, lon_min, lon_max]
        .into_iter()
        .all(|v| is_present(Some(v)))
    {
        return Err(AppError::BadRequest(
            "latMin, latMax, lonMin, lonMax are required".to_string(),
        ));
    }

    let data = queries::temperature_stats(&db, lat_min, lat_max, lon_min, lon_max).await?;
    Ok(Json(RegionResponse {
        success: true,
        data,
        region: req,
    }))
}

/// Create a subset row.
#[utoipa::path(
    post,
    path = "/api/lst",
    tag = "LST Data",
    request_body(content = Object, description = "lst_tr_sf_data row"),
    responses(
        (status = 201, description = "Row created", body = MutationResponse),
        (status = 400, description = "Required fields missing or duplicate row", body = ErrorResponse),
    )
)]
pub async fn create_lst_data(
    State(db): State<Postgrest>,
    Json(body): Json<Map<String, Value>>,
) -> Result<(StatusCode, Json<MutationResponse>), AppError> {
    let missing = missing_fields(&body, &LST_DATA_REQUIRED);
    if !missing.is_empty() {
        return Err(AppError::BadRequest(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    let data = queries::insert_lst_data(&db, &body).await?;
    tracing::info!("Created LST subset for band {:?}", body.get("band"));
    Ok((
        StatusCode::CREATED,
        Json(MutationResponse::new(data, "LST data created successfully")),
    ))
}

/// Update a subset row.
#[utoipa::path(
    put,
    path = "/api/lst/{id}",
    tag = "LST Data",
    params(("id" = String, Path, description = "Row id")),
    request_body(content = Object, description = "Columns to change"),
    responses(
        (status = 200, description = "Row updated", body = MutationResponse),
        (status = 400, description = "Invalid id or column value", body = ErrorResponse),
    )
)]
pub async fn update_lst_data(
    State(db): State<Postgrest>,
    Path(id): Path<String>,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<MutationResponse>, AppError> {
    let data = queries::update_lst_data(&db, &id, body).await?;
    Ok(Json(MutationResponse::new(data, "LST data updated successfully")))
}

/// Delete a subset row.
#[utoipa::path(
    delete,
    path = "/api/lst/{id}",
    tag = "LST Data",
    params(("id" = String, Path, description = "Row id")),
    responses(
        (status = 200, description = "Row deleted", body = MessageResponse),
        (status = 400, description = "Invalid id", body = ErrorResponse),
    )
)]
pub async fn delete_lst_data(
    State(db): State<Postgrest>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    queries::delete_lst_data(&db, &id).await?;
    tracing::info!("Deleted LST subset {}", id);
    Ok(Json(MessageResponse {
        success: true,
        message: "LST data deleted successfully".to_string(),
    }))
}

/// Search subsets by band, date range and bounding box.
#[utoipa::path(
    get,
    path = "/api/lst/search",
    tag = "LST Data",
    params(SearchFilters),
    responses(
        (status = 200, description = "Matching subsets", body = SearchResponse),
    )
)]
pub async fn search_lst_data(
    State(db): State<Postgrest>,
    Query(filters): Query<SearchFilters>,
) -> Result<Json<SearchResponse>, AppError> {
    let data = queries::search_lst_data(&db, &filters).await?;
    Ok(Json(SearchResponse {
        success: true,
        count: data.len(),
        data,
        filters,
    }))
}

// ---------------------------------------------------------------------------
// lst_statistics
// ---------------------------------------------------------------------------

/// Bulk-insert statistics rows via the `insert_lst_statistics` RPC.
#[utoipa::path(
    post,
    path = "/api/lst/statistics",
    tag = "LST Statistics",
    request_body(content = Object, description = "{ statistics: [...] }"),
    responses(
        (status = 201, description = "Statistics stored", body = MutationResponse),
        (status = 400, description = "Body has no statistics array", body = ErrorResponse),
    )
)]
pub async fn create_lst_statistics(
    State(db): State<Postgrest>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<MutationResponse>), AppError> {
    if !body.get("statistics").is_some_and(Value::is_array) {
        return Err(AppError::BadRequest(
            "Invalid statistics data format. Expected { statistics: [...] }".to_string(),
        ));
    }

    let data = queries::insert_lst_statistics(&db, &body).await?;
    tracing::info!(
        "Inserted {} LST statistics rows",
        body.get("statistics").map_or(0, json_len)
    );
    Ok((
        StatusCode::CREATED,
        Json(MutationResponse::new(data, "LST statistics created successfully")),
    ))
}

/// List all statistics rows.
#[utoipa::path(
    get,
    path = "/api/lst/statistics",
    tag = "LST Statistics",
    responses(
        (status = 200, description = "All statistics rows", body = ListResponse),
    )
)]
pub async fn list_lst_statistics(
    State(db): State<Postgrest>,
) -> Result<Json<ListResponse>, AppError> {
    let data = queries::list_lst_statistics(&db).await?;
    Ok(Json(ListResponse::new(data)))
}

/// Subsets joined with their statistics.
#[utoipa::path(
    get,
    path = "/api/lst/data-with-statistics",
    tag = "LST Statistics",
    params(StatisticsFilters),
    responses(
        (status = 200, description = "Subsets with statistics", body = DataWithStatisticsResponse),
    )
)]
pub async fn get_lst_data_with_statistics(
    State(db): State<Postgrest>,
    Query(filters): Query<StatisticsFilters>,
) -> Result<Json<DataWithStatisticsResponse>, AppError> {
    let data = queries::lst_data_with_statistics(
        &db,
        filters.latitude,
        filters.longitude,
        filters.band.as_deref(),
    )
    .await?;
    Ok(Json(DataWithStatisticsResponse {
        success: true,
        count: json_len(&data),
        data,
        filters,
    }))
}

/// Statistics rows for one band.
#[utoipa::path(
    get,
    path = "/api/lst/statistics/band/{band}",
    tag = "LST Statistics",
    params(("band" = String, Path, description = "MODIS band, e.g. LST_Day_1km")),
    responses(
        (status = 200, description = "Statistics for the band", body = BandResponse),
    )
)]
pub async fn get_statistics_by_band(
    State(db): State<Postgrest>,
    Path(band): Path<String>,
) -> Result<Json<BandResponse>, AppError> {
    let data = queries::statistics_by_band(&db, &band).await?;
    Ok(Json(BandResponse {
        success: true,
        count: data.len(),
        data,
        band,
    }))
}

/// Statistics rows within a calendar-date range.
#[utoipa::path(
    post,
    path = "/api/lst/statistics/date-range",
    tag = "LST Statistics",
    request_body = DateRangeRequest,
    responses(
        (status = 200, description = "Statistics in the range", body = DateRangeResponse),
        (status = 400, description = "startDate or endDate missing", body = ErrorResponse),
    )
)]
pub async fn get_statistics_by_date_range(
    State(db): State<Postgrest>,
    Json(req): Json<DateRangeRequest>,
) -> Result<Json<DateRangeResponse>, AppError> {
    let (start, end) = require_date_range(&req)?;
    let data = queries::statistics_by_date_range(&db, &value_text(start), &value_text(end)).await?;
    Ok(Json(DateRangeResponse {
        success: true,
        count: Some(data.len()),
        data: Value::Array(data),
        filters: req,
    }))
}

/// Vegetation-index rows with an NDVI health status per row.
#[utoipa::path(
    get,
    path = "/api/lst/vegetation",
    tag = "LST Statistics",
    params(VegetationQuery),
    responses(
        (status = 200, description = "Vegetation rows annotated with `ndvi`", body = ListResponse),
    )
)]
pub async fn get_vegetation(
    State(db): State<Postgrest>,
    Query(query): Query<VegetationQuery>,
) -> Result<Json<ListResponse>, AppError> {
    let rows = queries::vegetation_with_statistics(&db, query.latitude, query.longitude).await?;
    Ok(Json(ListResponse::new(annotate_ndvi(rows))))
}
