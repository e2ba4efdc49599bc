use axum::extract::{Path, Query, State};
use axum::Json;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::errors::{AppError, ErrorResponse};
use crate::services::area::{Area, LocationData};
use crate::services::classifier::{self, Classification, SoilType};
use crate::services::farming::{self, Crop, FarmArea, CROPS, FARM_AREAS};
use crate::services::geocoding::GeocodedPlace;
use crate::services::geometry::Coordinate;
use crate::services::ndvi::{ndvi_status, NdviStatus};
use crate::services::quiz::{self, QuizQuestion};
use crate::services::selection::LocationService;
use crate::services::temperature::{SampleDepth, MAX_TEMP_C, MIN_TEMP_C};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CoordinateQuery {
    /// Latitude in degrees, -90..=90
    pub latitude: f64,
    /// Longitude in degrees, -180..=180
    pub longitude: f64,
}

impl CoordinateQuery {
    fn coordinate(&self) -> Result<Coordinate, AppError> {
        let coord = Coordinate::new(self.latitude, self.longitude);
        if coord.is_valid() {
            Ok(coord)
        } else {
            Err(AppError::BadRequest(format!(
                "Invalid coordinate ({}, {}): latitude must be within [-90, 90] and longitude within [-180, 180]",
                self.latitude, self.longitude
            )))
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AreasQuery {
    /// Name areas with the online geocoders instead of the offline classifier
    #[serde(default)]
    pub resolve_names: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NdviQuery {
    /// NDVI value, nominally -1..=1
    pub value: f64,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CropQuery {
    /// Only crops tolerating this temperature (°C)
    pub temperature: Option<i32>,
    /// Only crops requiring this soil, e.g. "Clay-rich"
    #[param(value_type = Option<String>)]
    pub soil: Option<SoilType>,
}

// ---------------------------------------------------------------------------
// Locations
// ---------------------------------------------------------------------------

/// Pick a random measured location. Falls back to a well-known city when the
/// statistics store is empty or unreachable.
#[utoipa::path(
    get,
    path = "/api/game/random-location",
    tag = "Game",
    responses(
        (status = 200, description = "A location to guess", body = LocationData),
    )
)]
pub async fn get_random_location(State(locations): State<LocationService>) -> Json<LocationData> {
    let mut rng = StdRng::from_entropy();
    Json(locations.pick_random_area(&mut rng).await)
}

/// Measure and classify an arbitrary coordinate.
#[utoipa::path(
    get,
    path = "/api/game/location",
    tag = "Game",
    params(CoordinateQuery),
    responses(
        (status = 200, description = "Location data for the coordinate", body = LocationData),
        (status = 400, description = "Coordinate out of range", body = ErrorResponse),
    )
)]
pub async fn get_location(
    State(locations): State<LocationService>,
    Query(query): Query<CoordinateQuery>,
) -> Result<Json<LocationData>, AppError> {
    let coord = query.coordinate()?;
    let mut rng = StdRng::from_entropy();
    let location = locations
        .location_for_coordinates(coord, SampleDepth::Legacy, &mut rng)
        .await;
    Ok(Json(location))
}

/// All distinct measured areas, unmeasured (temperatures are 0).
#[utoipa::path(
    get,
    path = "/api/game/areas",
    tag = "Game",
    params(AreasQuery),
    responses(
        (status = 200, description = "Selectable areas", body = Vec<Area>),
    )
)]
pub async fn list_areas(
    State(locations): State<LocationService>,
    Query(query): Query<AreasQuery>,
) -> Json<Vec<Area>> {
    Json(locations.available_areas(query.resolve_names).await)
}

/// Measure a selected area.
#[utoipa::path(
    post,
    path = "/api/game/areas/location",
    tag = "Game",
    request_body = Area,
    responses(
        (status = 200, description = "Location data with the area's temperatures filled in", body = LocationData),
        (status = 400, description = "Area coordinate out of range", body = ErrorResponse),
    )
)]
pub async fn get_area_location(
    State(locations): State<LocationService>,
    Json(area): Json<Area>,
) -> Result<Json<LocationData>, AppError> {
    if !area.coordinate().is_valid() {
        return Err(AppError::BadRequest(format!(
            "Area {} has an invalid coordinate",
            area.id
        )));
    }
    let mut rng = StdRng::from_entropy();
    Ok(Json(locations.location_for_area(area, &mut rng).await))
}

/// Offline classification: name, climate zone, soil type and continent.
#[utoipa::path(
    get,
    path = "/api/game/classify",
    tag = "Game",
    params(CoordinateQuery),
    responses(
        (status = 200, description = "Classification of the coordinate", body = Classification),
        (status = 400, description = "Coordinate out of range", body = ErrorResponse),
    )
)]
pub async fn classify(Query(query): Query<CoordinateQuery>) -> Result<Json<Classification>, AppError> {
    Ok(Json(classifier::classify(query.coordinate()?)))
}

/// Reverse-geocode a coordinate through the provider chain.
#[utoipa::path(
    get,
    path = "/api/game/geocode",
    tag = "Game",
    params(CoordinateQuery),
    responses(
        (status = 200, description = "Place name; `source` is `fallback` when every provider failed", body = GeocodedPlace),
        (status = 400, description = "Coordinate out of range", body = ErrorResponse),
    )
)]
pub async fn reverse_geocode(
    State(locations): State<LocationService>,
    Query(query): Query<CoordinateQuery>,
) -> Result<Json<GeocodedPlace>, AppError> {
    let coord = query.coordinate()?;
    Ok(Json(locations.geocoder().reverse_geocode(coord).await))
}

// ---------------------------------------------------------------------------
// Farming
// ---------------------------------------------------------------------------

/// Vegetation health for an NDVI value.
#[utoipa::path(
    get,
    path = "/api/game/ndvi",
    tag = "Farming",
    params(NdviQuery),
    responses(
        (status = 200, description = "NDVI status", body = NdviStatus),
    )
)]
pub async fn get_ndvi_status(Query(query): Query<NdviQuery>) -> Json<NdviStatus> {
    Json(ndvi_status(query.value))
}

/// Crop catalogue, optionally narrowed by temperature and soil.
#[utoipa::path(
    get,
    path = "/api/game/crops",
    tag = "Farming",
    params(CropQuery),
    responses(
        (status = 200, description = "Matching crops", body = Vec<Crop>),
    )
)]
pub async fn list_crops(Query(query): Query<CropQuery>) -> Json<Vec<Crop>> {
    let crops = match (query.temperature, query.soil) {
        (Some(temp), Some(soil)) => farming::suitable_crops(temp, soil),
        (temp, soil) => CROPS
            .iter()
            .filter(|c| temp.map_or(true, |t| c.tolerates(t)))
            .filter(|c| soil.map_or(true, |s| c.soil_requirement == s))
            .collect(),
    };
    Json(crops.into_iter().cloned().collect())
}

/// The hand-made starter areas.
#[utoipa::path(
    get,
    path = "/api/game/starter-areas",
    tag = "Farming",
    responses(
        (status = 200, description = "Starter areas", body = Vec<FarmArea>),
    )
)]
pub async fn list_starter_areas() -> Json<Vec<FarmArea>> {
    Json(FARM_AREAS.to_vec())
}

/// The fixed quiz question for a starter area.
#[utoipa::path(
    get,
    path = "/api/game/starter-areas/{id}/quiz",
    tag = "Farming",
    params(("id" = u32, Path, description = "Starter area id (1-4)")),
    responses(
        (status = 200, description = "Quiz question", body = QuizQuestion),
        (status = 404, description = "No such starter area", body = ErrorResponse),
    )
)]
pub async fn get_starter_quiz(Path(id): Path<u32>) -> Result<Json<QuizQuestion>, AppError> {
    let area = farming::farm_area(id)
        .ok_or_else(|| AppError::NotFound(format!("Starter area {} not found", id)))?;
    quiz::starter_question(area.id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No quiz question for {}", area.name)))
}

/// Generate a quiz question about a resolved location.
#[utoipa::path(
    post,
    path = "/api/game/quiz",
    tag = "Farming",
    request_body = LocationData,
    responses(
        (status = 200, description = "Generated quiz question", body = QuizQuestion),
        (status = 400, description = "Temperature out of range", body = ErrorResponse),
    )
)]
pub async fn generate_quiz(
    Json(location): Json<LocationData>,
) -> Result<Json<QuizQuestion>, AppError> {
    for (field, value) in [("dayTemp", location.day_temp), ("nightTemp", location.night_temp)] {
        if !(MIN_TEMP_C..=MAX_TEMP_C).contains(&value) {
            return Err(AppError::BadRequest(format!(
                "{} must be between {} and {}°C",
                field, MIN_TEMP_C, MAX_TEMP_C
            )));
        }
    }
    let mut rng = StdRng::from_entropy();
    Ok(Json(quiz::generate_climate_quiz(&location, &mut rng)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Postgrest;
    use crate::services::geocoding::{GeocodeSource, Geocoder};
    use crate::services::area::build_location_data;
    use crate::services::selection::FALLBACK_LOCATIONS;
    use crate::services::temperature::TemperatureReading;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use std::time::Duration;

    fn offline_service() -> LocationService {
        let geocoder = Geocoder::new(
            "http://127.0.0.1:9",
            "http://127.0.0.1:9",
            "http://127.0.0.1:9",
            "climate-farm-test",
        )
        .with_timeout(Duration::from_millis(200))
        .with_retries(0)
        .with_pacing(Duration::ZERO);
        LocationService::new(Postgrest::new("http://127.0.0.1:9"), geocoder, None)
    }

    #[test]
    fn test_coordinate_validation() {
        let ok = CoordinateQuery {
            latitude: 48.8566,
            longitude: 2.3522,
        };
        assert!(ok.coordinate().is_ok());

        let bad = CoordinateQuery {
            latitude: 91.0,
            longitude: 0.0,
        };
        let err = bad.coordinate().unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_random_location_offline_uses_static_city() {
        let Json(loc) = get_random_location(State(offline_service())).await;
        assert!(FALLBACK_LOCATIONS
            .iter()
            .any(|&(lat, lon, day, night)| loc.latitude == lat
                && loc.longitude == lon
                && loc.day_temp == day
                && loc.night_temp == night));
    }

    #[tokio::test]
    async fn test_areas_offline_uses_fallback_list() {
        let Json(areas) = list_areas(
            State(offline_service()),
            Query(AreasQuery {
                resolve_names: false,
            }),
        )
        .await;
        assert_eq!(areas.len(), 15);
    }

    #[tokio::test]
    async fn test_geocode_offline_uses_fallback() {
        let Json(place) = reverse_geocode(
            State(offline_service()),
            Query(CoordinateQuery {
                latitude: 48.8566,
                longitude: 2.3522,
            }),
        )
        .await
        .unwrap();
        assert_eq!(place.source, GeocodeSource::Fallback);
        assert!(!place.full_name.is_empty());
    }

    #[tokio::test]
    async fn test_classify() {
        let Json(c) = classify(Query(CoordinateQuery {
            latitude: 48.8566,
            longitude: 2.3522,
        }))
        .await
        .unwrap();
        assert_eq!(c.name, "Paris");
        assert_eq!(c.soil_type, SoilType::Rocky);
    }

    #[tokio::test]
    async fn test_crop_filters() {
        let Json(all) = list_crops(Query(CropQuery {
            temperature: None,
            soil: None,
        }))
        .await;
        assert_eq!(all.len(), 6);

        let Json(sandy) = list_crops(Query(CropQuery {
            temperature: None,
            soil: Some(SoilType::Sandy),
        }))
        .await;
        assert_eq!(sandy.len(), 2);

        let Json(exact) = list_crops(Query(CropQuery {
            temperature: Some(8),
            soil: Some(SoilType::ClayRich),
        }))
        .await;
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].name, "European Wheat");
    }

    #[tokio::test]
    async fn test_starter_quiz_not_found() {
        assert!(get_starter_quiz(Path(2)).await.is_ok());
        let err = get_starter_quiz(Path(7)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_generate_quiz_rejects_out_of_range_temperatures() {
        let mut rng = StdRng::seed_from_u64(3);
        let location = build_location_data(
            Coordinate::new(48.8566, 2.3522),
            TemperatureReading::new(20, 10),
            15,
            None,
            &mut rng,
        );
        let Json(q) = generate_quiz(Json(location.clone())).await.unwrap();
        assert_eq!(q.options.len(), 4);

        let mut hot = location.clone();
        hot.day_temp = i32::MAX;
        let err = generate_quiz(Json(hot)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        let mut cold = location;
        cold.night_temp = MIN_TEMP_C - 1;
        let err = generate_quiz(Json(cold)).await.unwrap_err();
        assert!(err.to_string().contains("nightTemp"));
    }
}
