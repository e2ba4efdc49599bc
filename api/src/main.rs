// Climate Farm API v0.1
use axum::http::{header, HeaderValue, Method, StatusCode, Uri};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use std::net::SocketAddr;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod db;
mod errors;
mod helpers;
mod routes;
mod services;

use config::AppConfig;
use db::Postgrest;
use errors::ErrorResponse;
use services::geocoding::Geocoder;
use services::selection::LocationService;

/// Climate Farm API: OpenAPI specification.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Climate Farm API",
        version = "0.1.0",
        description = "Backend for an educational climate farming game. \
            Proxies NASA MODIS land surface temperature subsets and statistics \
            stored behind PostgREST, turns statistics into day/night temperatures \
            for random or chosen locations, names and classifies coordinates, and \
            serves crop and quiz data for the farming simulation.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "LST Data", description = "MODIS land surface temperature subsets"),
        (name = "LST Statistics", description = "Per-subset statistics and vegetation data"),
        (name = "Game", description = "Location selection, naming and classification"),
        (name = "Farming", description = "Crops, NDVI status and quiz questions"),
    ),
    paths(
        routes::health::health_check,
        routes::lst::list_lst_data,
        routes::lst::get_lst_data_by_location,
        routes::lst::filter_lst_by_date,
        routes::lst::get_temperature_stats,
        routes::lst::create_lst_data,
        routes::lst::update_lst_data,
        routes::lst::delete_lst_data,
        routes::lst::search_lst_data,
        routes::lst::create_lst_statistics,
        routes::lst::list_lst_statistics,
        routes::lst::get_lst_data_with_statistics,
        routes::lst::get_statistics_by_band,
        routes::lst::get_statistics_by_date_range,
        routes::lst::get_vegetation,
        routes::game::get_random_location,
        routes::game::get_location,
        routes::game::list_areas,
        routes::game::get_area_location,
        routes::game::classify,
        routes::game::reverse_geocode,
        routes::game::get_ndvi_status,
        routes::game::list_crops,
        routes::game::list_starter_areas,
        routes::game::get_starter_quiz,
        routes::game::generate_quiz,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            routes::lst::ListResponse,
            routes::lst::MutationResponse,
            routes::lst::MessageResponse,
            routes::lst::LocationEcho,
            routes::lst::LocationResponse,
            routes::lst::DateRangeRequest,
            routes::lst::DateRangeResponse,
            routes::lst::RegionRequest,
            routes::lst::RegionResponse,
            routes::lst::SearchResponse,
            routes::lst::StatisticsFilters,
            routes::lst::DataWithStatisticsResponse,
            routes::lst::BandResponse,
            db::models::SearchFilters,
            services::area::Area,
            services::area::LocationData,
            services::area::MapData,
            services::area::MapCoordinates,
            services::area::MapLinks,
            services::area::LocationInfo,
            services::classifier::ClimateZone,
            services::classifier::SoilType,
            services::classifier::Classification,
            services::geocoding::GeocodedPlace,
            services::geocoding::GeocodeSource,
            services::geometry::Coordinate,
            services::ndvi::NdviStatus,
            services::ndvi::VegetationState,
            services::farming::Crop,
            services::farming::CropType,
            services::farming::FarmArea,
            services::farming::MapPosition,
            services::quiz::QuizQuestion,
            errors::ErrorResponse,
        )
    )
)]
struct ApiDoc;

async fn route_not_found(uri: Uri) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(format!("Route {} not found", uri))),
    )
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "climate_farm_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let started_at = Instant::now();
    let config = AppConfig::from_env();

    let db = Postgrest::new(&config.postgrest_url);
    let geocoder = Geocoder::from_config(&config);
    let locations = LocationService::new(db.clone(), geocoder, config.google_maps_api_key.clone());
    tracing::info!("Using PostgREST at {}", config.postgrest_url);

    // The browser UI sends credentials, so origins, methods and headers must be explicit
    let cors = CorsLayer::new()
        .allow_origin(
            config
                .cors_origin
                .parse::<HeaderValue>()
                .expect("CORS_ORIGIN must be a valid header value"),
        )
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    let lst_routes = Router::new()
        .route(
            "/",
            get(routes::lst::list_lst_data).post(routes::lst::create_lst_data),
        )
        .route(
            "/location/:lat/:lon",
            get(routes::lst::get_lst_data_by_location),
        )
        .route("/search", get(routes::lst::search_lst_data))
        .route("/filter-by-date", post(routes::lst::filter_lst_by_date))
        .route("/temperature-stats", post(routes::lst::get_temperature_stats))
        .route(
            "/statistics",
            get(routes::lst::list_lst_statistics).post(routes::lst::create_lst_statistics),
        )
        .route(
            "/statistics/band/:band",
            get(routes::lst::get_statistics_by_band),
        )
        .route(
            "/statistics/date-range",
            post(routes::lst::get_statistics_by_date_range),
        )
        .route(
            "/data-with-statistics",
            get(routes::lst::get_lst_data_with_statistics),
        )
        .route("/vegetation", get(routes::lst::get_vegetation))
        .route(
            "/:id",
            put(routes::lst::update_lst_data).delete(routes::lst::delete_lst_data),
        )
        .with_state(db);

    let game_routes = Router::new()
        .route("/random-location", get(routes::game::get_random_location))
        .route("/location", get(routes::game::get_location))
        .route("/areas", get(routes::game::list_areas))
        .route("/areas/location", post(routes::game::get_area_location))
        .route("/classify", get(routes::game::classify))
        .route("/geocode", get(routes::game::reverse_geocode))
        .route("/ndvi", get(routes::game::get_ndvi_status))
        .route("/crops", get(routes::game::list_crops))
        .route("/starter-areas", get(routes::game::list_starter_areas))
        .route(
            "/starter-areas/:id/quiz",
            get(routes::game::get_starter_quiz),
        )
        .route("/quiz", post(routes::game::generate_quiz))
        .with_state(locations);

    let health_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .with_state(started_at);

    let app = Router::new()
        .merge(health_routes)
        .nest("/api/lst", lst_routes)
        .nest("/api/game", game_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(route_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        config.port
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");
    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}
