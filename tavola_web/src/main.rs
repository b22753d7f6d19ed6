use std::{error::Error, net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tavola::{
    domain::{
        core::{
            search, Restaurant, RestaurantDraft, RestaurantId, RestaurantPatch,
            RestaurantRepository, SearchCriteria,
        },
        reserve::{reserve, ReservationRequest, ReserveError},
        DataAccessError, Entity, ValidationError,
    },
    infrastructure::core::InMemoryRestaurantRepository,
    TavolaConfig,
};
use tokio::sync::RwLock;
use tracing::{error, info};

type SharedStore = Arc<RwLock<InMemoryRestaurantRepository>>;

#[tokio::main]
async fn main() {
    match TavolaConfig::load() {
        Ok(config) => {
            tracing_subscriber::fmt()
                .with_max_level(tracing::Level::from(&config.logger.level))
                .init();
            if let Err(error) = serve(&config).await {
                error!("Application error: {}", error);
            }
        }
        Err(error) => {
            tracing_subscriber::fmt::init();
            error!("Application error: {}", error)
        }
    }
}

async fn serve(config: &TavolaConfig) -> Result<(), Box<dyn Error>> {
    let store: SharedStore = Arc::new(RwLock::new(InMemoryRestaurantRepository::seeded()));
    let app = router(store);
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

fn router(store: SharedStore) -> Router {
    Router::new()
        .route(
            "/restaurants",
            get(search_restaurants).post(create_restaurant),
        )
        .route(
            "/restaurants/:id",
            get(fetch_restaurant)
                .put(update_restaurant)
                .delete(delete_restaurant),
        )
        .route("/reservations", post(create_reservation))
        .with_state(store)
}

async fn search_restaurants(
    State(store): State<SharedStore>,
    Query(criteria): Query<SearchCriteria>,
) -> Result<Json<Vec<Restaurant>>, ApiError> {
    let store = store.read().await;
    let collection = store.list().await?;
    let found = search(&collection, &criteria)?;
    Ok(Json(found))
}

async fn fetch_restaurant(
    State(store): State<SharedStore>,
    Path(id): Path<u64>,
) -> Result<Json<Restaurant>, ApiError> {
    let store = store.read().await;
    let restaurant = store
        .find_by_id(RestaurantId::from(id))
        .await?
        .ok_or_else(|| ApiError::not_found(id))?;
    Ok(Json(restaurant))
}

async fn create_restaurant(
    State(store): State<SharedStore>,
    Json(draft): Json<RestaurantDraft>,
) -> Result<(StatusCode, Json<Restaurant>), ApiError> {
    let mut store = store.write().await;
    let id = store.next_id().await?;
    let restaurant = Restaurant::create(id, draft)?;
    store.save(&restaurant).await?;
    info!("Created restaurant {}", restaurant.id());
    Ok((StatusCode::CREATED, Json(restaurant)))
}

async fn update_restaurant(
    State(store): State<SharedStore>,
    Path(id): Path<u64>,
    Json(patch): Json<RestaurantPatch>,
) -> Result<Json<Restaurant>, ApiError> {
    let mut store = store.write().await;
    let mut restaurant = store
        .find_by_id(RestaurantId::from(id))
        .await?
        .ok_or_else(|| ApiError::not_found(id))?;
    restaurant.apply_patch(patch)?;
    store.save(&restaurant).await?;
    Ok(Json(restaurant))
}

async fn delete_restaurant(
    State(store): State<SharedStore>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    let mut store = store.write().await;
    if !store.delete(RestaurantId::from(id)).await? {
        return Err(ApiError::not_found(id));
    }
    info!("Deleted restaurant {}", id);
    Ok(StatusCode::NO_CONTENT)
}

async fn create_reservation(
    State(store): State<SharedStore>,
    Json(request): Json<ReservationRequest>,
) -> Result<Json<Restaurant>, ApiError> {
    let mut store = store.write().await;
    let restaurant = reserve(&mut *store, request).await?;
    info!(
        "Reserved {} guests at restaurant {}",
        restaurant.curr_guests(),
        restaurant.id()
    );
    Ok(Json(restaurant))
}

/// Transport-side rendering of the core's failure kinds. The mapping to
/// status codes lives only here.
enum ApiError {
    Validation(String),
    NotFound(String),
    Conflict(String),
    Internal,
}

impl ApiError {
    fn not_found(id: u64) -> Self {
        ApiError::NotFound(format!("Restaurant {} not found", id))
    }
}

impl From<ValidationError> for ApiError {
    fn from(value: ValidationError) -> Self {
        ApiError::Validation(value.to_string())
    }
}

impl From<DataAccessError> for ApiError {
    fn from(value: DataAccessError) -> Self {
        error!("Store access failed: {}", value);
        ApiError::Internal
    }
}

impl From<ReserveError> for ApiError {
    fn from(value: ReserveError) -> Self {
        match value {
            ReserveError::Validation(e) => e.into(),
            ReserveError::RestaurantNotFound(id) => ApiError::not_found(*id),
            ReserveError::Closed | ReserveError::CapacityExceeded { .. } => {
                ApiError::Conflict(value.to_string())
            }
            ReserveError::DataAccess(e) => e.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, message),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_owned(),
            ),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
