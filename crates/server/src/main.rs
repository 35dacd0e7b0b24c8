use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use server_api::{create_food, delete_food, list_foods, update_food, ApiContext};
use shared::{
    domain::{FoodId, FoodItem},
    error::{ApiError, ErrorCode},
    protocol::{CreateFoodRequest, UpdateFoodRequest},
};
use storage::Storage;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;

use app_state::AppState;
use config::{load_settings, normalize_database_url};

const MAX_BODY_BYTES: usize = 64 * 1024;

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = load_settings();
    let database_url = normalize_database_url(&settings.database_url);
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;
    if settings.seed_menu {
        storage.seed_default_menu_if_empty().await?;
    }

    let state = AppState {
        api: ApiContext { storage },
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "food api listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/foods", get(http_list_foods).post(http_create_food))
        .route("/foods/:food_id", put(http_update_food).delete(http_delete_food))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn healthz(State(state): State<Arc<AppState>>) -> ApiResult<&'static str> {
    state.api.storage.health_check().await.map_err(|e| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiError::new(ErrorCode::Internal, e.to_string())),
        )
    })?;
    Ok("ok")
}

async fn http_list_foods(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<FoodItem>>> {
    let foods = list_foods(&state.api).await.map_err(into_response_error)?;
    Ok(Json(foods))
}

async fn http_create_food(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateFoodRequest>,
) -> ApiResult<(StatusCode, Json<FoodItem>)> {
    let food = create_food(&state.api, req)
        .await
        .map_err(into_response_error)?;
    Ok((StatusCode::CREATED, Json(food)))
}

async fn http_update_food(
    State(state): State<Arc<AppState>>,
    Path(food_id): Path<i64>,
    Json(req): Json<UpdateFoodRequest>,
) -> ApiResult<Json<FoodItem>> {
    let food = update_food(&state.api, FoodId(food_id), req)
        .await
        .map_err(into_response_error)?;
    Ok(Json(food))
}

async fn http_delete_food(
    State(state): State<Arc<AppState>>,
    Path(food_id): Path<i64>,
) -> ApiResult<StatusCode> {
    delete_food(&state.api, FoodId(food_id))
        .await
        .map_err(into_response_error)?;
    Ok(StatusCode::NO_CONTENT)
}

fn into_response_error(err: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match err.code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!(message = %err.message, "food api request failed");
    }
    (status, Json(err))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
