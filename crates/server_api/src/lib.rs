use shared::{
    domain::{FoodId, FoodItem},
    error::{ApiError, ErrorCode},
    protocol::{CreateFoodRequest, UpdateFoodRequest},
};
use storage::{NewFood, Storage};
use tracing::{info, warn};

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

pub async fn list_foods(ctx: &ApiContext) -> Result<Vec<FoodItem>, ApiError> {
    ctx.storage.list_foods().await.map_err(internal)
}

pub async fn create_food(
    ctx: &ApiContext,
    request: CreateFoodRequest,
) -> Result<FoodItem, ApiError> {
    let food = NewFood {
        name: request.name,
        description: request.description,
        price: request.price,
        image: request.image,
        available: request.available,
    };
    validate(&food)?;
    let created = ctx.storage.insert_food(&food).await.map_err(internal)?;
    info!(food_id = created.id.0, name = %created.name, "food created");
    Ok(created)
}

/// Replaces every field of `food_id`. An id carried in the body is ignored in
/// favour of the path.
pub async fn update_food(
    ctx: &ApiContext,
    food_id: FoodId,
    request: UpdateFoodRequest,
) -> Result<FoodItem, ApiError> {
    if let Some(body_id) = request.id {
        if body_id != food_id {
            warn!(
                food_id = food_id.0,
                body_id = body_id.0,
                "update body id differs from path id; using path id"
            );
        }
    }
    let food = NewFood {
        name: request.name,
        description: request.description,
        price: request.price,
        image: request.image,
        available: request.available,
    };
    validate(&food)?;
    let updated = ctx
        .storage
        .update_food(food_id, &food)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found(food_id))?;
    info!(food_id = food_id.0, "food updated");
    Ok(updated)
}

pub async fn delete_food(ctx: &ApiContext, food_id: FoodId) -> Result<(), ApiError> {
    let removed = ctx.storage.delete_food(food_id).await.map_err(internal)?;
    if !removed {
        return Err(not_found(food_id));
    }
    info!(food_id = food_id.0, "food deleted");
    Ok(())
}

fn validate(food: &NewFood) -> Result<(), ApiError> {
    if food.name.trim().is_empty() {
        return Err(ApiError::new(ErrorCode::Validation, "name must not be empty"));
    }
    if !food.price.is_finite() || food.price < 0.0 {
        return Err(ApiError::new(
            ErrorCode::Validation,
            "price must be a non-negative number",
        ));
    }
    Ok(())
}

fn not_found(food_id: FoodId) -> ApiError {
    ApiError::new(ErrorCode::NotFound, format!("food {food_id} not found"))
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Internal, err.to_string())
}
