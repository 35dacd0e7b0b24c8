use serde::{Deserialize, Serialize};

use crate::domain::{FoodDraft, FoodId, FoodItem};

pub const FOODS_ROUTE: &str = "/foods";

pub fn food_route(food_id: FoodId) -> String {
    format!("{FOODS_ROUTE}/{}", food_id.0)
}

/// Body of `POST /foods`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateFoodRequest {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image: String,
    pub available: bool,
}

impl CreateFoodRequest {
    /// New menu entries always start out available.
    pub fn from_draft(draft: FoodDraft) -> Self {
        Self {
            name: draft.name,
            description: draft.description,
            price: draft.price,
            image: draft.image,
            available: true,
        }
    }
}

/// Body of `PUT /foods/{id}`. Carries the full merged record; the path id is
/// authoritative on the server side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateFoodRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<FoodId>,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image: String,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

impl From<FoodItem> for UpdateFoodRequest {
    fn from(item: FoodItem) -> Self {
        Self {
            id: Some(item.id),
            name: item.name,
            description: item.description,
            price: item.price,
            image: item.image,
            available: item.available,
        }
    }
}
