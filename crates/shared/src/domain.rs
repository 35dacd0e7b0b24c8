use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(FoodId);

/// One menu entry as the food API stores and returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub id: FoodId,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image: String,
    pub available: bool,
}

/// Fields collected by the "add food" form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodDraft {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image: String,
}

/// Fields collected by the "edit food" form. Absent fields keep the value of
/// the item being edited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FoodChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl FoodChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.image.is_none()
    }
}

impl FoodItem {
    /// Overlays `changes` on top of this item. Identity and availability are
    /// carried over untouched.
    pub fn merged_with(&self, changes: &FoodChanges) -> FoodItem {
        FoodItem {
            id: self.id,
            name: changes.name.clone().unwrap_or_else(|| self.name.clone()),
            description: changes
                .description
                .clone()
                .unwrap_or_else(|| self.description.clone()),
            price: changes.price.unwrap_or(self.price),
            image: changes.image.clone().unwrap_or_else(|| self.image.clone()),
            available: self.available,
        }
    }
}
