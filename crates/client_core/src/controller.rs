//! In-memory menu state and the handlers that keep it in step with the food API.

use std::sync::Arc;

use shared::{
    domain::{FoodChanges, FoodDraft, FoodId, FoodItem},
    protocol::{CreateFoodRequest, UpdateFoodRequest},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info};

use crate::FoodApi;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    pub foods: Vec<FoodItem>,
    /// Item staged for the edit dialog. Left in place after a submit; the next
    /// edit request overwrites it.
    pub editing_food: Option<FoodItem>,
    pub add_dialog_open: bool,
    pub edit_dialog_open: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    FoodsChanged(Vec<FoodItem>),
    EditingFoodChanged(Option<FoodItem>),
    DialogsChanged { add_open: bool, edit_open: bool },
}

/// Owns the menu collection and mediates every change to it.
///
/// Remote calls are awaited without holding the state lock, so handlers
/// started concurrently run independently and each applies its result to the
/// collection as it stands when its response arrives. Failures are logged
/// and leave the state untouched.
pub struct FoodListController {
    api: Arc<dyn FoodApi>,
    inner: Mutex<DashboardState>,
    events: broadcast::Sender<DashboardEvent>,
}

impl FoodListController {
    pub fn new(api: Arc<dyn FoodApi>) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            api,
            inner: Mutex::new(DashboardState::default()),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<DashboardEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> DashboardState {
        self.inner.lock().await.clone()
    }

    pub async fn foods(&self) -> Vec<FoodItem> {
        self.inner.lock().await.foods.clone()
    }

    pub async fn editing_food(&self) -> Option<FoodItem> {
        self.inner.lock().await.editing_food.clone()
    }

    /// Replaces the collection with the server's full listing.
    pub async fn load(&self) {
        match self.api.list_foods().await {
            Ok(foods) => {
                info!(count = foods.len(), "loaded foods");
                self.apply_foods(|current| *current = foods).await;
            }
            Err(error) => error!(%error, "failed to load foods"),
        }
    }

    pub async fn add_food(&self, draft: FoodDraft) {
        let request = CreateFoodRequest::from_draft(draft);
        match self.api.create_food(&request).await {
            Ok(created) => {
                info!(food_id = created.id.0, "food added");
                self.apply_foods(|current| append_food(current, created))
                    .await;
            }
            Err(error) => error!(%error, name = %request.name, "failed to add food"),
        }
    }

    /// Submits `changes` for the item staged by [`Self::request_edit`]. Does
    /// nothing when no item is staged.
    pub async fn update_food(&self, changes: FoodChanges) {
        let Some(target) = self.editing_food().await else {
            debug!("update requested with no food selected for editing; ignoring");
            return;
        };
        let request = UpdateFoodRequest::from(target.merged_with(&changes));
        match self.api.update_food(target.id, &request).await {
            Ok(updated) => {
                info!(food_id = updated.id.0, "food updated");
                self.apply_foods(|current| replace_food(current, updated))
                    .await;
            }
            Err(error) => error!(%error, food_id = target.id.0, "failed to update food"),
        }
    }

    pub async fn delete_food(&self, food_id: FoodId) {
        match self.api.delete_food(food_id).await {
            Ok(()) => {
                info!(food_id = food_id.0, "food deleted");
                self.apply_foods(|current| remove_food(current, food_id))
                    .await;
            }
            Err(error) => error!(%error, food_id = food_id.0, "failed to delete food"),
        }
    }

    /// Stages `food` for the edit dialog and opens it.
    pub async fn request_edit(&self, food: FoodItem) {
        let (add_open, edit_open) = {
            let mut guard = self.inner.lock().await;
            guard.editing_food = Some(food.clone());
            guard.edit_dialog_open = true;
            (guard.add_dialog_open, guard.edit_dialog_open)
        };
        let _ = self
            .events
            .send(DashboardEvent::EditingFoodChanged(Some(food)));
        let _ = self.events.send(DashboardEvent::DialogsChanged {
            add_open,
            edit_open,
        });
    }

    pub async fn toggle_add_dialog(&self) {
        self.apply_dialogs(|state| state.add_dialog_open = !state.add_dialog_open)
            .await;
    }

    pub async fn toggle_edit_dialog(&self) {
        self.apply_dialogs(|state| state.edit_dialog_open = !state.edit_dialog_open)
            .await;
    }

    async fn apply_foods(&self, reconcile: impl FnOnce(&mut Vec<FoodItem>)) {
        let foods = {
            let mut guard = self.inner.lock().await;
            reconcile(&mut guard.foods);
            guard.foods.clone()
        };
        let _ = self.events.send(DashboardEvent::FoodsChanged(foods));
    }

    async fn apply_dialogs(&self, change: impl FnOnce(&mut DashboardState)) {
        let (add_open, edit_open) = {
            let mut guard = self.inner.lock().await;
            change(&mut guard);
            (guard.add_dialog_open, guard.edit_dialog_open)
        };
        let _ = self.events.send(DashboardEvent::DialogsChanged {
            add_open,
            edit_open,
        });
    }
}

fn append_food(foods: &mut Vec<FoodItem>, created: FoodItem) {
    foods.push(created);
}

/// Swaps in `updated` wherever its id appears, keeping positions.
fn replace_food(foods: &mut [FoodItem], updated: FoodItem) {
    for food in foods.iter_mut().filter(|food| food.id == updated.id) {
        *food = updated.clone();
    }
}

fn remove_food(foods: &mut Vec<FoodItem>, food_id: FoodId) {
    foods.retain(|food| food.id != food_id);
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
