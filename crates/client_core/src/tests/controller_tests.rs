use super::*;
use crate::{view::FoodAction, RemoteCallError};
use async_trait::async_trait;
use shared::error::{ApiException, ErrorCode};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::oneshot;

#[derive(Debug, Clone, PartialEq)]
enum RecordedCall {
    List,
    Create(CreateFoodRequest),
    Update(FoodId, UpdateFoodRequest),
    Delete(FoodId),
}

/// Server stand-in backed by a vector, with switchable failure.
struct FakeFoodApi {
    foods: Mutex<Vec<FoodItem>>,
    next_id: Mutex<i64>,
    fail: AtomicBool,
    calls: Mutex<Vec<RecordedCall>>,
    delete_gate: Mutex<Option<oneshot::Receiver<()>>>,
}

impl FakeFoodApi {
    fn with_foods(foods: Vec<FoodItem>) -> Arc<Self> {
        let next_id = foods.iter().map(|food| food.id.0).max().unwrap_or(0) + 1;
        Arc::new(Self {
            foods: Mutex::new(foods),
            next_id: Mutex::new(next_id),
            fail: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
            delete_gate: Mutex::new(None),
        })
    }

    fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().await.clone()
    }

    fn check(&self) -> Result<(), RemoteCallError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(RemoteCallError::Rejected {
                status: 500,
                source: ApiException::new(ErrorCode::Internal, "simulated outage"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl FoodApi for FakeFoodApi {
    async fn list_foods(&self) -> Result<Vec<FoodItem>, RemoteCallError> {
        self.calls.lock().await.push(RecordedCall::List);
        self.check()?;
        Ok(self.foods.lock().await.clone())
    }

    async fn create_food(&self, request: &CreateFoodRequest) -> Result<FoodItem, RemoteCallError> {
        self.calls
            .lock()
            .await
            .push(RecordedCall::Create(request.clone()));
        self.check()?;
        let id = {
            let mut next_id = self.next_id.lock().await;
            let id = *next_id;
            *next_id += 1;
            id
        };
        let created = FoodItem {
            id: FoodId(id),
            name: request.name.clone(),
            description: request.description.clone(),
            price: request.price,
            image: request.image.clone(),
            available: request.available,
        };
        self.foods.lock().await.push(created.clone());
        Ok(created)
    }

    async fn update_food(
        &self,
        food_id: FoodId,
        request: &UpdateFoodRequest,
    ) -> Result<FoodItem, RemoteCallError> {
        self.calls
            .lock()
            .await
            .push(RecordedCall::Update(food_id, request.clone()));
        self.check()?;
        let updated = FoodItem {
            id: food_id,
            name: request.name.clone(),
            description: request.description.clone(),
            price: request.price,
            image: request.image.clone(),
            available: request.available,
        };
        let mut foods = self.foods.lock().await;
        match foods.iter_mut().find(|food| food.id == food_id) {
            Some(food) => *food = updated.clone(),
            None => {
                return Err(RemoteCallError::Rejected {
                    status: 404,
                    source: ApiException::new(ErrorCode::NotFound, "food not found"),
                })
            }
        }
        Ok(updated)
    }

    async fn delete_food(&self, food_id: FoodId) -> Result<(), RemoteCallError> {
        self.calls.lock().await.push(RecordedCall::Delete(food_id));
        let gate = self.delete_gate.lock().await.take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.check()?;
        self.foods.lock().await.retain(|food| food.id != food_id);
        Ok(())
    }
}

fn pizza() -> FoodItem {
    FoodItem {
        id: FoodId(1),
        name: "Pizza".into(),
        description: "Margherita".into(),
        price: 10.0,
        image: "https://img.example/pizza.png".into(),
        available: true,
    }
}

fn burger_draft() -> FoodDraft {
    FoodDraft {
        name: "Burger".into(),
        description: "Double smash".into(),
        price: 5.0,
        image: "https://img.example/burger.png".into(),
    }
}

async fn loaded(foods: Vec<FoodItem>) -> (Arc<FakeFoodApi>, Arc<FoodListController>) {
    let api = FakeFoodApi::with_foods(foods);
    let controller = FoodListController::new(api.clone());
    controller.load().await;
    (api, controller)
}

#[tokio::test]
async fn load_replaces_collection_with_server_listing() {
    let (_api, controller) = loaded(vec![pizza()]).await;
    assert_eq!(controller.foods().await, vec![pizza()]);
}

#[tokio::test]
async fn failed_initial_load_leaves_collection_empty() {
    let api = FakeFoodApi::with_foods(vec![pizza()]);
    api.set_failing(true);
    let controller = FoodListController::new(api.clone());
    controller.load().await;
    assert!(controller.foods().await.is_empty());
}

#[tokio::test]
async fn failed_reload_keeps_previous_collection() {
    let (api, controller) = loaded(vec![pizza()]).await;
    api.set_failing(true);
    controller.load().await;
    assert_eq!(controller.foods().await, vec![pizza()]);
}

#[tokio::test]
async fn add_appends_server_item_and_forces_available() {
    let (api, controller) = loaded(vec![pizza()]).await;
    controller.add_food(burger_draft()).await;

    let foods = controller.foods().await;
    assert_eq!(foods.len(), 2);
    assert_eq!(foods[0], pizza());
    let burger = FoodItem {
        id: FoodId(2),
        name: "Burger".into(),
        description: "Double smash".into(),
        price: 5.0,
        image: "https://img.example/burger.png".into(),
        available: true,
    };
    assert_eq!(foods[1], burger);

    let calls = api.calls().await;
    assert!(matches!(
        calls.last(),
        Some(RecordedCall::Create(request)) if request.available
    ));
}

#[tokio::test]
async fn failed_add_leaves_collection_unchanged() {
    let (api, controller) = loaded(vec![pizza()]).await;
    let before = controller.snapshot().await;
    api.set_failing(true);

    controller.add_food(burger_draft()).await;

    assert_eq!(controller.snapshot().await, before);
}

#[tokio::test]
async fn update_without_edit_request_is_a_noop() {
    let (api, controller) = loaded(vec![pizza()]).await;
    let before = controller.snapshot().await;

    controller
        .update_food(FoodChanges {
            price: Some(12.0),
            ..FoodChanges::default()
        })
        .await;

    assert_eq!(controller.snapshot().await, before);
    assert_eq!(controller.editing_food().await, None);
    assert_eq!(api.calls().await, vec![RecordedCall::List]);
}

#[tokio::test]
async fn update_replaces_only_the_edited_item_in_place() {
    let salad = FoodItem {
        id: FoodId(3),
        name: "Salad".into(),
        description: "Caesar".into(),
        price: 7.5,
        image: "https://img.example/salad.png".into(),
        available: false,
    };
    let (api, controller) = loaded(vec![pizza(), salad.clone()]).await;

    controller.request_edit(pizza()).await;
    controller
        .update_food(FoodChanges {
            price: Some(12.0),
            ..FoodChanges::default()
        })
        .await;

    let expected = FoodItem {
        price: 12.0,
        ..pizza()
    };
    assert_eq!(controller.foods().await, vec![expected.clone(), salad]);
    assert!(api
        .calls()
        .await
        .contains(&RecordedCall::Update(FoodId(1), UpdateFoodRequest::from(expected))));
}

#[tokio::test]
async fn editing_target_survives_submit() {
    let (_api, controller) = loaded(vec![pizza()]).await;
    controller.request_edit(pizza()).await;
    controller
        .update_food(FoodChanges {
            name: Some("Calzone".into()),
            ..FoodChanges::default()
        })
        .await;

    assert_eq!(controller.editing_food().await, Some(pizza()));
    assert_eq!(controller.foods().await[0].name, "Calzone");
}

#[tokio::test]
async fn failed_update_leaves_collection_unchanged() {
    let (api, controller) = loaded(vec![pizza()]).await;
    controller.request_edit(pizza()).await;
    api.set_failing(true);

    controller
        .update_food(FoodChanges {
            price: Some(99.0),
            ..FoodChanges::default()
        })
        .await;

    assert_eq!(controller.foods().await, vec![pizza()]);
}

#[tokio::test]
async fn delete_removes_only_the_matching_item() {
    let mut burger = pizza();
    burger.id = FoodId(2);
    burger.name = "Burger".into();
    let (_api, controller) = loaded(vec![pizza(), burger.clone()]).await;

    controller.delete_food(FoodId(1)).await;
    assert_eq!(controller.foods().await, vec![burger]);
}

#[tokio::test]
async fn delete_of_last_item_empties_collection() {
    let (_api, controller) = loaded(vec![pizza()]).await;
    controller.delete_food(FoodId(1)).await;
    assert!(controller.foods().await.is_empty());
}

#[tokio::test]
async fn failed_delete_leaves_collection_unchanged() {
    let (api, controller) = loaded(vec![pizza()]).await;
    api.set_failing(true);
    controller.delete_food(FoodId(1)).await;
    assert_eq!(controller.foods().await, vec![pizza()]);
}

#[tokio::test]
async fn dialog_flags_toggle_independently() {
    let (_api, controller) = loaded(Vec::new()).await;

    controller.toggle_add_dialog().await;
    controller.toggle_edit_dialog().await;
    let state = controller.snapshot().await;
    assert!(state.add_dialog_open);
    assert!(state.edit_dialog_open);

    controller.toggle_add_dialog().await;
    let state = controller.snapshot().await;
    assert!(!state.add_dialog_open);
    assert!(state.edit_dialog_open);
}

#[tokio::test]
async fn request_edit_stages_item_and_opens_dialog_without_remote_call() {
    let (api, controller) = loaded(vec![pizza()]).await;
    controller.request_edit(pizza()).await;

    let state = controller.snapshot().await;
    assert_eq!(state.editing_food, Some(pizza()));
    assert!(state.edit_dialog_open);
    assert!(!state.add_dialog_open);
    assert_eq!(api.calls().await, vec![RecordedCall::List]);
}

#[tokio::test]
async fn concurrent_handlers_each_apply_their_own_result() {
    let (api, controller) = loaded(vec![pizza()]).await;
    let (release_delete, gate) = oneshot::channel();
    *api.delete_gate.lock().await = Some(gate);

    let deleting = {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move { controller.delete_food(FoodId(1)).await })
    };
    controller.add_food(burger_draft()).await;
    release_delete.send(()).expect("delete still pending");
    deleting.await.expect("delete task");

    let names: Vec<String> = controller
        .foods()
        .await
        .into_iter()
        .map(|food| food.name)
        .collect();
    assert_eq!(names, vec!["Burger".to_string()]);
}

#[tokio::test]
async fn reconciliation_emits_foods_changed_events() {
    let api = FakeFoodApi::with_foods(vec![pizza()]);
    let controller = FoodListController::new(api);
    let mut events = controller.subscribe_events();

    controller.load().await;
    assert_eq!(
        events.recv().await.expect("event"),
        DashboardEvent::FoodsChanged(vec![pizza()])
    );

    controller.toggle_add_dialog().await;
    assert_eq!(
        events.recv().await.expect("event"),
        DashboardEvent::DialogsChanged {
            add_open: true,
            edit_open: false
        }
    );
}

#[tokio::test]
async fn scripted_session_follows_server_responses() {
    let (_api, controller) = loaded(vec![pizza()]).await;
    assert_eq!(controller.foods().await, vec![pizza()]);

    controller
        .dispatch(FoodAction::SubmitAdd(burger_draft()))
        .await;
    let names: Vec<String> = controller
        .foods()
        .await
        .iter()
        .map(|food| food.name.clone())
        .collect();
    assert_eq!(names, vec!["Pizza".to_string(), "Burger".to_string()]);

    controller.dispatch(FoodAction::Delete(FoodId(2))).await;
    controller.dispatch(FoodAction::RequestEdit(pizza())).await;
    controller
        .dispatch(FoodAction::SubmitEdit(FoodChanges {
            price: Some(12.0),
            ..FoodChanges::default()
        }))
        .await;
    assert_eq!(
        controller.foods().await,
        vec![FoodItem {
            price: 12.0,
            ..pizza()
        }]
    );

    controller.dispatch(FoodAction::Delete(FoodId(1))).await;
    assert!(controller.foods().await.is_empty());
}

#[tokio::test]
async fn submitting_dialogs_closes_them_even_on_failure() {
    let (api, controller) = loaded(vec![pizza()]).await;
    controller.dispatch(FoodAction::ToggleAddDialog).await;
    controller.dispatch(FoodAction::RequestEdit(pizza())).await;
    api.set_failing(true);

    controller
        .dispatch(FoodAction::SubmitAdd(burger_draft()))
        .await;
    controller
        .dispatch(FoodAction::SubmitEdit(FoodChanges::default()))
        .await;

    let state = controller.snapshot().await;
    assert!(!state.add_dialog_open);
    assert!(!state.edit_dialog_open);
    assert_eq!(state.foods, vec![pizza()]);
}

#[test]
fn replace_keeps_position_of_matching_id() {
    let mut burger = pizza();
    burger.id = FoodId(2);
    let mut foods = vec![pizza(), burger.clone()];
    let updated = FoodItem {
        name: "Calzone".into(),
        ..pizza()
    };
    replace_food(&mut foods, updated.clone());
    assert_eq!(foods, vec![updated, burger]);
}

#[test]
fn remove_of_absent_id_changes_nothing() {
    let mut foods = vec![pizza()];
    remove_food(&mut foods, FoodId(42));
    assert_eq!(foods, vec![pizza()]);
}
