//! Plain-data view of the dashboard and the actions the presentation layer
//! sends back.

use shared::domain::{FoodChanges, FoodDraft, FoodId, FoodItem};
use tracing::debug;

use crate::controller::{DashboardState, FoodListController};

#[derive(Debug, Clone, PartialEq)]
pub enum FoodAction {
    Reload,
    ToggleAddDialog,
    ToggleEditDialog,
    SubmitAdd(FoodDraft),
    SubmitEdit(FoodChanges),
    RequestEdit(FoodItem),
    Delete(FoodId),
}

impl FoodAction {
    pub fn name(&self) -> &'static str {
        match self {
            FoodAction::Reload => "reload",
            FoodAction::ToggleAddDialog => "toggle_add_dialog",
            FoodAction::ToggleEditDialog => "toggle_edit_dialog",
            FoodAction::SubmitAdd(_) => "submit_add",
            FoodAction::SubmitEdit(_) => "submit_edit",
            FoodAction::RequestEdit(_) => "request_edit",
            FoodAction::Delete(_) => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddDialogView {
    pub is_open: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditDialogView {
    pub is_open: bool,
    /// Initial form values.
    pub initial: Option<FoodItem>,
}

/// One entry of the rendered list, with the actions its buttons trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodCardView {
    pub food: FoodItem,
    pub edit: FoodAction,
    pub delete: FoodAction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub open_add_dialog: FoodAction,
    pub add_dialog: AddDialogView,
    pub edit_dialog: EditDialogView,
    pub cards: Vec<FoodCardView>,
}

impl From<&DashboardState> for DashboardView {
    fn from(state: &DashboardState) -> Self {
        Self {
            open_add_dialog: FoodAction::ToggleAddDialog,
            add_dialog: AddDialogView {
                is_open: state.add_dialog_open,
            },
            edit_dialog: EditDialogView {
                is_open: state.edit_dialog_open,
                initial: state.editing_food.clone(),
            },
            cards: state
                .foods
                .iter()
                .map(|food| FoodCardView {
                    food: food.clone(),
                    edit: FoodAction::RequestEdit(food.clone()),
                    delete: FoodAction::Delete(food.id),
                })
                .collect(),
        }
    }
}

impl FoodListController {
    pub async fn view(&self) -> DashboardView {
        DashboardView::from(&self.snapshot().await)
    }

    /// Routes a presentation action to its handler. Submitting a dialog
    /// closes it before the remote call resolves, whatever the outcome.
    pub async fn dispatch(&self, action: FoodAction) {
        debug!(action = action.name(), "dispatching food action");
        match action {
            FoodAction::Reload => self.load().await,
            FoodAction::ToggleAddDialog => self.toggle_add_dialog().await,
            FoodAction::ToggleEditDialog => self.toggle_edit_dialog().await,
            FoodAction::SubmitAdd(draft) => {
                self.toggle_add_dialog().await;
                self.add_food(draft).await;
            }
            FoodAction::SubmitEdit(changes) => {
                self.toggle_edit_dialog().await;
                self.update_food(changes).await;
            }
            FoodAction::RequestEdit(food) => self.request_edit(food).await,
            FoodAction::Delete(food_id) => self.delete_food(food_id).await,
        }
    }
}
