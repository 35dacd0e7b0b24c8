use std::{sync::Arc, time::Duration};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    ApiConfig, FoodAction, FoodListController, HttpFoodApi, DEFAULT_BASE_URL,
};
use shared::domain::{FoodChanges, FoodDraft, FoodId, FoodItem};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "foods", about = "Manage a restaurant menu through the food API")]
struct Args {
    #[arg(long, env = "FOODS_API_URL", default_value = DEFAULT_BASE_URL)]
    server_url: String,
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,
    /// Print the resulting menu as JSON.
    #[arg(long)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    List,
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        price: f64,
        #[arg(long, default_value = "")]
        image: String,
    },
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        image: Option<String>,
    },
    Delete {
        id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();
    let args = Args::parse();

    let config = ApiConfig::parse(&args.server_url)
        .with_context(|| format!("invalid --server-url '{}'", args.server_url))?
        .with_timeout(Duration::from_secs(args.timeout_secs));
    let api = HttpFoodApi::new(config).context("failed to build http client")?;
    info!(server_url = api.base_url(), "using food api");
    let controller = FoodListController::new(Arc::new(api));
    controller.dispatch(FoodAction::Reload).await;

    match args.command {
        Command::List => {}
        Command::Add {
            name,
            description,
            price,
            image,
        } => {
            controller
                .dispatch(FoodAction::SubmitAdd(FoodDraft {
                    name,
                    description,
                    price,
                    image,
                }))
                .await;
        }
        Command::Edit {
            id,
            name,
            description,
            price,
            image,
        } => {
            let view = controller.view().await;
            let Some(card) = view.cards.into_iter().find(|card| card.food.id == FoodId(id)) else {
                bail!("no food with id {id} on the menu");
            };
            controller.dispatch(card.edit).await;
            controller
                .dispatch(FoodAction::SubmitEdit(FoodChanges {
                    name,
                    description,
                    price,
                    image,
                }))
                .await;
        }
        Command::Delete { id } => {
            controller.dispatch(FoodAction::Delete(FoodId(id))).await;
        }
    }

    let foods = controller.foods().await;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&foods)?);
    } else {
        print_menu(&foods);
    }
    Ok(())
}

fn print_menu(foods: &[FoodItem]) {
    if foods.is_empty() {
        println!("(menu is empty)");
        return;
    }
    for food in foods {
        let availability = if food.available { "" } else { " [unavailable]" };
        println!(
            "#{:<4} {:<24} {:>8.2}{availability}",
            food.id.0, food.name, food.price
        );
        if !food.description.is_empty() {
            println!("      {}", food.description);
        }
    }
}
