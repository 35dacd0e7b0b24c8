use anyhow::Result;
use clap::{Parser, Subcommand};
use storage::{NewFood, Storage};

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/foods.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Insert the default menu into an empty database.
    Seed,
    AddFood {
        name: String,
        price: f64,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        image: String,
        #[arg(long)]
        unavailable: bool,
    },
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::Seed => {
            let inserted = storage.seed_default_menu_if_empty().await?;
            if inserted == 0 {
                println!("menu already has foods; nothing seeded");
            } else {
                println!("seeded {inserted} foods");
            }
        }
        Command::AddFood {
            name,
            price,
            description,
            image,
            unavailable,
        } => {
            let food = storage
                .insert_food(&NewFood {
                    name,
                    description,
                    price,
                    image,
                    available: !unavailable,
                })
                .await?;
            println!("created food_id={}", food.id.0);
        }
        Command::List => {
            for food in storage.list_foods().await? {
                println!("{}\t{}\t{:.2}\t{}", food.id.0, food.name, food.price, food.available);
            }
        }
    }

    Ok(())
}
