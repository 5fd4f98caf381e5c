//! StreetSlipp CLI - a local storefront session.
//!
//! # Usage
//!
//! ```bash
//! # Browse
//! streetslipp products
//! streetslipp cities abad
//!
//! # Build a bag (persisted under STOREFRONT_DATA_DIR)
//! streetslipp cart add apex-drift --size 9
//! streetslipp cart show
//!
//! # Place the order and follow it
//! streetslipp checkout --first-name Waleed --last-name Khan --phone 03001234567 \
//!     --address "House 12, Street 4" --city Karachi
//! streetslipp track CX-778812
//! ```
//!
//! # Commands
//!
//! - `products` - List the catalog
//! - `cart` - Show and edit the bag
//! - `checkout` - Place an order (courier booking and email are best-effort)
//! - `track` - Shipment status lookup
//! - `cities` - Search serviceable cities

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

use commands::Session;
use commands::checkout::{BuyNowArgs, ShippingArgs};

#[derive(Parser)]
#[command(name = "streetslipp")]
#[command(author, version, about = "StreetSlipp storefront session")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog products
    Products {
        /// Only new and hot drops
        #[arg(long)]
        trending: bool,
    },
    /// Show and edit the bag
    Cart {
        #[command(subcommand)]
        action: Option<CartAction>,
    },
    /// Place an order
    Checkout {
        #[command(flatten)]
        shipping: ShippingArgs,

        #[command(flatten)]
        buy_now: BuyNowArgs,

        /// Print the receipt as JSON
        #[arg(long)]
        json: bool,
    },
    /// Look up a shipment
    Track {
        /// Courier tracking number
        tracking_number: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search cities the courier delivers to
    Cities {
        /// Case-insensitive search term
        term: Option<String>,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the bag
    Show,
    /// Add one pair
    Add {
        /// Product id (see `streetslipp products`)
        product: String,

        /// EU size
        #[arg(short, long)]
        size: u32,

        /// Color hex, e.g. `#FF0000` (defaults to the first color)
        #[arg(short, long)]
        color: Option<String>,
    },
    /// Remove a line
    Remove {
        /// Line key as shown by `cart show`
        cart_id: String,
    },
    /// Change a line's quantity
    Qty {
        /// Line key as shown by `cart show`
        cart_id: String,

        /// Amount to add (negative to reduce)
        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },
    /// Empty the bag
    Clear,
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so command output stays clean
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Products { trending } => commands::catalog::products(trending),
        Commands::Cities { term } => commands::catalog::cities(term.as_deref()),
        Commands::Cart { action } => {
            let session = Session::open()?;
            let mut cart = session.cart();
            match action.unwrap_or(CartAction::Show) {
                CartAction::Show => commands::cart::show(&cart),
                CartAction::Add {
                    product,
                    size,
                    color,
                } => commands::cart::add(&mut cart, &product, size, color.as_deref())?,
                CartAction::Remove { cart_id } => commands::cart::remove(&mut cart, &cart_id),
                CartAction::Qty { cart_id, delta } => {
                    commands::cart::update_quantity(&mut cart, &cart_id, delta)?;
                }
                CartAction::Clear => commands::cart::clear(&mut cart),
            }
        }
        Commands::Checkout {
            shipping,
            buy_now,
            json,
        } => {
            let session = Session::open()?;
            commands::checkout::run(&session, shipping, buy_now, json).await?;
        }
        Commands::Track {
            tracking_number,
            json,
        } => {
            let session = Session::open()?;
            commands::track::run(&session, &tracking_number, json).await?;
        }
    }
    Ok(())
}
