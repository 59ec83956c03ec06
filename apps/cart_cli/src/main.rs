use std::{io::Write, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{CartController, FixedIdentity, HttpCartService};
use shared::domain::{AddressField, ProductId, UserId};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod orchestration;
mod render;

use commands::{parse_command, CommandError, HELP};
use config::load_settings;
use orchestration::{dispatch, Flow};
use render::{render_cart, ConsoleNotifier};

#[derive(Parser, Debug)]
#[command(name = "cart", about = "View and check out a storefront cart")]
struct Args {
    /// Base URL of the cart/order service.
    #[arg(long)]
    base_url: Option<String>,
    #[arg(long)]
    user_id: Option<i64>,
    /// Config file (defaults to ./cart.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<OneShot>,
}

#[derive(Subcommand, Debug)]
enum OneShot {
    /// Print the cart and exit.
    Show,
    Remove {
        product_id: i64,
    },
    SetQuantity {
        product_id: i64,
        #[arg(allow_hyphen_values = true)]
        quantity: i64,
    },
    Clear,
    /// Place an order for the current cart.
    Order {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        flat: String,
        #[arg(long, default_value = "")]
        street: String,
        #[arg(long, default_value = "")]
        city: String,
        #[arg(long, default_value = "")]
        state: String,
        #[arg(long, default_value = "")]
        mobile: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if let Some(user_id) = args.user_id {
        settings.user_id = user_id;
    }
    settings.validate()?;
    tracing::info!(
        base_url = %settings.base_url,
        user_id = settings.user_id,
        "starting cart client"
    );

    let service =
        HttpCartService::new(&settings.base_url).context("failed to build cart service client")?;
    let controller = CartController::new(
        Arc::new(service),
        Arc::new(FixedIdentity(UserId(settings.user_id))),
        Arc::new(ConsoleNotifier),
    );
    controller.load_cart().await;

    match args.command {
        Some(command) => run_once(&controller, command).await,
        None => run_interactive(&controller).await,
    }
}

async fn run_once(controller: &CartController, command: OneShot) -> Result<()> {
    match command {
        OneShot::Show => {}
        OneShot::Remove { product_id } => {
            controller.remove_item(ProductId(product_id)).await;
        }
        OneShot::SetQuantity {
            product_id,
            quantity,
        } => {
            controller
                .update_quantity(ProductId(product_id), quantity)
                .await;
        }
        OneShot::Clear => {
            controller.clear_cart().await;
        }
        OneShot::Order {
            name,
            flat,
            street,
            city,
            state,
            mobile,
        } => {
            controller.proceed_to_checkout().await;
            for (field, value) in [
                (AddressField::Name, name),
                (AddressField::Flat, flat),
                (AddressField::Street, street),
                (AddressField::City, city),
                (AddressField::State, state),
                (AddressField::Mobile, mobile),
            ] {
                controller.set_address_field(field, value).await;
            }
            controller.place_order().await;
        }
    }

    print!("{}", render_cart(&controller.snapshot().await));
    Ok(())
}

async fn run_interactive(controller: &CartController) -> Result<()> {
    println!("{HELP}\n");
    print!("{}", render_cart(&controller.snapshot().await));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().context("failed to flush stdout")?;

        let Some(line) = lines.next_line().await.context("failed to read stdin")? else {
            break;
        };

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(CommandError::Empty) => continue,
            Err(err) => {
                tracing::debug!(input = %line.trim(), error = %err, "rejected command");
                println!("{err}");
                continue;
            }
        };

        match dispatch(controller, command).await {
            Flow::Redraw => print!("{}", render_cart(&controller.snapshot().await)),
            Flow::Message => {}
            Flow::Quit => break,
        }
    }

    Ok(())
}
