use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use booking_core::{
    load_settings, BookingListController, HttpOrderGateway, ListEvent, MutationCoordinator,
    TimerPhase, ViewState,
};
use chrono::{Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use shared::{
    dates::{format_order_date, parse_order_date},
    domain::{DeliveryQuantity, OrderDraft, OrderId},
    session::SessionContext,
};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser, Debug)]
#[command(name = "agent-cli", about = "Same-day cake bookings for delivery agents")]
struct Args {
    /// Settings file; `booking.toml` in the working directory is used when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Persisted user data from the login screen; overrides the settings value.
    #[arg(long)]
    session_file: Option<PathBuf>,
    /// Selected date as DD-MM-YYYY; defaults to today.
    #[arg(long, value_parser = parse_order_date)]
    date: Option<NaiveDate>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the bookings for the selected date.
    List,
    /// Pull-to-refresh, then show the list.
    Refresh,
    /// Delete a booking, then show the reconciled list.
    Delete { id: String },
    /// Create a booking for the selected date, then show the reconciled list.
    Create {
        #[arg(long)]
        sender: String,
        #[arg(long)]
        receiver: String,
        #[arg(long)]
        cake: String,
        #[arg(long)]
        weight: Option<String>,
        #[arg(long)]
        delivery_date: Option<String>,
        #[arg(long)]
        time: Option<String>,
        #[arg(long, default_value_t = 0.0)]
        advance: f64,
        #[arg(long, default_value_t = 0.0)]
        balance: f64,
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

    let settings = load_settings(args.config.as_deref()).context("failed to load settings")?;
    let session_path = args
        .session_file
        .clone()
        .unwrap_or_else(|| settings.session_file.clone());
    let session = SessionContext::load(&session_path)
        .with_context(|| format!("failed to restore session from {}", session_path.display()))?;

    let gateway = HttpOrderGateway::new(&settings.server_url, settings.request_timeout())
        .context("failed to build HTTP client")?;
    let today = args.date.unwrap_or_else(|| Local::now().date_naive());
    info!(
        server_url = %settings.server_url,
        agent = %session.user_id(),
        date = %format_order_date(today),
        "opening booking list"
    );
    let list = BookingListController::new(
        Arc::new(gateway),
        session.clone(),
        settings.list_options(),
        today,
    );
    let mut events = list.subscribe();

    list.mount().await;
    let coordinator = MutationCoordinator::new(list.clone());

    match args.command {
        Command::List => {}
        Command::Refresh => {
            list.refresh().await;
        }
        Command::Delete { id } => {
            // Failures are already surfaced as notices.
            let _ = coordinator.delete(&OrderId::from(id)).await;
        }
        Command::Create {
            sender,
            receiver,
            cake,
            weight,
            delivery_date,
            time,
            advance,
            balance,
        } => {
            list.open_create().await;
            let draft = OrderDraft {
                sender_name: sender,
                receiver_name: receiver,
                cake_name: cake,
                weight: weight.map(DeliveryQuantity::Text),
                order_date: format_order_date(today),
                delivery_date,
                time_slot: time,
                agent_name: session.name().to_string(),
                advance_payment: advance,
                balance_payment: balance,
            };
            match coordinator.create(&draft).await {
                Ok(created) => println!("Created booking {}", created.order.id),
                Err(err) => eprintln!("{}", err.user_message()),
            }
        }
    }

    let view = wait_until_settled(&list, &mut events).await;
    println!("{}", render::render_view(&session.greeting(), &view, Utc::now()));
    list.dispose().await;
    Ok(())
}

/// Prints notices as they arrive and returns the first settled view. An empty
/// date with a countdown still armed waits for its expiry.
async fn wait_until_settled(
    list: &BookingListController,
    events: &mut broadcast::Receiver<ListEvent>,
) -> ViewState {
    loop {
        match events.try_recv() {
            Ok(ListEvent::Notice(notice)) => println!("{}", render::render_notice(&notice)),
            Ok(ListEvent::ViewChanged(_)) => {}
            Err(_) => break,
        }
    }

    let view = list.view().await;
    if view.is_settled() {
        return view;
    }
    if !view.is_loading && list.empty_state_timer_phase().await != TimerPhase::Armed {
        return view;
    }
    loop {
        match events.recv().await {
            Ok(ListEvent::ViewChanged(view)) if view.is_settled() => return view,
            Ok(ListEvent::Notice(notice)) => println!("{}", render::render_notice(&notice)),
            Ok(ListEvent::ViewChanged(_)) | Err(RecvError::Lagged(_)) => {}
            Err(RecvError::Closed) => return list.view().await,
        }
    }
}
