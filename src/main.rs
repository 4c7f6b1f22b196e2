use std::{env, error::Error};

use chrono::Utc;
use env_logger::Env;
use log::info;

use travelmore_booking::config::ClientConfig;
use travelmore_booking::models::user::AuthUser;
use travelmore_booking::services::{
    account_service, booking_api::HttpBookingApi, currency::format_idr, history_service,
    notifier::LogNotifier,
};

const USAGE: &str = "usage: travelmore-booking [history|profile]";

async fn print_history(api: &HttpBookingApi) -> Result<(), Box<dyn Error>> {
    let history = history_service::load_history(api).await?;
    let now = Utc::now();

    println!("{} bookings, {} orders", history.bookings.len(), history.orders.len());
    for order in history.orders_newest_first() {
        let due = if history.payable_orders(now).iter().any(|o| o.id == order.id) {
            " (awaiting payment)"
        } else {
            ""
        };
        println!(
            "{:<16} {:<10} {:>14}{}",
            order.order_number,
            order.status,
            format_idr(order.total_amount),
            due
        );
    }
    for booking in &history.bookings {
        println!(
            "#{:<6} {:<16} {:<32} {} pax",
            booking.id,
            booking.category().label(),
            booking.service_name(),
            booking.total_pax()
        );
    }
    Ok(())
}

async fn print_profile(api: &HttpBookingApi) -> Result<(), Box<dyn Error>> {
    let user = AuthUser::default();
    let profile = account_service::load_profile(api, &user, &LogNotifier).await?;
    println!("name:        {}", profile.name);
    println!("full name:   {}", profile.full_name);
    println!("phone:       {} {}", profile.phone_code, profile.local_phone);
    println!("nationality: {}", profile.nationality);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = ClientConfig::from_env()?;
    info!("using booking API at {}", config.api_base_url);
    let api = HttpBookingApi::new(&config)?;

    match env::args().nth(1).as_deref() {
        None | Some("history") => print_history(&api).await,
        Some("profile") => print_profile(&api).await,
        Some(other) => {
            eprintln!("unknown command {:?}\n{}", other, USAGE);
            std::process::exit(2);
        }
    }
}
