use std::time::Instant;

use clap::Parser;

use crate::{
    network::Network,
    traffic::{TimeFilter, TrafficMap},
};
mod network;
mod server;
mod traffic;

#[derive(Parser)]
struct Args {
    /// Path or URL of the station information feed (GBFS or flat JSON)
    stations: String,
    /// Path or URL of the trip history CSV
    trips: String,
    /// Print markers for this minute of day (-1 for all trips) and exit
    #[arg(long)]
    minute: Option<i32>,
    /// Address to publish station markers from
    #[arg(long, default_value = "127.0.0.1:8080")]
    listen: String,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::try_init().ok();

    let args = Args::parse();

    let now = Instant::now();
    let network = Network::load(&args.stations, &args.trips).await?;
    let map = TrafficMap::new(network);
    log::info!(
        "Loaded {} stations and {} trips in {:?}",
        map.station_count(),
        map.trip_count(),
        now.elapsed()
    );

    if let Some(cursor) = args.minute {
        let filter = TimeFilter::from_cursor(cursor)?;
        log::info!("Computing station traffic for {}", filter.label());
        println!("{}", map.geojson(filter)?);
        return Ok(());
    }

    server::run(map, &args.listen).await?;
    Ok(())
}
