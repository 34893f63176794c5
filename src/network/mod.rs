pub mod io;
pub mod station;
pub mod trip;

use anyhow::Context;

use crate::network::{station::Station, trip::Trip};

/// The loaded bike-share network: the station list and the full trip log.
pub struct Network {
    pub stations: Vec<Station>,
    pub trips: Vec<Trip>,
}

impl Network {
    /// Loads both feeds to completion. Nothing downstream sees a partially
    /// loaded trip log; a failure in either feed fails the whole load.
    pub async fn load(stations_source: &str, trips_source: &str) -> anyhow::Result<Self> {
        let station_bytes = io::load_bytes(stations_source)
            .await
            .context("Station feed failed to load")?;
        let trip_bytes = io::load_bytes(trips_source)
            .await
            .context("Trip feed failed to load")?;

        let stations = io::read_stations(&station_bytes)?;
        let trips = io::read_trips(&trip_bytes)?;

        Ok(Self { stations, trips })
    }
}
