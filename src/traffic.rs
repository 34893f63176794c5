use anyhow::Context;
use chrono::NaiveTime;
use geo_types::Point;
use itertools::Itertools;
use serde::Serialize;

use crate::network::{
    station::{Station, StationId},
    trip::Trip,
    Network,
};

/// Half-width of the rolling time-of-day window, in minutes. A trip counts
/// when either endpoint lands within this distance of the cursor.
pub const WINDOW_MINUTES: u32 = 60;

/// The time-of-day filter state: all trips, or a ±60 minute window around a
/// minute of day in [0, 1439].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeFilter {
    AllDay,
    Minute(u32),
}

impl TimeFilter {
    /// Maps the external cursor value (-1 = no filter) to a filter state.
    pub fn from_cursor(cursor: i32) -> anyhow::Result<Self> {
        match cursor {
            -1 => Ok(Self::AllDay),
            0..=1439 => Ok(Self::Minute(cursor as u32)),
            _ => anyhow::bail!("Time cursor out of range: {cursor}"),
        }
    }

    pub fn cursor(&self) -> i32 {
        match self {
            Self::AllDay => -1,
            Self::Minute(minute) => *minute as i32,
        }
    }

    /// Short localized label for the filter, e.g. 870 -> "2:30 PM".
    pub fn label(&self) -> String {
        match self {
            Self::AllDay => "(any time)".to_owned(),
            Self::Minute(minute) => NaiveTime::from_num_seconds_from_midnight_opt(minute * 60, 0)
                .unwrap_or_default()
                .format("%-I:%M %p")
                .to_string(),
        }
    }
}

/// Keeps trips with a start or end minute within the window around the
/// cursor; `AllDay` keeps everything. Order is preserved. The window does
/// not wrap across midnight.
pub fn filter_trips_by_time(trips: &[Trip], filter: TimeFilter) -> Vec<&Trip> {
    match filter {
        TimeFilter::AllDay => trips.iter().collect(),
        TimeFilter::Minute(cursor) => trips
            .iter()
            .filter(|t| {
                t.start_minute().abs_diff(cursor) <= WINDOW_MINUTES
                    || t.end_minute().abs_diff(cursor) <= WINDOW_MINUTES
            })
            .collect(),
    }
}

/// A station with its traffic counters for one trip set.
#[derive(Debug, Clone, PartialEq)]
pub struct StationTraffic {
    pub short_name: StationId,
    pub name: String,
    pub point: Point,
    pub arrivals: usize,
    pub departures: usize,
    pub total_traffic: usize,
}

/// Counts departures and arrivals per station. Every input station yields
/// exactly one output record, in input order, with zero counts when no
/// trips reference it. Trips referencing unknown station ids count toward
/// no station.
pub fn compute_station_traffic(stations: &[Station], trips: &[&Trip]) -> Vec<StationTraffic> {
    let departures = trips.iter().counts_by(|t| t.start_station.clone());
    let arrivals = trips.iter().counts_by(|t| t.end_station.clone());

    stations
        .iter()
        .map(|station| {
            let departures = departures.get(&station.short_name).copied().unwrap_or(0);
            let arrivals = arrivals.get(&station.short_name).copied().unwrap_or(0);

            StationTraffic {
                short_name: station.short_name.clone(),
                name: station.name.clone(),
                point: station.point,
                arrivals,
                departures,
                total_traffic: arrivals + departures,
            }
        })
        .collect()
}

/// Square-root scale from total traffic to a marker radius in pixels.
/// Unfiltered traffic maps into [0, 25]; windowed traffic into [3, 50].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusScale {
    domain_max: f64,
    min_radius: f64,
    max_radius: f64,
}

impl RadiusScale {
    /// Fits the domain to the maximum total traffic of the current station
    /// set and picks the output range from the filter state.
    pub fn fit(traffic: &[StationTraffic], filter: TimeFilter) -> Self {
        let domain_max = traffic
            .iter()
            .map(|t| t.total_traffic)
            .max()
            .unwrap_or(0) as f64;

        let (min_radius, max_radius) = match filter {
            TimeFilter::AllDay => (0.0, 25.0),
            TimeFilter::Minute(_) => (3.0, 50.0),
        };

        Self {
            domain_max,
            min_radius,
            max_radius,
        }
    }

    pub fn radius(&self, total_traffic: usize) -> f64 {
        if self.domain_max == 0.0 {
            return self.min_radius;
        }
        let fraction = (total_traffic as f64 / self.domain_max).sqrt();
        self.min_radius + (self.max_radius - self.min_radius) * fraction
    }
}

/// One station as published to the rendering collaborator.
#[derive(Debug, Clone, Serialize)]
pub struct StationMarker {
    pub short_name: StationId,
    pub name: String,
    #[serde(serialize_with = "geojson::ser::serialize_geometry")]
    pub geometry: Point,
    pub arrivals: usize,
    pub departures: usize,
    pub total_traffic: usize,
    pub radius: f64,
    pub departure_ratio: f64,
    pub tooltip: String,
}

fn tooltip(total_traffic: usize, departures: usize, arrivals: usize) -> String {
    format!("{total_traffic} trips ({departures} departures, {arrivals} arrivals)")
}

// Flow balance for the renderer; a station with no traffic sits at 0.5.
fn departure_ratio(departures: usize, total_traffic: usize) -> f64 {
    if total_traffic == 0 {
        0.5
    } else {
        departures as f64 / total_traffic as f64
    }
}

/// The loaded network plus the recomputation pipeline. Each cursor change
/// runs filter -> aggregate -> fit scale synchronously and returns a fresh
/// marker set; nothing derived is retained between calls.
pub struct TrafficMap {
    network: Network,
}

impl TrafficMap {
    pub fn new(network: Network) -> Self {
        Self { network }
    }

    pub fn station_count(&self) -> usize {
        self.network.stations.len()
    }

    pub fn trip_count(&self) -> usize {
        self.network.trips.len()
    }

    pub fn markers(&self, filter: TimeFilter) -> Vec<StationMarker> {
        let trips = filter_trips_by_time(&self.network.trips, filter);
        let traffic = compute_station_traffic(&self.network.stations, &trips);
        let scale = RadiusScale::fit(&traffic, filter);

        traffic
            .into_iter()
            .map(|t| StationMarker {
                radius: scale.radius(t.total_traffic),
                departure_ratio: departure_ratio(t.departures, t.total_traffic),
                tooltip: tooltip(t.total_traffic, t.departures, t.arrivals),
                short_name: t.short_name,
                name: t.name,
                geometry: t.point,
                arrivals: t.arrivals,
                departures: t.departures,
                total_traffic: t.total_traffic,
            })
            .collect()
    }

    /// The marker set as a GeoJSON FeatureCollection string, one point
    /// feature per station.
    pub fn geojson(&self, filter: TimeFilter) -> anyhow::Result<String> {
        geojson::ser::to_feature_collection_string(&self.markers(filter))
            .context("Failed to serialize markers")
    }
}
