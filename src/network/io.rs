use anyhow::Context;
use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::network::{
    station::{Station, StationId},
    trip::Trip,
};

/// Reads a feed from a local path or fetches it over HTTP.
pub async fn load_bytes(source: &str) -> anyhow::Result<Vec<u8>> {
    let bytes = if source.starts_with("http") {
        let response = reqwest::get(source)
            .await
            .with_context(|| format!("Failed to fetch {source}"))?
            .error_for_status()?;
        response.bytes().await?.to_vec()
    } else {
        std::fs::read(source).with_context(|| format!("Failed to read {source}"))?
    };
    Ok(bytes)
}

// GBFS station_information wraps the list in {"data": {"stations": [...]}};
// a pre-flattened export is a bare array of the same records.
#[derive(Deserialize)]
#[serde(untagged)]
enum StationFeed {
    Gbfs { data: StationList },
    Flat(Vec<StationRecord>),
}

#[derive(Deserialize)]
struct StationList {
    stations: Vec<StationRecord>,
}

#[derive(Deserialize)]
struct StationRecord {
    short_name: String,
    name: String,
    lon: f64,
    lat: f64,
}

pub fn read_stations(bytes: &[u8]) -> anyhow::Result<Vec<Station>> {
    let feed: StationFeed =
        serde_json::from_slice(bytes).context("Station feed is not valid JSON")?;

    let records = match feed {
        StationFeed::Gbfs { data } => data.stations,
        StationFeed::Flat(records) => records,
    };

    Ok(records
        .into_iter()
        .map(|r| Station::new(StationId::new(&r.short_name), r.name, r.lon, r.lat))
        .collect())
}

#[derive(Deserialize)]
struct TripRecord {
    start_station_id: StationId,
    end_station_id: StationId,
    started_at: String,
    ended_at: String,
}

pub fn read_trips(bytes: &[u8]) -> anyhow::Result<Vec<Trip>> {
    let mut trips = vec![];
    for rec in csv::Reader::from_reader(bytes).deserialize() {
        let rec: TripRecord = rec.context("Malformed trip record")?;

        let started_at = parse_timestamp(&rec.started_at)?;
        let ended_at = parse_timestamp(&rec.ended_at)?;

        trips.push(Trip::new(
            rec.start_station_id,
            rec.end_station_id,
            started_at,
            ended_at,
        ));
    }

    Ok(trips)
}

// Monthly exports have used both a space and a T separator, with or without
// fractional seconds.
fn parse_timestamp(s: &str) -> anyhow::Result<NaiveDateTime> {
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(t);
        }
    }
    anyhow::bail!("Unrecognized timestamp: {s}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stations_from_gbfs_feed() {
        let json = br#"{
            "data": {
                "stations": [
                    {"short_name": "A32000", "name": "Central Square", "lon": -71.10, "lat": 42.36, "capacity": 19},
                    {"short_name": "B32001", "name": "Kendall", "lon": -71.08, "lat": 42.36}
                ]
            }
        }"#;

        let stations = read_stations(json).unwrap();
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].short_name, StationId::new("A32000"));
        assert_eq!(stations[0].name, "Central Square");
        assert_eq!(stations[1].point.x(), -71.08);
    }

    #[test]
    fn stations_from_flat_array() {
        let json = br#"[{"short_name": "A", "name": "One", "lon": -71.0, "lat": 42.0}]"#;

        let stations = read_stations(json).unwrap();
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].short_name, StationId::new("A"));
    }

    #[test]
    fn stations_reject_invalid_json() {
        assert!(read_stations(b"not json").is_err());
    }

    #[test]
    fn trips_from_csv() {
        let csv = b"ride_id,bike_type,started_at,ended_at,start_station_id,end_station_id,is_member\n\
            r1,electric,2024-03-02 08:05:30,2024-03-02 08:20:00,A32000,B32001,true\n\
            r2,classic,2024-03-02T17:45:00,2024-03-02T18:02:10,B32001,A32000,false\n";

        let trips = read_trips(csv).unwrap();
        assert_eq!(trips.len(), 2);
        assert_eq!(trips[0].start_station, StationId::new("A32000"));
        assert_eq!(trips[0].start_minute(), 8 * 60 + 5);
        assert_eq!(trips[1].end_minute(), 18 * 60 + 2);
    }

    #[test]
    fn trips_need_only_the_required_columns() {
        let csv = b"started_at,ended_at,start_station_id,end_station_id\n\
            2024-03-02 08:05:00,2024-03-02 08:20:00,A,B\n";

        let trips = read_trips(csv).unwrap();
        assert_eq!(trips.len(), 1);
    }

    #[test]
    fn trips_reject_bad_timestamp() {
        let csv = b"started_at,ended_at,start_station_id,end_station_id\n\
            yesterday,2024-03-02 08:20:00,A,B\n";

        assert!(read_trips(csv).is_err());
    }

    #[test]
    fn timestamps_with_fractional_seconds() {
        let t = parse_timestamp("2024-03-02 08:05:30.123").unwrap();
        assert_eq!(t.and_utc().timestamp_subsec_millis(), 123);
    }
}
