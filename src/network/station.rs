use geo_types::Point;
use serde::{Deserialize, Serialize};

/// A station's `short_name` from the feed, e.g. "A32000". Unique per station.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StationId(String);

impl StationId {
    pub fn new(str: &str) -> Self {
        Self(str.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone)]
pub struct Station {
    pub short_name: StationId,
    pub name: String,
    pub point: Point,
}

impl Station {
    pub fn new(short_name: StationId, name: String, lon: f64, lat: f64) -> Self {
        Self {
            short_name,
            name,
            point: Point::new(lon, lat),
        }
    }
}
