use chrono::{NaiveDateTime, Timelike};

use crate::network::station::StationId;

/// A single rental: dock-to-dock with wall-clock start and end times.
#[derive(Debug, Clone)]
pub struct Trip {
    pub start_station: StationId,
    pub end_station: StationId,
    pub started_at: NaiveDateTime,
    pub ended_at: NaiveDateTime,
}

impl Trip {
    pub fn new(
        start_station: StationId,
        end_station: StationId,
        started_at: NaiveDateTime,
        ended_at: NaiveDateTime,
    ) -> Self {
        Self {
            start_station,
            end_station,
            started_at,
            ended_at,
        }
    }

    /// Minute of day the trip departed, seconds discarded.
    pub fn start_minute(&self) -> u32 {
        minute_of_day(self.started_at)
    }

    /// Minute of day the trip arrived, seconds discarded.
    pub fn end_minute(&self) -> u32 {
        minute_of_day(self.ended_at)
    }
}

fn minute_of_day(t: NaiveDateTime) -> u32 {
    t.time().hour() * 60 + t.time().minute()
}
