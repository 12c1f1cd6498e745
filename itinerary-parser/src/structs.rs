use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The itinerary document as fetched, before any date parsing. Entity dates
/// stay as strings here so that a single malformed entry can be skipped later
/// instead of failing deserialization of the whole document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripDocument {
    #[serde(default = "default_trip_title")]
    pub trip_title: String,
    /// `"<MonthName> <Day> - <MonthName> <Day>, <Year>"`
    pub trip_dates: String,
    #[serde(default)]
    pub locations: HashMap<String, Location>,
    #[serde(default)]
    pub accommodations: Vec<Accommodation>,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub weeks: Vec<Week>,
}

fn default_trip_title() -> String {
    "Trip Agenda".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

/// A continuous stay. `end_date` is the checkout (or disembark) date, one
/// past the last night.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accommodation {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub location_ref: Option<String>,
}

impl Accommodation {
    pub fn is_cruise(&self) -> bool {
        self.kind.as_deref() == Some("cruise")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    /// Free-form tag: `flight`, `activity`, `port-call`, `car-rental-pickup`, ...
    #[serde(rename = "type")]
    pub event_type: String,
    /// Single-day events carry `date`; ranged events carry both
    /// `start_date` and `end_date` (inclusive).
    pub date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub location_ref: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub details: Option<String>,
    pub time: Option<String>,
    pub start_time: Option<String>,
    pub confirmation: Option<String>,
    pub notes: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub tentative: bool,
    pub certainty: Option<String>,
}

impl Event {
    pub fn is_tentative(&self) -> bool {
        self.tentative || self.certainty.as_deref() == Some("tentative")
    }
}

/// Partitions the trip's date range; both bounds inclusive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Week {
    pub id: String,
    pub week_header: String,
    pub start_date: String,
    pub end_date: String,
}
