use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::dates::{format_iso_date, parse_trip_dates};
use crate::error::Error;
use crate::group::group_by_date;
use crate::progress::{progress_percent, progress_text};
use crate::status::resolve_range;
use crate::structs::{Location, TripDocument};
use crate::structure::{structure_weeks, WeekView};

/// The complete display-ready state handed to the presentation layer: the
/// structured weeks plus trip metadata, UI toggle defaults and the derived
/// progress fields. Built once per document load; only [`TripView::refresh_now`]
/// mutates it afterwards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripView {
    pub trip_title: String,
    pub trip_dates: String,
    /// Epoch milliseconds, noon-anchored; `None` in the error state.
    pub trip_start_utc: Option<i64>,
    pub trip_end_utc: Option<i64>,
    pub weeks: Vec<WeekView>,
    pub locations: HashMap<String, Location>,
    pub loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub today_date_string: String,
    /// All weeks and days start open.
    pub open_week_ids: Vec<String>,
    pub open_day_ids: Vec<String>,
    pub now_utc: i64,
    pub progress_percent: f64,
    pub progress_text: String,
}

impl TripView {
    /// Runs the whole pipeline: trip date parsing, per-day grouping, the
    /// daily status fold and week structuring.
    pub fn build(
        doc: &TripDocument,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<TripView, Error> {
        let trip = parse_trip_dates(&doc.trip_dates)?;

        let by_date = group_by_date(
            trip.start,
            trip.end,
            &doc.accommodations,
            &doc.events,
            &doc.locations,
        );
        let statuses = resolve_range(trip.start, trip.end, &by_date);
        let weeks = structure_weeks(
            trip.start,
            trip.end,
            &doc.weeks,
            &by_date,
            &statuses,
            &doc.locations,
        );

        let open_week_ids = weeks.iter().map(|week| week.id.clone()).collect();
        let open_day_ids = weeks
            .iter()
            .flat_map(|week| week.days.iter().map(|day| format_iso_date(day.date)))
            .collect();

        let start_ms = trip.start_utc.timestamp_millis();
        let end_ms = trip.end_utc.timestamp_millis();
        let now_ms = now.timestamp_millis();
        let percent = progress_percent(start_ms, end_ms, now_ms);

        Ok(TripView {
            trip_title: doc.trip_title.clone(),
            trip_dates: doc.trip_dates.clone(),
            trip_start_utc: Some(start_ms),
            trip_end_utc: Some(end_ms),
            weeks,
            locations: doc.locations.clone(),
            loading: false,
            error: None,
            today_date_string: format_iso_date(today),
            open_week_ids,
            open_day_ids,
            now_utc: now_ms,
            progress_percent: percent,
            progress_text: progress_text(percent),
        })
    }

    /// The terminal state for a failed load attempt: an error banner and an
    /// empty itinerary. Never retried automatically.
    pub fn error_view(message: &str, today: NaiveDate, now: DateTime<Utc>) -> TripView {
        TripView {
            trip_title: "Error Loading Trip".to_string(),
            trip_dates: String::new(),
            trip_start_utc: None,
            trip_end_utc: None,
            weeks: Vec::new(),
            locations: HashMap::new(),
            loading: false,
            error: Some(format!("Failed to load itinerary: {message}")),
            today_date_string: format_iso_date(today),
            open_week_ids: Vec::new(),
            open_day_ids: Vec::new(),
            now_utc: now.timestamp_millis(),
            progress_percent: 0.0,
            progress_text: progress_text(0.0),
        }
    }

    /// The periodic clock tick: reassigns `now` and the progress fields
    /// derived from it, nothing else.
    pub fn refresh_now(&mut self, now: DateTime<Utc>) {
        self.now_utc = now.timestamp_millis();
        if let (Some(start), Some(end)) = (self.trip_start_utc, self.trip_end_utc) {
            self.progress_percent = progress_percent(start, end, self.now_utc);
            self.progress_text = progress_text(self.progress_percent);
        }
    }
}
