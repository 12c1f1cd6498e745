use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use crate::dates::{add_days, parse_iso_date, DateRange};
use crate::structs::{Accommodation, Event, Location};

/// Which part of a stay falls on a given date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StayPhase {
    /// First day (embarkation day for cruises).
    CheckIn,
    /// Intermediate night.
    Night,
    /// The exclusive end date itself (disembarkation day for cruises).
    CheckOut,
}

/// One accommodation or event instance attached to a specific calendar date.
/// Location name and address are resolved once here so later stages never
/// need the location table for display basics.
#[derive(Debug, Clone)]
pub enum Occurrence {
    Stay {
        accommodation_id: String,
        name: String,
        cruise: bool,
        phase: StayPhase,
        location_ref: Option<String>,
        location_name: Option<String>,
        location_address: Option<String>,
        location_timezone: Option<String>,
    },
    Event {
        id: String,
        event_type: String,
        name: Option<String>,
        description: Option<String>,
        details: Option<String>,
        time: Option<String>,
        confirmation: Option<String>,
        notes: Option<String>,
        url: Option<String>,
        tentative: bool,
        location_ref: Option<String>,
        location_name: Option<String>,
        location_address: Option<String>,
    },
}

impl Occurrence {
    /// The wire tag used for icon lookup and item classification, e.g.
    /// `accommodation-check-in`, `cruise-disembark`, `flight`.
    pub fn type_tag(&self) -> &str {
        match self {
            Occurrence::Stay { cruise, phase, .. } => match (cruise, phase) {
                (false, StayPhase::CheckIn) => "accommodation-check-in",
                (false, StayPhase::Night) => "accommodation-stay",
                (false, StayPhase::CheckOut) => "accommodation-check-out",
                (true, StayPhase::CheckIn) => "cruise-embark",
                (true, StayPhase::Night) => "cruise-stay",
                (true, StayPhase::CheckOut) => "cruise-disembark",
            },
            Occurrence::Event { event_type, .. } => event_type,
        }
    }

    pub fn stay_phase(&self) -> Option<StayPhase> {
        match self {
            Occurrence::Stay { phase, .. } => Some(*phase),
            Occurrence::Event { .. } => None,
        }
    }

    pub fn is_flight(&self) -> bool {
        matches!(self, Occurrence::Event { event_type, .. } if event_type == "flight")
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Occurrence::Stay { .. } => None,
            Occurrence::Event { description, .. } => description.as_deref(),
        }
    }

    pub fn location_name(&self) -> Option<&str> {
        match self {
            Occurrence::Stay { location_name, .. }
            | Occurrence::Event { location_name, .. } => location_name.as_deref(),
        }
    }

    pub fn location_address(&self) -> Option<&str> {
        match self {
            Occurrence::Stay {
                location_address, ..
            }
            | Occurrence::Event {
                location_address, ..
            } => location_address.as_deref(),
        }
    }

    pub fn location_ref(&self) -> Option<&str> {
        match self {
            Occurrence::Stay { location_ref, .. } | Occurrence::Event { location_ref, .. } => {
                location_ref.as_deref()
            }
        }
    }

    pub fn is_tentative(&self) -> bool {
        matches!(self, Occurrence::Event { tentative: true, .. })
    }
}

fn resolved_location<'a>(
    locations: &'a HashMap<String, Location>,
    location_ref: Option<&str>,
) -> Option<&'a Location> {
    location_ref.and_then(|key| locations.get(key))
}

/// Expands accommodations and events into per-day occurrence buckets, one
/// (possibly empty) bucket per day of `[start, end]`. Occurrences outside
/// the trip range are dropped; entities with unparseable dates are skipped.
pub fn group_by_date(
    start: NaiveDate,
    end: NaiveDate,
    accommodations: &[Accommodation],
    events: &[Event],
    locations: &HashMap<String, Location>,
) -> BTreeMap<NaiveDate, Vec<Occurrence>> {
    let mut by_date: BTreeMap<NaiveDate, Vec<Occurrence>> = DateRange::inclusive(start, end)
        .map(|date| (date, Vec::new()))
        .collect();

    for accommodation in accommodations {
        let (Some(first), Some(checkout)) = (
            parse_iso_date(&accommodation.start_date),
            parse_iso_date(&accommodation.end_date),
        ) else {
            continue;
        };

        let location = resolved_location(locations, accommodation.location_ref.as_deref());
        let stay = |phase| Occurrence::Stay {
            accommodation_id: accommodation.id.clone(),
            name: accommodation.name.clone(),
            cruise: accommodation.is_cruise(),
            phase,
            location_ref: accommodation.location_ref.clone(),
            location_name: location.map(|loc| loc.name.clone()),
            location_address: location.and_then(|loc| loc.address.clone()),
            location_timezone: location.and_then(|loc| loc.timezone.clone()),
        };

        // Nights run [start, end); the end date itself is the checkout.
        for date in DateRange::inclusive(first, add_days(checkout, -1)) {
            let phase = if date == first {
                StayPhase::CheckIn
            } else {
                StayPhase::Night
            };
            if let Some(bucket) = by_date.get_mut(&date) {
                bucket.push(stay(phase));
            }
        }

        if let Some(bucket) = by_date.get_mut(&checkout) {
            bucket.push(stay(StayPhase::CheckOut));
        }
    }

    for event in events {
        let location = resolved_location(locations, event.location_ref.as_deref());
        let occurrence = Occurrence::Event {
            id: event.id.clone(),
            event_type: event.event_type.clone(),
            name: event.name.clone(),
            description: event.description.clone(),
            details: event.details.clone(),
            time: event.time.clone().or_else(|| event.start_time.clone()),
            confirmation: event.confirmation.clone(),
            notes: event.notes.clone(),
            url: event.url.clone(),
            tentative: event.is_tentative(),
            location_ref: event.location_ref.clone(),
            location_name: location.map(|loc| loc.name.clone()),
            location_address: location.and_then(|loc| loc.address.clone()),
        };

        if let Some(date_raw) = &event.date {
            let Some(date) = parse_iso_date(date_raw) else {
                continue;
            };
            if let Some(bucket) = by_date.get_mut(&date) {
                bucket.push(occurrence);
            }
        } else if let (Some(start_raw), Some(end_raw)) = (&event.start_date, &event.end_date) {
            let (Some(first), Some(last)) =
                (parse_iso_date(start_raw), parse_iso_date(end_raw))
            else {
                continue;
            };
            for date in DateRange::inclusive(first, last) {
                if let Some(bucket) = by_date.get_mut(&date) {
                    bucket.push(occurrence.clone());
                }
            }
        }
    }

    by_date
}
