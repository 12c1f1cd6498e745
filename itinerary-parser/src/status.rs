use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::dates::DateRange;
use crate::group::{Occurrence, StayPhase};

/// The "currently staying at" reference propagated from one day's
/// resolution into the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarriedStay {
    pub accommodation_id: String,
    pub name: String,
    pub location_name: Option<String>,
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayStatus {
    pub title: String,
    /// Where you sleep tonight, if anywhere.
    pub staying_at: Option<String>,
    pub timezone: Option<String>,
    pub is_travel_day: bool,
}

fn stay_location(occurrence: &Occurrence) -> String {
    match occurrence {
        Occurrence::Stay {
            name,
            location_name,
            ..
        } => location_name.clone().unwrap_or_else(|| name.clone()),
        Occurrence::Event { .. } => String::new(),
    }
}

fn flight_title(flight: &Occurrence) -> String {
    let Occurrence::Event {
        details: Some(details),
        ..
    } = flight
    else {
        return "Travel Day (Flight)".to_string();
    };

    let mut legs = details.split(" to ");
    match (legs.next(), legs.next(), legs.next()) {
        (Some(origin), Some(destination), None) => format!("Travel: {origin} → {destination}"),
        _ => "Travel Day (Flight)".to_string(),
    }
}

fn free_day_title(occurrences: &[Occurrence]) -> String {
    let first_located_activity = occurrences.iter().find(|occurrence| {
        matches!(
            occurrence,
            Occurrence::Event {
                event_type,
                location_ref: Some(_),
                ..
            } if event_type == "activity"
        )
    });

    match first_located_activity {
        Some(activity) => activity
            .location_name()
            .unwrap_or("Activity Location")
            .to_string(),
        None => "Transition / Free Day".to_string(),
    }
}

/// Resolves a single day from the carried-forward state and the day's
/// occurrences, returning the status together with the state the next day
/// starts from.
///
/// Title precedence, later steps overriding earlier ones: check-out <
/// carried-stay default < check-in < flight < fallback by travel flag.
/// When a check-in and a flight share a day the flight wins the title but
/// the check-in still becomes tomorrow's carry. When one stay checks out
/// and another checks in on the same date, the check-in wins the title and
/// the new stay is carried forward.
pub fn resolve_day(
    carried: Option<&CarriedStay>,
    occurrences: &[Occurrence],
) -> (DayStatus, Option<CarriedStay>) {
    let check_out = occurrences
        .iter()
        .find(|occurrence| occurrence.stay_phase() == Some(StayPhase::CheckOut));
    let check_in = occurrences
        .iter()
        .find(|occurrence| occurrence.stay_phase() == Some(StayPhase::CheckIn));
    let flight = occurrences.iter().find(|occurrence| occurrence.is_flight());

    let mut title: Option<String> = None;
    let mut staying_at = None;
    let mut timezone = None;
    let mut is_travel_day = false;

    if let Some(departure) = check_out {
        title = Some(format!("Departure from {}", stay_location(departure)));
        is_travel_day = true;
    }

    // Yesterday ended in a stay, so tonight defaults to it. This overrides a
    // same-day departure title on purpose: until something else happens you
    // are still "in" that place.
    if let Some(stay) = carried {
        title = Some(
            stay.location_name
                .clone()
                .unwrap_or_else(|| stay.name.clone()),
        );
        staying_at = Some(stay.name.clone());
        timezone = stay.timezone.clone();
    }

    if let Some(arrival) = check_in {
        title = Some(format!("Arrival in {}", stay_location(arrival)));
        is_travel_day = true;
        // No overnight status on the arrival day itself.
        staying_at = None;
    }

    if let Some(flight) = flight {
        is_travel_day = true;
        title = Some(flight_title(flight));
        if check_in.is_none() {
            staying_at = None;
        }
    }

    let title = match title {
        Some(title) => title,
        None if is_travel_day => "Travel Day".to_string(),
        None => free_day_title(occurrences),
    };

    let next = if let Some(Occurrence::Stay {
        accommodation_id,
        name,
        location_name,
        location_timezone,
        ..
    }) = check_in
    {
        Some(CarriedStay {
            accommodation_id: accommodation_id.clone(),
            name: name.clone(),
            location_name: location_name.clone(),
            timezone: location_timezone.clone(),
        })
    } else if check_out.is_some() {
        None
    } else {
        carried.cloned()
    };

    (
        DayStatus {
            title,
            staying_at,
            timezone,
            is_travel_day,
        },
        next,
    )
}

/// Single forward pass over the trip range. Inherently sequential: each
/// day's resolution depends on the previous day's carried state.
pub fn resolve_range(
    start: NaiveDate,
    end: NaiveDate,
    by_date: &BTreeMap<NaiveDate, Vec<Occurrence>>,
) -> BTreeMap<NaiveDate, DayStatus> {
    let mut statuses = BTreeMap::new();
    let mut carried: Option<CarriedStay> = None;

    for date in DateRange::inclusive(start, end) {
        let occurrences = by_date.get(&date).map(Vec::as_slice).unwrap_or(&[]);
        let (status, next) = resolve_day(carried.as_ref(), occurrences);
        statuses.insert(date, status);
        carried = next;
    }

    statuses
}
