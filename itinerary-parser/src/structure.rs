use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

use crate::dates::{day_name, format_iso_date, parse_iso_date, DateRange};
use crate::group::{Occurrence, StayPhase};
use crate::icons::icon_for;
use crate::status::DayStatus;
use crate::structs::{Location, Week};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekView {
    pub id: String,
    pub header: String,
    pub days: Vec<DayView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayView {
    pub date: NaiveDate,
    /// 1-based position within the whole trip.
    pub day_number: u32,
    pub day_name: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staying_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    pub confirmed: Vec<ItemView>,
    pub tentative: Vec<ItemView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub id: String,
    pub event_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    pub display_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    pub formatted_location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_url: Option<String>,
    pub icon: String,
    pub check_in_out: bool,
}

struct WeekSpan<'a> {
    week: &'a Week,
    start: NaiveDate,
    end: NaiveDate,
}

fn strip_prefix_ci<'a>(text: &'a str, prefix: &str) -> &'a str {
    match text.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => &text[prefix.len()..],
        _ => text,
    }
}

fn strip_suffix_ci<'a>(text: &'a str, suffix: &str) -> &'a str {
    match text.len().checked_sub(suffix.len()).map(|at| text.get(at..)) {
        Some(Some(tail)) if tail.eq_ignore_ascii_case(suffix) => &text[..text.len() - suffix.len()],
        _ => text,
    }
}

/// An activity whose description is a trivial restatement of the day's
/// title ("Explore Rome Area" on a day titled "Rome") adds nothing and is
/// hidden from the item list.
fn is_generic_explore(description: Option<&str>, day_title: &str) -> bool {
    let Some(description) = description else {
        return false;
    };

    let cleaned = strip_suffix_ci(strip_prefix_ci(description, "Explore "), " Area").trim();
    let cleaned_title = strip_suffix_ci(day_title, " Area").trim();

    !cleaned_title.is_empty() && cleaned.eq_ignore_ascii_case(cleaned_title)
}

/// `"<name>, <country> (<details>)"` with whitespace after newlines
/// collapsed, address left out (it feeds the map link instead).
fn format_location(location: Option<&Location>) -> String {
    let Some(location) = location else {
        return String::new();
    };

    let mut text = location.name.clone();
    if let Some(country) = &location.country {
        text.push_str(", ");
        text.push_str(country);
    }
    if let Some(details) = &location.details {
        text.push_str(" (");
        text.push_str(details);
        text.push(')');
    }

    collapse_newline_runs(&text)
}

fn collapse_newline_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(current) = chars.next() {
        out.push(current);
        if current == '\n' {
            while chars.peek().is_some_and(|next| next.is_whitespace()) {
                chars.next();
            }
        }
    }
    out
}

const MAPS_SEARCH: &str = "https://www.google.com/maps/search/?api=1&query=";

fn build_item(occurrence: &Occurrence, locations: &HashMap<String, Location>) -> ItemView {
    let location = occurrence
        .location_ref()
        .and_then(|key| locations.get(key));

    let location_name = occurrence
        .location_name()
        .map(str::to_string)
        .or_else(|| location.map(|loc| loc.name.clone()));
    let address = occurrence
        .location_address()
        .map(str::to_string)
        .or_else(|| location.and_then(|loc| loc.address.clone()));

    // Any location text at all earns a map link; prefer the address.
    let map_url = address
        .as_deref()
        .or(location_name.as_deref())
        .map(|query| format!("{MAPS_SEARCH}{}", urlencoding::encode(query)));

    match occurrence {
        Occurrence::Stay {
            accommodation_id,
            name,
            phase,
            ..
        } => ItemView {
            id: accommodation_id.clone(),
            event_type: occurrence.type_tag().to_string(),
            time: None,
            display_description: name.clone(),
            location_name,
            formatted_location: format_location(location),
            confirmation: None,
            notes: None,
            url: None,
            map_url,
            icon: icon_for(occurrence.type_tag(), None).to_string(),
            check_in_out: !matches!(phase, StayPhase::Night),
        },
        Occurrence::Event {
            id,
            event_type,
            name,
            description,
            time,
            confirmation,
            notes,
            url,
            ..
        } => ItemView {
            id: id.clone(),
            event_type: event_type.clone(),
            time: time.clone(),
            display_description: description
                .clone()
                .or_else(|| name.clone())
                .unwrap_or_default(),
            location_name,
            formatted_location: format_location(location),
            confirmation: confirmation.clone(),
            notes: notes.clone(),
            url: url.clone(),
            map_url,
            icon: icon_for(event_type, description.as_deref()).to_string(),
            check_in_out: false,
        },
    }
}

/// Joins per-day occurrences and statuses against the week definitions into
/// the final ordered week/day tree. A date no week definition covers is
/// never dropped: consecutive uncovered days are collected into a synthetic
/// "Unscheduled Days" week.
pub fn structure_weeks(
    start: NaiveDate,
    end: NaiveDate,
    weeks: &[Week],
    by_date: &BTreeMap<NaiveDate, Vec<Occurrence>>,
    statuses: &BTreeMap<NaiveDate, DayStatus>,
    locations: &HashMap<String, Location>,
) -> Vec<WeekView> {
    let spans: Vec<WeekSpan> = weeks
        .iter()
        .filter_map(|week| {
            Some(WeekSpan {
                week,
                start: parse_iso_date(&week.start_date)?,
                end: parse_iso_date(&week.end_date)?,
            })
        })
        .collect();

    let mut result: Vec<WeekView> = Vec::new();
    let mut in_synthetic = false;
    let mut day_number = 0;

    for date in DateRange::inclusive(start, end) {
        day_number += 1;
        let Some(status) = statuses.get(&date) else {
            continue;
        };

        let matched = spans
            .iter()
            .find(|span| date >= span.start && date <= span.end);

        let needs_new_week = match (matched, result.last()) {
            (_, None) => true,
            (Some(span), Some(last)) => last.id != span.week.id,
            (None, Some(_)) => !in_synthetic,
        };

        if needs_new_week {
            let week = match matched {
                Some(span) => WeekView {
                    id: span.week.id.clone(),
                    header: span.week.week_header.clone(),
                    days: Vec::new(),
                },
                None => {
                    warn!("no week definition covers {date}, opening a synthetic week");
                    WeekView {
                        id: format!("unscheduled-{}", format_iso_date(date)),
                        header: "Unscheduled Days".to_string(),
                        days: Vec::new(),
                    }
                }
            };
            in_synthetic = matched.is_none();
            result.push(week);
        } else {
            in_synthetic = matched.is_none() && in_synthetic;
        }

        let mut confirmed = Vec::new();
        let mut tentative = Vec::new();
        for occurrence in by_date.get(&date).map(Vec::as_slice).unwrap_or(&[]) {
            // Intermediate nights are already shown through `staying_at`.
            if occurrence.stay_phase() == Some(StayPhase::Night) {
                continue;
            }
            if is_generic_explore(occurrence.description(), &status.title) {
                continue;
            }

            let item = build_item(occurrence, locations);
            if occurrence.is_tentative() {
                tentative.push(item);
            } else {
                confirmed.push(item);
            }
        }

        let day = DayView {
            date,
            day_number,
            day_name: day_name(date),
            title: status.title.clone(),
            staying_at: status.staying_at.clone(),
            timezone: status.timezone.clone(),
            confirmed,
            tentative,
        };

        if let Some(current) = result.last_mut() {
            current.days.push(day);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::resolve_range;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, day).unwrap()
    }

    fn week(id: &str, start: u32, end: u32) -> Week {
        Week {
            id: id.to_string(),
            week_header: format!("Week {id}"),
            start_date: format_iso_date(date(start)),
            end_date: format_iso_date(date(end)),
        }
    }

    fn event(id: &str, event_type: &str, description: Option<&str>) -> Occurrence {
        Occurrence::Event {
            id: id.to_string(),
            event_type: event_type.to_string(),
            name: None,
            description: description.map(str::to_string),
            details: None,
            time: None,
            confirmation: None,
            notes: None,
            url: None,
            tentative: false,
            location_ref: None,
            location_name: None,
            location_address: None,
        }
    }

    fn structure(
        start: NaiveDate,
        end: NaiveDate,
        weeks: &[Week],
        by_date: BTreeMap<NaiveDate, Vec<Occurrence>>,
    ) -> Vec<WeekView> {
        let statuses = resolve_range(start, end, &by_date);
        structure_weeks(start, end, weeks, &by_date, &statuses, &HashMap::new())
    }

    #[test]
    fn generic_explore_suppression() {
        assert!(is_generic_explore(Some("Explore Rome Area"), "Rome"));
        assert!(is_generic_explore(Some("explore rome"), "Rome"));
        assert!(is_generic_explore(Some("Rome"), "Rome Area"));
        assert!(!is_generic_explore(Some("Explore Rome Area"), "Florence"));
        assert!(!is_generic_explore(Some("Explore the Rome Area"), "Rome"));
        assert!(!is_generic_explore(None, "Rome"));
    }

    #[test]
    fn explore_items_filtered_by_day_title() {
        let mut by_date = BTreeMap::new();
        by_date.insert(
            date(1),
            vec![
                event("explore", "activity", Some("Explore Rome Area")),
                event("museum", "activity", Some("Vatican Museums")),
            ],
        );

        let weeks = structure(date(1), date(1), &[week("w1", 1, 7)], by_date);
        let day = &weeks[0].days[0];

        // Day title is "Transition / Free Day", so "Explore Rome Area"
        // survives; retitle the day to "Rome" and it would not.
        assert_eq!(day.confirmed.len(), 2);

        let mut by_date = BTreeMap::new();
        let rome_stay = Occurrence::Stay {
            accommodation_id: "rome".to_string(),
            name: "Hotel Roma".to_string(),
            cruise: false,
            phase: StayPhase::CheckIn,
            location_ref: None,
            location_name: Some("Rome".to_string()),
            location_address: None,
            location_timezone: None,
        };
        by_date.insert(date(1), vec![rome_stay.clone()]);
        by_date.insert(
            date(2),
            vec![event("explore", "activity", Some("Explore Rome Area"))],
        );

        let weeks = structure(date(1), date(2), &[week("w1", 1, 7)], by_date);
        // Day 2 is titled "Rome" via the carried stay, so the explore
        // activity is suppressed.
        assert_eq!(weeks[0].days[1].title, "Rome");
        assert!(weeks[0].days[1].confirmed.is_empty());
    }

    #[test]
    fn night_stays_are_not_items() {
        let stay = |phase| Occurrence::Stay {
            accommodation_id: "rome".to_string(),
            name: "Hotel Roma".to_string(),
            cruise: false,
            phase,
            location_ref: None,
            location_name: Some("Rome".to_string()),
            location_address: None,
            location_timezone: None,
        };

        let mut by_date = BTreeMap::new();
        by_date.insert(date(1), vec![stay(StayPhase::CheckIn)]);
        by_date.insert(date(2), vec![stay(StayPhase::Night)]);
        by_date.insert(date(3), vec![stay(StayPhase::CheckOut)]);

        let weeks = structure(date(1), date(3), &[week("w1", 1, 7)], by_date);
        let days = &weeks[0].days;

        assert_eq!(days[0].confirmed.len(), 1);
        assert!(days[0].confirmed[0].check_in_out);
        assert!(days[1].confirmed.is_empty());
        assert_eq!(days[1].staying_at.as_deref(), Some("Hotel Roma"));
        assert_eq!(days[2].confirmed.len(), 1);
        assert_eq!(days[2].confirmed[0].event_type, "accommodation-check-out");
    }

    #[test]
    fn tentative_items_split_out() {
        let mut tentative = event("maybe", "activity", Some("Day trip"));
        if let Occurrence::Event {
            tentative: flag, ..
        } = &mut tentative
        {
            *flag = true;
        }

        let mut by_date = BTreeMap::new();
        by_date.insert(
            date(1),
            vec![event("sure", "activity", Some("Museum")), tentative],
        );

        let weeks = structure(date(1), date(1), &[week("w1", 1, 7)], by_date);
        let day = &weeks[0].days[0];
        assert_eq!(day.confirmed.len(), 1);
        assert_eq!(day.confirmed[0].id, "sure");
        assert_eq!(day.tentative.len(), 1);
        assert_eq!(day.tentative[0].id, "maybe");
    }

    #[test]
    fn weeks_change_with_definitions() {
        let by_date: BTreeMap<NaiveDate, Vec<Occurrence>> =
            DateRange::inclusive(date(1), date(10)).map(|d| (d, Vec::new())).collect();

        let weeks = structure(
            date(1),
            date(10),
            &[week("w1", 1, 7), week("w2", 8, 14)],
            by_date,
        );

        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[0].id, "w1");
        assert_eq!(weeks[0].days.len(), 7);
        assert_eq!(weeks[1].id, "w2");
        assert_eq!(weeks[1].days.len(), 3);
        assert_eq!(weeks[1].days[0].day_number, 8);
        assert_eq!(weeks[1].days[0].day_name, day_name(date(8)));
    }

    #[test]
    fn uncovered_days_get_a_synthetic_week() {
        let by_date: BTreeMap<NaiveDate, Vec<Occurrence>> =
            DateRange::inclusive(date(1), date(6)).map(|d| (d, Vec::new())).collect();

        // w1 covers days 1-2 and w2 covers 5-6, leaving a two-day gap.
        let weeks = structure(
            date(1),
            date(6),
            &[week("w1", 1, 2), week("w2", 5, 6)],
            by_date,
        );

        assert_eq!(weeks.len(), 3);
        assert_eq!(weeks[1].id, "unscheduled-2025-04-03");
        assert_eq!(weeks[1].header, "Unscheduled Days");
        assert_eq!(weeks[1].days.len(), 2);
        assert_eq!(weeks[2].id, "w2");
    }

    #[test]
    fn item_enrichment_with_location() {
        let mut locations = HashMap::new();
        locations.insert(
            "rome".to_string(),
            Location {
                name: "Rome".to_string(),
                address: Some("Piazza Navona 1, Rome".to_string()),
                country: Some("Italy".to_string()),
                details: Some("historic center".to_string()),
                timezone: None,
            },
        );

        let mut museum = event("museum", "activity", Some("Vatican Museums"));
        if let Occurrence::Event {
            location_ref,
            location_name,
            location_address,
            ..
        } = &mut museum
        {
            *location_ref = Some("rome".to_string());
            *location_name = Some("Rome".to_string());
            *location_address = Some("Piazza Navona 1, Rome".to_string());
        }

        let by_date = BTreeMap::from([(date(1), vec![museum])]);
        let statuses = resolve_range(date(1), date(1), &by_date);
        let weeks = structure_weeks(
            date(1),
            date(1),
            &[week("w1", 1, 7)],
            &by_date,
            &statuses,
            &locations,
        );

        let item = &weeks[0].days[0].confirmed[0];
        assert_eq!(item.formatted_location, "Rome, Italy (historic center)");
        assert_eq!(
            item.map_url.as_deref(),
            Some("https://www.google.com/maps/search/?api=1&query=Piazza%20Navona%201%2C%20Rome")
        );
        assert_eq!(item.icon, "fas fa-calendar-check");
        assert_eq!(item.display_description, "Vatican Museums");
    }

    #[test]
    fn map_url_falls_back_to_name() {
        let mut museum = event("museum", "activity", None);
        if let Occurrence::Event { location_name, .. } = &mut museum {
            *location_name = Some("Rome".to_string());
        }

        let by_date = BTreeMap::from([(date(1), vec![museum])]);
        let weeks = structure(date(1), date(1), &[week("w1", 1, 7)], by_date);
        let item = &weeks[0].days[0].confirmed[0];

        assert_eq!(
            item.map_url.as_deref(),
            Some("https://www.google.com/maps/search/?api=1&query=Rome")
        );
        // No location at all means no link.
        let by_date = BTreeMap::from([(date(1), vec![event("x", "activity", None)])]);
        let weeks = structure(date(1), date(1), &[week("w1", 1, 7)], by_date);
        assert_eq!(weeks[0].days[0].confirmed[0].map_url, None);
    }
}
