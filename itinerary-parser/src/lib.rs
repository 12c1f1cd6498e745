mod dates;
mod error;
mod group;
mod icons;
mod progress;
mod status;
mod structs;
mod structure;
mod view;

pub use dates::{
    add_days, day_name, format_iso_date, parse_iso_date, parse_trip_dates, DateRange, TripDates,
};
pub use error::Error;
pub use group::{group_by_date, Occurrence, StayPhase};
pub use icons::icon_for;
pub use progress::{progress_percent, progress_text};
pub use status::{resolve_day, resolve_range, CarriedStay, DayStatus};
pub use structs::{Accommodation, Event, Location, TripDocument, Week};
pub use structure::{structure_weeks, DayView, ItemView, WeekView};
pub use view::TripView;
