/// Elapsed share of the trip as a percentage in `[0, 100]`, from epoch
/// millisecond timestamps. A non-positive total duration counts as a
/// finished trip.
pub fn progress_percent(start_utc: i64, end_utc: i64, now_utc: i64) -> f64 {
    let total = end_utc - start_utc;
    if total <= 0 {
        return 100.0;
    }
    let elapsed = now_utc - start_utc;
    (elapsed as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
}

pub fn progress_text(percent: f64) -> String {
    if percent <= 0.0 {
        "Trip hasn't started yet!".to_string()
    } else if percent >= 100.0 {
        "Trip completed!".to_string()
    } else {
        format!("Trip is {percent:.1}% complete.")
    }
}
