/// Per-type default icons (Font Awesome classes).
const TYPE_ICONS: &[(&str, &str)] = &[
    ("flight", "fas fa-plane-departure"),
    ("accommodation-check-in", "fas fa-sign-in-alt"),
    ("accommodation-check-out", "fas fa-sign-out-alt"),
    ("accommodation-stay", "fas fa-bed"),
    ("hotel", "fas fa-hotel"),
    ("airbnb", "fas fa-home"),
    ("cruise-embark", "fas fa-ship"),
    ("cruise-disembark", "fas fa-anchor"),
    ("cruise-stay", "fas fa-ship"),
    ("port-call", "fas fa-map-marked-alt"),
    ("sea-day", "fas fa-water"),
    ("car-rental", "fas fa-car"),
    ("activity", "fas fa-calendar-check"),
    ("shopping", "fas fa-shopping-bag"),
    ("meal", "fas fa-utensils"),
    ("park", "fas fa-tree"),
    ("gardens", "fas fa-leaf"),
    ("race", "fas fa-flag-checkered"),
    ("visit", "fas fa-landmark"),
    ("explore", "fas fa-binoculars"),
    ("travel", "fas fa-suitcase-rolling"),
    ("other", "fas fa-info-circle"),
];

const FALLBACK: &str = "fas fa-info-circle";

fn type_icon(tag: &str) -> Option<&'static str> {
    TYPE_ICONS
        .iter()
        .find(|(key, _)| *key == tag)
        .map(|(_, icon)| *icon)
}

/// Resolves the display icon for an item. Description keywords take
/// precedence over the per-type default, which in turn beats the looser
/// type-prefix fallbacks; anything unmatched gets the generic info icon.
pub fn icon_for(event_type: &str, description: Option<&str>) -> &'static str {
    let tag = event_type.to_lowercase();
    let description = description.unwrap_or("").to_lowercase();

    if description.contains("disney") || description.contains("theme park") {
        return "fas fa-magic";
    }
    if description.contains("stadium")
        || description.contains("match")
        || description.contains("game")
    {
        return "fas fa-futbol";
    }
    if description.contains("capitol") {
        return "fas fa-landmark";
    }
    if description.contains("garden") {
        return "fas fa-leaf";
    }
    if description.contains("park") && !description.contains("shopping") {
        return "fas fa-tree";
    }
    if description.contains("shopping") {
        return "fas fa-shopping-bag";
    }
    if description.contains("race") {
        return "fas fa-flag-checkered";
    }

    if let Some(icon) = type_icon(&tag) {
        return icon;
    }

    // Variations such as `car-rental-pickup` or bare accommodation types.
    if tag.starts_with("car-rental") {
        return "fas fa-car";
    }
    if tag.starts_with("accommodation") {
        return "fas fa-bed";
    }
    if tag.starts_with("cruise") {
        return "fas fa-ship";
    }
    if tag.contains("explore") {
        return "fas fa-binoculars";
    }
    if tag.contains("visit") {
        return "fas fa-landmark";
    }

    FALLBACK
}
