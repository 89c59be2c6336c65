//! Names of the per-city artifacts.
//!
//! Contacts store their cities as one `-`-joined string (`"Lima, Peru-Cusco"`).
//! Segment, template and campaign names use the short city label: the text
//! before the first comma.

use crate::normalize::LIST_SEPARATOR;

/// Split a stored cities value into trimmed, non-empty entries.
pub fn split_cities(raw: &str) -> Vec<String> {
    raw.split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_owned)
        .collect()
}

/// `"Lima, Peru"` → `"Lima"`.
pub fn city_label(city: &str) -> &str {
    city.split(',').next().unwrap_or(city).trim()
}

pub fn segment_name(prefix: &str, city: &str) -> String {
    format!("{prefix} - {}", city_label(city))
}

pub fn template_name(prefix: &str, city: &str) -> String {
    format!("{prefix} - {}", city_label(city))
}

pub fn segment_description(city: &str) -> String {
    format!(
        "Segmento de contactos interesados en el clima de {}",
        city_label(city)
    )
}

/// The city a segment was derived for, if the name carries the prefix.
pub fn city_from_segment<'a>(prefix: &str, name: &'a str) -> Option<&'a str> {
    let city = name.strip_prefix(prefix)?.strip_prefix(" - ")?.trim();
    if city.is_empty() { None } else { Some(city) }
}

/// `(city, segment name)` pairs, keeping the first city per distinct label.
pub fn segment_names(prefix: &str, cities: &[String]) -> Vec<(String, String)> {
    let mut named: Vec<(String, String)> = Vec::new();
    for city in cities {
        let name = segment_name(prefix, city);
        if named.iter().all(|(_, n)| *n != name) {
            named.push((city.clone(), name));
        }
    }
    named
}
