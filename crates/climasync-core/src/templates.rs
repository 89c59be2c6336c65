//! Bulletin content: the per-city email HTML and SMS text.
//!
//! The email is a base HTML layout whose `<div class="container">` has its
//! content replaced by a temperature/date/city block. The base is either a
//! user-supplied file or the layout bundled with the crate.

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::CoreError;
use crate::weather::Reading;

const BUILTIN_TEMPLATE: &str = include_str!("../assets/clima_template.html");

/// Shown instead of a date when the forecast carries none.
pub const NO_DATE: &str = "Sin fecha";

// ── Dates ───────────────────────────────────────────────────────────

fn parse_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// `2025-03-10T14:00` → `10-03-2025`; unparseable input is returned as-is.
pub fn display_date(raw: Option<&str>) -> String {
    match raw {
        None => NO_DATE.to_owned(),
        Some(raw) => parse_time(raw).map_or_else(
            || raw.to_owned(),
            |t| t.format("%d-%m-%Y").to_string(),
        ),
    }
}

/// `2025-03-10T14:00` → `2025-03-10`, for date fields.
pub fn date_only(raw: &str) -> String {
    parse_time(raw).map_or_else(|| raw.to_owned(), |t| t.format("%Y-%m-%d").to_string())
}

/// Celsius with at least one decimal (`20.0`, `19.5`).
pub fn format_temperature(t: f64) -> String {
    if t.fract().abs() < f64::EPSILON {
        format!("{t:.1}")
    } else {
        t.to_string()
    }
}

// ── SMS ─────────────────────────────────────────────────────────────

pub fn sms_text(city: &str, reading: &Reading) -> String {
    format!(
        "Hola {{contactfield=name}},\nEl clima en {city} el dia de {} es de {}°C",
        display_date(reading.time.as_deref()),
        format_temperature(reading.temperature),
    )
}

// ── Email ───────────────────────────────────────────────────────────

/// Base HTML layout for bulletin emails.
#[derive(Debug, Clone)]
pub struct EmailLayout {
    base: String,
}

impl Default for EmailLayout {
    fn default() -> Self {
        Self {
            base: BUILTIN_TEMPLATE.to_owned(),
        }
    }
}

impl EmailLayout {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    /// Load a layout file; it must contain a container div.
    pub fn from_file(path: &Path) -> Result<Self, CoreError> {
        let base = std::fs::read_to_string(path).map_err(|e| CoreError::Template {
            message: format!("cannot read {}: {e}", path.display()),
        })?;
        if container_span(&base).is_none() {
            return Err(CoreError::Template {
                message: format!("{} has no <div class=\"container\">", path.display()),
            });
        }
        Ok(Self { base })
    }

    /// Configured file when given, the bundled layout otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, CoreError> {
        path.map_or_else(|| Ok(Self::default()), Self::from_file)
    }

    pub fn render(&self, city: &str, reading: &Reading) -> Result<String, CoreError> {
        let block = weather_block(city, reading);
        let (start, end) = container_span(&self.base).ok_or_else(|| CoreError::Template {
            message: "template has no <div class=\"container\">".into(),
        })?;

        let mut html = String::with_capacity(self.base.len() + block.len());
        html.push_str(&self.base[..start]);
        html.push_str(&block);
        html.push_str(&self.base[end..]);
        Ok(html)
    }
}

fn weather_block(city: &str, reading: &Reading) -> String {
    format!(
        r#"
<div style="text-align: center; margin-bottom: 30px">
  <div style="font-size: 48px; color: #e67e22; font-weight: bold; margin-bottom: 5px;">
    <span>{temperature}</span>°C
  </div>
  <div style="color: #95a5a6; font-size: 14px">
    {date}<br />
    {city}
  </div>
</div>
"#,
        temperature = format_temperature(reading.temperature),
        date = display_date(reading.time.as_deref()),
    )
}

// ── Container lookup ────────────────────────────────────────────────

/// Byte range of the inner content of the first `<div>` whose class list
/// contains `container`.
fn container_span(html: &str) -> Option<(usize, usize)> {
    // ASCII lowercasing keeps byte offsets aligned with `html`.
    let lower = html.to_ascii_lowercase();
    let mut from = 0;
    while let Some(start) = next_div_open(&lower, from) {
        let tag_end = start + lower[start..].find('>')?;
        if has_class(&lower[start..tag_end], "container") {
            let inner = tag_end + 1;
            return matching_close(&lower, inner).map(|end| (inner, end));
        }
        from = tag_end + 1;
    }
    None
}

fn next_div_open(lower: &str, from: usize) -> Option<usize> {
    let mut at = from;
    loop {
        let pos = at + lower.get(at..)?.find("<div")?;
        match lower.as_bytes().get(pos + 4) {
            Some(b) if b.is_ascii_whitespace() || *b == b'>' || *b == b'/' => return Some(pos),
            _ => at = pos + 4,
        }
    }
}

fn matching_close(lower: &str, inner: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut at = inner;
    loop {
        let close = at + lower.get(at..)?.find("</div")?;
        match next_div_open(lower, at) {
            Some(open) if open < close => {
                depth += 1;
                at = open + 4;
            }
            _ => {
                depth -= 1;
                if depth == 0 {
                    return Some(close);
                }
                at = close + 5;
            }
        }
    }
}

fn has_class(tag: &str, class: &str) -> bool {
    let Some(pos) = tag
        .match_indices("class=")
        .map(|(pos, _)| pos)
        .find(|&pos| tag[..pos].ends_with(|c: char| c.is_ascii_whitespace()))
    else {
        return false;
    };
    let rest = &tag[pos + "class=".len()..];
    let value = match rest.chars().next() {
        Some(q @ ('"' | '\'')) => rest[1..].split(q).next().unwrap_or(""),
        _ => rest.split_whitespace().next().unwrap_or(""),
    };
    value.split_whitespace().any(|c| c == class)
}
