//! Conversion of raw agent strings into numbers.
//!
//! Every function here is total: unparsable input yields `None`, never a panic.

const CENTIGRADE_MARKER: &str = "Centigrade:";
const MAX_UNIT_LEN: usize = 3;

/// Parses a number written with either `.` or `,` as the decimal separator.
///
/// With both present, `.` groups thousands and `,` is decimal (`1.234,56`).
/// Units and other decoration are stripped, keeping a leading minus and one point.
pub fn parse_number(raw: &str) -> Option<f64> {
    let normalized = normalize_separators(raw.trim());

    let mut cleaned = String::with_capacity(normalized.len());
    let mut seen_point = false;
    for ch in normalized.chars() {
        match ch {
            '0'..='9' => cleaned.push(ch),
            '-' if cleaned.is_empty() => cleaned.push(ch),
            '.' if !seen_point => {
                seen_point = true;
                cleaned.push(ch);
            }
            _ => {}
        }
    }

    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses values that are a number as a whole, optionally followed by a short unit
/// (`42 %`, `3726.02 GB`, `-12.5 C`).
///
/// Version strings, identifiers and status text with embedded digits yield `None`.
pub fn parse_strict_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | ',')))
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);

    if number.is_empty() || !is_unit(unit.trim_start()) {
        return None;
    }

    normalize_separators(number)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn is_unit(suffix: &str) -> bool {
    suffix.chars().count() <= MAX_UNIT_LEN
        && suffix.chars().all(|c| c.is_alphabetic() || c == '%' || c == '°')
}

// with both separators present `.` groups thousands
fn normalize_separators(value: &str) -> String {
    match (value.contains('.'), value.contains(',')) {
        (true, true) => value.replace('.', "").replace(',', "."),
        (false, true) => value.replace(',', "."),
        _ => value.to_string(),
    }
}

/// Disk temperatures arrive as `Centigrade:48 \tFahrenheit:118`, the system one as a plain number.
pub fn parse_vendor_temperature(raw: &str) -> Option<f64> {
    if let Some(pos) = raw.find(CENTIGRADE_MARKER) {
        let digits: String = raw[pos + CENTIGRADE_MARKER.len()..]
            .trim_start()
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        if let Ok(celsius) = digits.parse::<f64>() {
            return Some(celsius);
        }
    }

    parse_number(raw)
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
