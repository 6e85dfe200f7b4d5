use chrono::NaiveTime;

use crate::domain::types::{Constraints, PackageId};
use crate::error::SimError;

/// Derives constraints from a package's free-form notes. A keyword without a
/// usable value yields a warning and leaves that constraint unset.
pub fn parse_notes(package_id: PackageId, notes: &str) -> (Constraints, Vec<SimError>) {
    let lower = notes.to_lowercase();
    let mut constraints = Constraints::default();
    let mut warnings = vec![];

    let unparseable = |field: &'static str| SimError::UnparseableConstraint {
        package_id,
        field,
        text: notes.to_string(),
    };

    if let Some(rest) = after(&lower, "truck ") {
        let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
        match digits.parse() {
            Ok(vehicle) => constraints.vehicle = Some(vehicle),
            Err(_) => warnings.push(unparseable("vehicle restriction")),
        }
    }

    if let Some(rest) = after(&lower, "must be delivered with ") {
        let list: String = rest
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == ',' || *c == ' ')
            .collect();
        let ids: Vec<PackageId> = list
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .filter(|id| *id != package_id)
            .collect();
        if ids.is_empty() {
            warnings.push(unparseable("grouped-with"));
        } else {
            constraints.grouped_with = ids;
        }
    }

    if lower.contains("until") {
        match after(&lower, "until ").and_then(parse_meridiem_time) {
            Some(t) => constraints.delayed_until = Some(t),
            None => warnings.push(unparseable("delayed-until")),
        }
    }

    (constraints, warnings)
}

/// `EOD` and blank mean no deadline.
pub fn parse_deadline(package_id: PackageId, raw: &str) -> (Option<NaiveTime>, Option<SimError>) {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("eod") {
        return (None, None);
    }
    match parse_meridiem_time(trimmed) {
        Some(t) => (Some(t), None),
        None => (
            None,
            Some(SimError::UnparseableConstraint {
                package_id,
                field: "deadline",
                text: raw.to_string(),
            }),
        ),
    }
}

/// Parses the leading `h:mm am` / `h:mmpm` of `text`.
fn parse_meridiem_time(text: &str) -> Option<NaiveTime> {
    let lower = text.trim_start().to_lowercase();
    let end = ["am", "pm"]
        .iter()
        .filter_map(|m| lower.find(m).map(|i| i + m.len()))
        .min()?;
    let compact: String = lower[..end].chars().filter(|c| !c.is_whitespace()).collect();
    NaiveTime::parse_from_str(&compact.to_uppercase(), "%I:%M%p").ok()
}

fn after<'a>(haystack: &'a str, needle: &str) -> Option<&'a str> {
    haystack.find(needle).map(|i| &haystack[i + needle.len()..])
}
