use std::{borrow::Cow, collections::BTreeMap};

use chrono::NaiveTime;
use validator::ValidationError;

use crate::models::Role;

pub const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("blank", "must not be empty"));
    }
    Ok(())
}

/// Digits with optional leading `+` and common separators, 7 to 15 digits.
pub fn phone_number(value: &str) -> Result<(), ValidationError> {
    let body = value.trim().strip_prefix('+').unwrap_or(value.trim());
    let allowed = body
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'));
    let digits = body.chars().filter(char::is_ascii_digit).count();
    if !allowed || !(7..=15).contains(&digits) {
        return Err(invalid("phone", "Valid phone number is required"));
    }
    Ok(())
}

pub fn self_assignable_role(role: &Role) -> Result<(), ValidationError> {
    match role {
        Role::Client | Role::Lawyer => Ok(()),
        Role::Admin => Err(invalid("role", "Invalid role")),
    }
}

/// Parse the start of a slot label such as `10:00`, `10:00-11:00` or `2:30 PM`.
pub fn slot_start(slot: &str) -> Option<NaiveTime> {
    let start = slot.split('-').next()?.trim();
    NaiveTime::parse_from_str(start, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(start, "%I:%M %p"))
        .ok()
}

pub fn weekly_availability(value: &BTreeMap<String, Vec<String>>) -> Result<(), ValidationError> {
    for (day, slots) in value {
        if !WEEKDAYS.contains(&day.to_lowercase().as_str()) {
            return Err(invalid("day_of_week", "Unknown day of week"));
        }
        if slots.iter().any(|slot| slot.trim().is_empty()) {
            return Err(invalid("time_slot", "Time slots must not be empty"));
        }
    }
    Ok(())
}

pub fn tag_list(value: &[String]) -> Result<(), ValidationError> {
    if value.iter().any(|tag| tag.trim().is_empty()) {
        return Err(invalid("tags", "Tags must not be empty"));
    }
    Ok(())
}
