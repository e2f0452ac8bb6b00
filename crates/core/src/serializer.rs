//! Validation and shaping of user payloads.
//!
//! Both entry points are pure: raw JSON in, either a validated value or the
//! complete list of field errors out. Unknown fields are ignored.

use core::ops::RangeInclusive;

use serde_json::{Map, Value};

use crate::error::{NON_FIELD_ERRORS, ValidationErrors};
use crate::{NewUser, Nickname, User, UserChanges};

pub const NAME_MAX_LEN: usize = 255;
pub const AGE_RANGE: RangeInclusive<i64> = 0..=150;
pub const PASSWORD_LEN: RangeInclusive<usize> = 8..=128;

const REQUIRED: &str = "This field is required.";
const NOT_NULL: &str = "This field may not be null.";
const NOT_A_STRING: &str = "Not a valid string.";

/// Validate a creation payload.
pub fn validate_create(input: &Value) -> Result<NewUser, ValidationErrors> {
    let obj = as_object(input)?;
    let mut errors = ValidationErrors::new();

    let user_nickname = match obj.get("user_nickname") {
        None => {
            errors.push("user_nickname", REQUIRED);
            None
        }
        Some(v) => parse_nickname(v, &mut errors),
    };

    let name = match obj.get("name") {
        None => {
            errors.push("name", REQUIRED);
            None
        }
        Some(v) => parse_name(v, &mut errors),
    };

    let user_age = match obj.get("user_age") {
        None => None,
        Some(v) => parse_age(v, &mut errors).flatten(),
    };

    let password = obj
        .get("password")
        .and_then(|v| parse_password(v, &mut errors));

    match (user_nickname, name) {
        (Some(user_nickname), Some(name)) => errors.into_result(NewUser {
            user_nickname,
            name,
            user_age,
            password,
        }),
        _ => Err(errors),
    }
}

/// Validate a (partial) update payload against the stored user.
///
/// The primary key may be echoed back but not changed.
pub fn validate_update(current: &User, input: &Value) -> Result<UserChanges, ValidationErrors> {
    let obj = as_object(input)?;
    let mut errors = ValidationErrors::new();

    if let Some(v) = obj.get("user_nickname") {
        if let Some(nick) = parse_nickname(v, &mut errors) {
            if &nick != current.nickname() {
                errors.push(
                    "user_nickname",
                    "The nickname of an existing user cannot be changed.",
                );
            }
        }
    }

    let changes = UserChanges {
        name: obj.get("name").and_then(|v| parse_name(v, &mut errors)),
        user_age: obj.get("user_age").and_then(|v| parse_age(v, &mut errors)),
        password: obj.get("password").and_then(|v| parse_password(v, &mut errors)),
    };

    errors.into_result(changes)
}

fn as_object(input: &Value) -> Result<&Map<String, Value>, ValidationErrors> {
    input.as_object().ok_or_else(|| {
        ValidationErrors::single(NON_FIELD_ERRORS, "Invalid data. Expected a JSON object.")
    })
}

fn parse_nickname(value: &Value, errors: &mut ValidationErrors) -> Option<Nickname> {
    let raw = string_field("user_nickname", value, errors)?;
    match Nickname::parse(raw) {
        Ok(nick) => Some(nick),
        Err(e) => {
            errors.push("user_nickname", e.to_string());
            None
        }
    }
}

fn parse_name(value: &Value, errors: &mut ValidationErrors) -> Option<String> {
    let trimmed = string_field("name", value, errors)?.trim();
    if trimmed.is_empty() {
        errors.push("name", "This field may not be blank.");
        return None;
    }
    if trimmed.chars().count() > NAME_MAX_LEN {
        errors.push(
            "name",
            format!("Ensure this field has no more than {NAME_MAX_LEN} characters."),
        );
        return None;
    }
    Some(trimmed.to_string())
}

/// `Some(None)` means an explicit `null`.
fn parse_age(value: &Value, errors: &mut ValidationErrors) -> Option<Option<i32>> {
    if value.is_null() {
        return Some(None);
    }
    let Some(age) = value.as_i64() else {
        errors.push("user_age", "A valid integer is required.");
        return None;
    };
    if !AGE_RANGE.contains(&age) {
        errors.push(
            "user_age",
            format!(
                "Ensure this value is between {} and {}.",
                AGE_RANGE.start(),
                AGE_RANGE.end()
            ),
        );
        return None;
    }
    i32::try_from(age).ok().map(Some)
}

/// A `null` password is treated as "not submitted".
fn parse_password(value: &Value, errors: &mut ValidationErrors) -> Option<String> {
    if value.is_null() {
        return None;
    }
    let raw = string_field("password", value, errors)?;
    if !PASSWORD_LEN.contains(&raw.chars().count()) {
        errors.push(
            "password",
            format!(
                "Ensure this field has between {} and {} characters.",
                PASSWORD_LEN.start(),
                PASSWORD_LEN.end()
            ),
        );
        return None;
    }
    Some(raw.to_string())
}

fn string_field<'a>(
    field: &'static str,
    value: &'a Value,
    errors: &mut ValidationErrors,
) -> Option<&'a str> {
    match value {
        Value::String(s) => Some(s.as_str()),
        Value::Null => {
            errors.push(field, NOT_NULL);
            None
        }
        _ => {
            errors.push(field, NOT_A_STRING);
            None
        }
    }
}
