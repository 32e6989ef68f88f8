//! Field-level rules. Each returns the error message for an invalid value,
//! `None` when the value is acceptable.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use crate::application::{Gender, parse_dob};
use crate::ingestion::{UploadPolicy, mime_of};

pub const REQUIRED: &str = "This field is required";

const NAME_MAX_CHARS: usize = 100;
const EMAIL_MAX_CHARS: usize = 254;
const MOBILE_DIGITS: usize = 10;
const MIN_AGE: i32 = 18;
const MAX_AGE: i32 = 120;

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z\s'\-]+$").expect("name pattern is valid")
});

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9]([a-zA-Z0-9._-]*[a-zA-Z0-9])?@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("email pattern is valid")
});

/// Placeholder numbers people type to get past the form.
const FAKE_MOBILES: &[&str] = &[
    "0000000000",
    "1111111111",
    "1234567890",
    "9999999999",
    "2222222222",
    "9876543210",
];

pub fn required(value: &str) -> Option<String> {
    value.trim().is_empty().then(|| REQUIRED.to_string())
}

/// Applicant and father's name.
pub fn person_name(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return Some(REQUIRED.to_string());
    }
    if value.chars().count() > NAME_MAX_CHARS {
        return Some("Name is too long (max 100 characters)".to_string());
    }
    if !NAME_RE.is_match(value) {
        return Some("Only letters, spaces, apostrophes, and hyphens allowed".to_string());
    }
    None
}

pub fn email(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return Some("Email is required".to_string());
    }
    if value.chars().count() > EMAIL_MAX_CHARS {
        return Some("Email is too long".to_string());
    }
    if !EMAIL_RE.is_match(value) {
        return Some("Invalid email format".to_string());
    }
    None
}

fn mobile_digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

pub fn mobile(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        return Some("Mobile number is required".to_string());
    }
    let digits = mobile_digits(value);
    if digits.len() != MOBILE_DIGITS {
        return Some("Mobile number must be exactly 10 digits".to_string());
    }
    if FAKE_MOBILES.contains(&digits.as_str()) {
        return Some("Please enter a valid mobile number".to_string());
    }
    let first = digits.as_bytes()[0];
    if digits.bytes().all(|b| b == first) {
        return Some("Repeating digits are not allowed".to_string());
    }
    None
}

/// The 10-digit form of a valid mobile number; `None` when the number is
/// invalid or already normalised.
pub fn normalize_mobile(value: &str) -> Option<String> {
    if mobile(value).is_some() {
        return None;
    }
    let digits = mobile_digits(value);
    (digits != value).then_some(digits)
}

pub fn gender(value: &str) -> Option<String> {
    value
        .parse::<Gender>()
        .is_err()
        .then(|| "Please select a valid gender".to_string())
}

/// Whole years between `dob` and `today`, by calendar year difference
/// adjusted for a birthday not yet reached.
pub fn age_on(dob: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        age -= 1;
    }
    age
}

pub fn date_of_birth(value: &str, today: NaiveDate) -> Option<String> {
    if value.trim().is_empty() {
        return Some("Date of birth is required".to_string());
    }
    let Some(dob) = parse_dob(value) else {
        return Some("Invalid date".to_string());
    };
    if dob > today {
        return Some("Date of birth cannot be in the future".to_string());
    }
    let age = age_on(dob, today);
    if age < MIN_AGE {
        return Some("You must be at least 18 years old".to_string());
    }
    if age > MAX_AGE {
        return Some("Date of birth seems unrealistic".to_string());
    }
    None
}

/// Stored photo. Freshly ingested photos carry a `data:` header and are
/// held to the photo upload policy; bare strings came from the backend and
/// were accepted earlier.
pub fn photo(value: &str, policy: &UploadPolicy) -> Option<String> {
    if value.trim().is_empty() {
        return Some("Photo is required".to_string());
    }
    if !value.starts_with("data:") {
        return None;
    }
    if !policy.allows_mime(&mime_of(value)) {
        return Some("Only JPG, PNG, or WebP images are allowed".to_string());
    }
    if encoded_size(value) > policy.max_bytes() {
        return Some(format!(
            "Photo must be under {}MB",
            policy.max_bytes().div_ceil(1024 * 1024)
        ));
    }
    None
}

/// Decoded byte length of a base64 payload, header ignored.
fn encoded_size(value: &str) -> u64 {
    let body = crate::ingestion::strip_data_url(value).trim_end_matches('=');
    (body.len() as u64 * 3) / 4
}

pub fn zip_code(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        return Some("Pincode is required".to_string());
    }
    if !crate::address::is_valid_zip(value) {
        return Some("Invalid Pincode format (6 digits)".to_string());
    }
    None
}
