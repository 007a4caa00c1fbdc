use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use strum_macros::Display;

use crate::model::contact::ContactDraft;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\w+([\.-]?\w+)*@\w+([\.-]?\w+)*(\.\w{2,3})+$")
        .expect("email pattern is a valid regex")
});

// Matches either a bare 10 digit number, or a + prefixed country code
// followed by the subscriber number. Separators are stripped before matching.
static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{10}$|^\+\d{1,3}\d{9,14}$").expect("phone pattern is a valid regex")
});

pub const MIN_NAME_LENGTH: usize = 2;

#[derive(Display, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[strum(serialize_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Phone,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Email => "Email",
            Field::Phone => "Phone",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reason {
    Required,
    TooShort,
    InvalidFormat,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub reason: Reason,
}

impl FieldError {
    pub fn new(field: Field, reason: Reason) -> Self {
        FieldError { field, reason }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            Reason::Required => write!(f, "{} is required", self.field.label()),
            Reason::TooShort => write!(
                f,
                "{} must be at least {} characters",
                self.field.label(),
                MIN_NAME_LENGTH
            ),
            Reason::InvalidFormat => match self.field {
                Field::Email => write!(f, "Please enter a valid email"),
                _ => write!(f, "Please enter a valid 10-digit phone number"),
            },
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrors(pub Vec<FieldError>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn for_field(&self, field: Field) -> Option<&FieldError> {
        self.0.iter().find(|error| error.field == field)
    }

    pub fn contains(&self, reason: Reason) -> bool {
        self.0.iter().any(|error| error.reason == reason)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.0.iter().map(|error| error.to_string()).collect();

        write!(f, "{}", rendered.join("; "))
    }
}

/// Runs every field rule and collects the failures in field order. The same
/// checks gate the interactive form and the table, so a draft rejected in one
/// place is rejected in the other.
pub fn validate(name: &str, email: &str, phone: &str) -> Result<(), FieldErrors> {
    let failures: Vec<FieldError> = [
        check_name(name),
        check_email(email),
        check_phone(phone),
    ]
    .into_iter()
    .flatten()
    .collect();

    if failures.is_empty() {
        Ok(())
    } else {
        Err(FieldErrors(failures))
    }
}

pub fn validate_draft(draft: &ContactDraft) -> Result<(), FieldErrors> {
    validate(&draft.name, &draft.email, &draft.phone)
}

fn check_name(name: &str) -> Option<FieldError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Some(FieldError::new(Field::Name, Reason::Required));
    }

    if trimmed.chars().count() < MIN_NAME_LENGTH {
        return Some(FieldError::new(Field::Name, Reason::TooShort));
    }

    None
}

fn check_email(email: &str) -> Option<FieldError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Some(FieldError::new(Field::Email, Reason::Required));
    }

    if !EMAIL_PATTERN.is_match(trimmed) {
        return Some(FieldError::new(Field::Email, Reason::InvalidFormat));
    }

    None
}

fn check_phone(phone: &str) -> Option<FieldError> {
    let trimmed = phone.trim();

    if trimmed.is_empty() {
        return Some(FieldError::new(Field::Phone, Reason::Required));
    }

    // Humans write phone numbers with spaces and dashes, digits decide
    let stripped: String = trimmed
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();

    if !PHONE_PATTERN.is_match(&stripped) {
        return Some(FieldError::new(Field::Phone, Reason::InvalidFormat));
    }

    None
}
