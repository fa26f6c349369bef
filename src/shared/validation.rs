//! Request shape validation
//!
//! Every request body accepted by the API implements [`Validate`]. The checks
//! here are pure functions of the input, so the client can run them before
//! sending and the server runs them again after deserializing.

use crate::shared::error::{FieldError, SharedError};

pub const TITLE_MAX_CHARS: usize = 255;
pub const NAME_MAX_CHARS: usize = 100;
pub const PASSWORD_MIN_CHARS: usize = 6;

/// Shape check for an incoming value.
pub trait Validate {
    fn validate(&self) -> Result<(), SharedError>;
}

/// Collects field errors in check order.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` against `field` unless `ok` holds.
    pub fn check(&mut self, ok: bool, field: &str, message: &str) -> &mut Self {
        if !ok {
            self.errors.push(FieldError::new(field, message));
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        self.check(is_valid_email(value), field, "Invalid email format")
    }

    pub fn password(&mut self, field: &str, value: &str) -> &mut Self {
        self.check(
            value.chars().count() >= PASSWORD_MIN_CHARS,
            field,
            "Password must be at least 6 characters",
        )
    }

    pub fn name(&mut self, field: &str, value: &str) -> &mut Self {
        let value = value.trim();
        self.check(!value.is_empty(), field, "Name is required")
            .check(
                value.chars().count() <= NAME_MAX_CHARS,
                field,
                "Name must be at most 100 characters",
            )
    }

    pub fn title(&mut self, field: &str, value: &str) -> &mut Self {
        let value = value.trim();
        self.check(!value.is_empty(), field, "Title is required")
            .check(
                value.chars().count() <= TITLE_MAX_CHARS,
                field,
                "Title must be at most 255 characters",
            )
    }

    pub fn finish(&mut self) -> Result<(), SharedError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(SharedError::ValidationError {
                errors: std::mem::take(&mut self.errors),
            })
        }
    }
}

/// `local@domain.tld` with no whitespace and exactly one `@`.
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = value.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() || domain.starts_with('.') || domain.ends_with('.') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Path ids are positive decimal integers.
pub fn parse_id(raw: &str) -> Option<i64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<i64>().ok().filter(|id| *id > 0)
}
