//! Structural and semantic checks for deal payloads.
//!
//! Both entry points are pure: they read a [`DealDraft`] (and, for updates,
//! the stored deal) and either produce typed values or a single
//! `ValidationFailed` error listing every violation in a stable order.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::Error;
use super::deal::{Deal, DealChanges};

/// Raw deal fields as received from a client. `None` means "not supplied".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DealDraft {
    /// Headline.
    pub title: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Discount, as text (JSON numbers are rendered to text by the adapter).
    pub discount: Option<String>,
    /// Location.
    pub location: Option<String>,
    /// Start date: RFC 3339, `YYYY-MM-DDTHH:MM[:SS]`, or `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// End date, same formats as `start_date`.
    pub end_date: Option<String>,
}

/// Validated fields of a new deal.
#[derive(Debug, Clone, PartialEq)]
pub struct DealFields {
    /// Trimmed headline.
    pub title: String,
    /// Trimmed description.
    pub description: String,
    /// Finite discount.
    pub discount: f64,
    /// Trimmed location.
    pub location: String,
    /// Start of validity.
    pub start_date: DateTime<Utc>,
    /// End of validity; strictly after `start_date`.
    pub end_date: DateTime<Utc>,
}

const DATE_ORDER_VIOLATION: &str = "End date must be after start date";

/// Parse a calendar timestamp. Date-only and zone-less inputs are read as UTC.
#[must_use]
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn parse_discount(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

struct Violations(Vec<String>);

impl Violations {
    fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    fn into_result<T>(self, value: impl FnOnce() -> Option<T>) -> Result<T, Error> {
        if self.0.is_empty() {
            if let Some(value) = value() {
                return Ok(value);
            }
        }
        Err(Error::validation_failed(self.0))
    }
}

/// Validate a complete payload for creation.
///
/// Every field is required. Present dates must parse; when both parse the
/// end must be strictly after the start.
///
/// # Errors
/// Returns an `invalid_request` error whose details list all violations.
///
/// # Examples
/// ```
/// use deals_backend::domain::{DealDraft, validate_new_deal};
///
/// let draft = DealDraft {
///     title: Some("Pizza Night".into()),
///     description: Some("Two for one".into()),
///     discount: Some("20".into()),
///     location: Some("Downtown".into()),
///     start_date: Some("2025-01-10".into()),
///     end_date: Some("2025-01-01".into()),
/// };
/// let err = validate_new_deal(&draft).unwrap_err();
/// assert!(err.message().contains("End date must be after start date"));
/// ```
pub fn validate_new_deal(draft: &DealDraft) -> Result<DealFields, Error> {
    let mut violations = Violations(Vec::new());

    let title = non_blank(draft.title.as_ref());
    let description = non_blank(draft.description.as_ref());
    let discount_raw = non_blank(draft.discount.as_ref());
    let location = non_blank(draft.location.as_ref());
    let start_raw = non_blank(draft.start_date.as_ref());
    let end_raw = non_blank(draft.end_date.as_ref());

    for (value, message) in [
        (title, "Title is required"),
        (description, "Description is required"),
        (discount_raw, "Discount is required"),
        (location, "Location is required"),
        (start_raw, "Start date is required"),
        (end_raw, "End date is required"),
    ] {
        if value.is_none() {
            violations.push(message);
        }
    }

    let discount = discount_raw.and_then(|raw| {
        let parsed = parse_discount(raw);
        if parsed.is_none() {
            violations.push("Discount must be a number");
        }
        parsed
    });
    let start = start_raw.and_then(|raw| {
        let parsed = parse_date(raw);
        if parsed.is_none() {
            violations.push("Start date is invalid");
        }
        parsed
    });
    let end = end_raw.and_then(|raw| {
        let parsed = parse_date(raw);
        if parsed.is_none() {
            violations.push("End date is invalid");
        }
        parsed
    });
    if let (Some(start), Some(end)) = (start, end) {
        if end <= start {
            violations.push(DATE_ORDER_VIOLATION);
        }
    }

    violations.into_result(|| {
        Some(DealFields {
            title: title?.to_owned(),
            description: description?.to_owned(),
            discount: discount?,
            location: location?.to_owned(),
            start_date: start?,
            end_date: end?,
        })
    })
}

fn supplied_text(
    value: Option<&String>,
    message: &'static str,
    violations: &mut Violations,
) -> Option<String> {
    let raw = value?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        violations.push(message);
        None
    } else {
        Some(trimmed.to_owned())
    }
}

/// Validate a partial payload against the stored deal.
///
/// Only supplied fields are checked. A supplied but blank field is a
/// violation. When either date is supplied, the effective range (supplied
/// value, else the stored one) must still satisfy `end > start`.
///
/// The returned changes never touch the image; the lifecycle manager sets it.
///
/// # Errors
/// Returns an `invalid_request` error whose details list all violations.
pub fn validate_deal_update(draft: &DealDraft, existing: &Deal) -> Result<DealChanges, Error> {
    let mut violations = Violations(Vec::new());

    let title = supplied_text(draft.title.as_ref(), "Title must not be empty", &mut violations);
    let description = supplied_text(
        draft.description.as_ref(),
        "Description must not be empty",
        &mut violations,
    );
    let discount = supplied_text(
        draft.discount.as_ref(),
        "Discount must not be empty",
        &mut violations,
    )
    .and_then(|raw| {
        let parsed = parse_discount(&raw);
        if parsed.is_none() {
            violations.push("Discount must be a number");
        }
        parsed
    });
    let location = supplied_text(
        draft.location.as_ref(),
        "Location must not be empty",
        &mut violations,
    );

    let start_supplied = draft.start_date.is_some();
    let end_supplied = draft.end_date.is_some();
    let start = draft.start_date.as_deref().and_then(|raw| {
        let parsed = parse_date(raw);
        if parsed.is_none() {
            violations.push("Start date is invalid");
        }
        parsed
    });
    let end = draft.end_date.as_deref().and_then(|raw| {
        let parsed = parse_date(raw);
        if parsed.is_none() {
            violations.push("End date is invalid");
        }
        parsed
    });
    let start_ok = !start_supplied || start.is_some();
    let end_ok = !end_supplied || end.is_some();
    if (start_supplied || end_supplied) && start_ok && end_ok {
        let effective_start = start.unwrap_or(existing.start_date);
        let effective_end = end.unwrap_or(existing.end_date);
        if effective_end <= effective_start {
            violations.push(DATE_ORDER_VIOLATION);
        }
    }

    violations.into_result(|| {
        Some(DealChanges {
            title,
            description,
            discount,
            location,
            image: None,
            start_date: start,
            end_date: end,
        })
    })
}

#[cfg(test)]
#[path = "deal_validation_tests.rs"]
mod tests;
