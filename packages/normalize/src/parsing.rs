//! Per-field coercion of raw scraped text.
//!
//! Every function here is pure and total: a value that cannot be coerced
//! comes back as [`Parsed::Missing`] with the reason, never as an error.

/// Text the scraping layer emits when a page had no figure to show.
const MISSING_SENTINELS: &[&str] = &["no data", "no data available", "n/a", "na", "-", "us"];

/// Why a raw value did not produce a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingReason {
    /// The field was absent or blank.
    Empty,
    /// The field held an explicit "no data" style marker.
    Sentinel,
    /// The field held text that is not a usable number.
    Unparseable,
}

/// Outcome of coercing one raw field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Parsed<T> {
    /// A typed value.
    Present(T),
    /// No usable value, and why.
    Missing(MissingReason),
}

impl<T> Parsed<T> {
    /// Converts into an `Option`, discarding the missing reason.
    pub fn present(self) -> Option<T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Missing(_) => None,
        }
    }

    /// Returns `true` if the value failed to parse (as opposed to being
    /// legitimately absent).
    pub const fn is_unparseable(&self) -> bool {
        matches!(self, Self::Missing(MissingReason::Unparseable))
    }
}

/// Removes currency symbols, thousands separators and scraping artefacts,
/// classifying blanks and sentinels along the way.
fn clean_numeric(raw: Option<&str>) -> Result<String, MissingReason> {
    let Some(raw) = raw else {
        return Err(MissingReason::Empty);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(MissingReason::Empty);
    }
    if MISSING_SENTINELS
        .iter()
        .any(|s| trimmed.eq_ignore_ascii_case(s))
    {
        return Err(MissingReason::Sentinel);
    }

    Ok(trimmed
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | 'Â' | '\u{a0}' | ' '))
        .collect())
}

/// Parses a crime rate per 100k.
///
/// `0` is a legitimate observation and is returned as present. Negative or
/// non-finite values are unparseable.
#[must_use]
pub fn parse_rate(raw: Option<&str>) -> Parsed<f64> {
    let cleaned = match clean_numeric(raw) {
        Ok(cleaned) => cleaned,
        Err(reason) => return Parsed::Missing(reason),
    };
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Parsed::Present(value),
        _ => {
            log::debug!("Unparseable crime rate {raw:?}");
            Parsed::Missing(MissingReason::Unparseable)
        }
    }
}

/// Parses a whole-dollar amount such as `"$1,234"`.
#[must_use]
pub fn parse_dollars(raw: Option<&str>) -> Parsed<u64> {
    let cleaned = match clean_numeric(raw) {
        Ok(cleaned) => cleaned,
        Err(reason) => return Parsed::Missing(reason),
    };
    cleaned.parse::<u64>().map_or_else(
        |_| {
            log::debug!("Unparseable dollar amount {raw:?}");
            Parsed::Missing(MissingReason::Unparseable)
        },
        Parsed::Present,
    )
}

/// Parses a possibly fractional dollar amount such as `"$1,234.50"`.
#[must_use]
pub fn parse_amount(raw: Option<&str>) -> Parsed<f64> {
    let cleaned = match clean_numeric(raw) {
        Ok(cleaned) => cleaned,
        Err(reason) => return Parsed::Missing(reason),
    };
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Parsed::Present(value),
        _ => Parsed::Missing(MissingReason::Unparseable),
    }
}

/// Parses lat/lng from optional string fields. Returns `None` if missing,
/// unparseable, out of range, or zero.
#[must_use]
pub fn parse_lat_lng_str(lat: Option<&str>, lng: Option<&str>) -> Option<(f64, f64)> {
    let latitude = lat?.trim().parse::<f64>().ok()?;
    let longitude = lng?.trim().parse::<f64>().ok()?;
    if latitude == 0.0 || longitude == 0.0 {
        return None;
    }
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return None;
    }
    Some((latitude, longitude))
}
