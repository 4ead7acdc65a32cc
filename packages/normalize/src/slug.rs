//! Place identity derived from listing URLs.
//!
//! Listing URLs look like `https://www.niche.com/places-to-live/<slug>/`
//! for cities and suburbs and `.../places-to-live/n/<slug>/` for
//! neighborhoods. The slug doubles as the place's stable key and always
//! ends with the two-letter state abbreviation.

const PLACES_SEGMENT: &str = "/places-to-live/";
const NEIGHBORHOOD_PREFIX: &str = "n/";

/// Extracts the slug from a listing URL.
///
/// Returns `None` if the URL has no recognizable slug.
#[must_use]
pub fn unique_name_from_link(link: &str) -> Option<String> {
    let link = link.trim();
    let rest = link
        .find(PLACES_SEGMENT)
        .map_or(link, |idx| &link[idx + PLACES_SEGMENT.len()..]);
    let rest = rest.strip_prefix(NEIGHBORHOOD_PREFIX).unwrap_or(rest);
    let slug = rest.trim_end_matches('/');

    if slug.is_empty() || slug.contains('/') {
        return None;
    }
    Some(slug.to_ascii_lowercase())
}

/// Returns the upper-cased state abbreviation a slug ends with.
#[must_use]
pub fn state_from_slug(slug: &str) -> Option<String> {
    let suffix = slug.rsplit('-').next()?;
    if suffix.len() == 2 && suffix.chars().all(|c| c.is_ascii_alphabetic()) && slug.contains('-') {
        Some(suffix.to_ascii_uppercase())
    } else {
        None
    }
}

/// Returns the upper-cased state abbreviation at the end of a listing URL.
#[must_use]
pub fn state_from_link(link: &str) -> Option<String> {
    unique_name_from_link(link).and_then(|slug| state_from_slug(&slug))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
    })
}

/// Builds a human-readable label from a slug.
///
/// The slug's word count decides how words group into place and
/// city/county: `north-bethesda-montgomery-md` becomes
/// `"North Bethesda, Montgomery, MD"`.
#[must_use]
pub fn name_with_state(slug: &str) -> String {
    let words: Vec<&str> = slug.split('-').filter(|w| !w.is_empty()).collect();

    match words.as_slice() {
        [a, b, c, d, state] => format!(
            "{} {}, {} {}, {}",
            capitalize(a),
            capitalize(b),
            capitalize(c),
            capitalize(d),
            state.to_ascii_uppercase()
        ),
        [a, b, c, state] => format!(
            "{} {}, {}, {}",
            capitalize(a),
            capitalize(b),
            capitalize(c),
            state.to_ascii_uppercase()
        ),
        [a, b, state] => format!(
            "{}, {}, {}",
            capitalize(a),
            capitalize(b),
            state.to_ascii_uppercase()
        ),
        [only] => capitalize(only),
        [] => String::new(),
        [first, .., state] => format!("{}, {}", capitalize(first), state.to_ascii_uppercase()),
    }
}
