//! Field decoding helpers shared by the parameter views.
//!
//! Every helper returns `Ok(None)` when the response does not carry the key:
//! a missing parameter is an expected outcome, not an error. When a scalar
//! key repeats, the first occurrence wins.

use std::str::FromStr;

use printer_z_query::{Entry, Response};

use crate::error::ParseError;

/// Decode a `0`/`1` flag.
pub fn flag(response: &Response, key: &str) -> Result<Option<bool>, ParseError> {
    let Some(entry) = response.get(key) else {
        return Ok(None);
    };
    let value = entry.value()?;
    match value.as_str() {
        "0" => Ok(Some(false)),
        "1" => Ok(Some(true)),
        _ => Err(ParseError::invalid_value(key, &value, "expected 0 or 1")),
    }
}

/// Decode a value through its `FromStr` implementation.
pub fn number<T>(response: &Response, key: &str) -> Result<Option<T>, ParseError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(entry) = response.get(key) else {
        return Ok(None);
    };
    let value = entry.value()?;
    value
        .parse::<T>()
        .map(Some)
        .map_err(|e| ParseError::invalid_value(key, &value, e.to_string()))
}

/// Decode a list carried as one `item_key` entry per element, optionally
/// announced by a `count_key` entry.
///
/// The list is present when either key appears, so a printer can report an
/// empty list with `count_key:0`. A count that disagrees with the number of
/// items is an error.
pub fn counted_list<T, F>(
    response: &Response,
    count_key: &'static str,
    item_key: &str,
    decode_item: F,
) -> Result<Option<Vec<T>>, ParseError>
where
    F: Fn(&Entry) -> Result<T, ParseError>,
{
    let declared = number::<usize>(response, count_key)?;
    let items = response
        .get_all(item_key)
        .map(decode_item)
        .collect::<Result<Vec<_>, _>>()?;

    match declared {
        Some(declared) if declared != items.len() => Err(ParseError::CountMismatch {
            key: count_key,
            declared,
            actual: items.len(),
        }),
        Some(_) => Ok(Some(items)),
        None if items.is_empty() => Ok(None),
        None => Ok(Some(items)),
    }
}
