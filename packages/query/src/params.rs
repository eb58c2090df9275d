//! Shared parsing helpers for raw query-string parameters.

use std::str::FromStr;

use strum::VariantNames;

use crate::QueryError;

/// Returns the trimmed value, or `None` if the parameter is absent or
/// blank.
pub fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// Splits a comma-separated list into trimmed tokens.
///
/// # Errors
///
/// Returns [`QueryError::InvalidParameter`] if any token is empty (e.g.
/// `year,,state` or a trailing comma).
pub fn tokens<'a>(name: &'static str, raw: &'a str) -> Result<Vec<&'a str>, QueryError> {
    raw.split(',')
        .map(str::trim)
        .map(|token| {
            if token.is_empty() {
                Err(QueryError::invalid(name, format!("empty entry in '{raw}'")))
            } else {
                Ok(token)
            }
        })
        .collect()
}

/// Parses one token against a closed vocabulary.
///
/// # Errors
///
/// Returns [`QueryError::InvalidParameter`] naming the token and listing
/// the accepted values.
pub fn parse_token<T>(name: &'static str, token: &str) -> Result<T, QueryError>
where
    T: FromStr + VariantNames,
{
    token.parse().map_err(|_| {
        QueryError::invalid(
            name,
            format!(
                "unknown value '{token}'; expected one of {}",
                T::VARIANTS.join(", ")
            ),
        )
    })
}

/// Parses a comma-separated list against a closed vocabulary, keeping the
/// first occurrence of each value in input order.
///
/// # Errors
///
/// Returns [`QueryError::InvalidParameter`] on the first empty or unknown
/// token.
pub fn parse_list<T>(name: &'static str, raw: &str) -> Result<Vec<T>, QueryError>
where
    T: FromStr + VariantNames + PartialEq,
{
    let mut out: Vec<T> = Vec::new();
    for token in tokens(name, raw)? {
        let value = parse_token(name, token)?;
        if !out.contains(&value) {
            out.push(value);
        }
    }
    Ok(out)
}
