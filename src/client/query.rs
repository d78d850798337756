//! Parameter checks the API would otherwise reject server-side.

use crate::error::ApiError;
use crate::params::Params;

/// Page-set selectors; the API accepts at most one per query.
const PAGE_SET_KEYS: [&str; 3] = ["titles", "pageids", "revids"];

/// Rejects a query that selects pages by more than one of `titles`,
/// `pageids`, and `revids`.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] naming the clashing parameters.
pub fn check_page_set(params: &Params) -> Result<(), ApiError> {
    let used: Vec<&str> = PAGE_SET_KEYS
        .iter()
        .copied()
        .filter(|key| params.is_set(key))
        .collect();

    if used.len() > 1 {
        return Err(ApiError::validation(format!(
            "parameters {} cannot be used together",
            used.join(", ")
        )));
    }
    Ok(())
}
