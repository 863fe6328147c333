//! Bearer-token authentication collaborator
//!
//! Publishers and admin callers authenticate with an API key carried in a
//! `Bearer` authorization header. Token comparison is constant-time
//! (accumulating XOR across padded byte lengths) so a mismatch reveals
//! nothing about how far the comparison got. All token comparison lives
//! here; the fanout and registry cores never compare secrets.

/// Authentication failure
///
/// Deliberately carries no detail about which check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// The caller could not be authenticated
    Unauthorized,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::Unauthorized => write!(f, "unauthorized"),
        }
    }
}

impl std::error::Error for AuthError {}

/// Parse a comma-separated API key list
///
/// Entries are trimmed; blanks are dropped. A missing value yields an
/// empty list, which fails every authorization check.
pub fn parse_api_keys(raw: Option<&str>) -> Vec<String> {
    match raw {
        Some(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    }
}

/// Extract the token from a `Bearer` authorization header
///
/// The scheme is matched case-insensitively. Returns `None` for a missing
/// header, a different scheme, or a blank token.
pub fn extract_bearer_token(header: Option<&str>) -> Option<String> {
    let header = header?.trim();
    let (scheme, rest) = header.split_once(char::is_whitespace)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = rest.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Compare two strings in constant time
///
/// Accumulates XOR across the padded maximum byte length, folding the
/// length difference into the accumulator, so the comparison never
/// short-circuits on the first mismatching byte.
pub fn constant_time_eq(left: &str, right: &str) -> bool {
    let left = left.as_bytes();
    let right = right.as_bytes();
    let max_len = left.len().max(right.len());

    let mut mismatch = left.len() ^ right.len();
    for index in 0..max_len {
        let l = left.get(index).copied().unwrap_or(0);
        let r = right.get(index).copied().unwrap_or(0);
        mismatch |= (l ^ r) as usize;
    }

    mismatch == 0
}

/// Check a candidate token against every configured key
///
/// Every key is compared even after a match so the number of comparisons
/// does not depend on which key matched.
pub fn is_api_key_allowed(candidate: &str, configured_keys: &[String]) -> bool {
    let mut matched = false;

    for key in configured_keys {
        if constant_time_eq(candidate, key) {
            matched = true;
        }
    }

    matched
}

/// Authorize a request from its raw authorization header
///
/// Fails generically: a missing header, an empty key list, and a
/// mismatched token are indistinguishable to the caller.
pub fn authorize(authorization: Option<&str>, configured_keys: &[String]) -> Result<(), AuthError> {
    let token = extract_bearer_token(authorization).ok_or(AuthError::Unauthorized)?;

    if configured_keys.is_empty() || !is_api_key_allowed(&token, configured_keys) {
        return Err(AuthError::Unauthorized);
    }

    Ok(())
}
