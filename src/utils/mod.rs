// Utility functions

use crate::types::*;

/// Validates a value against a constraint and returns an error if it fails
pub fn validate<T, F>(
    value: T,
    constraint: F,
    error_message: impl Into<String>,
) -> PivnetResult<T>
where
    F: FnOnce(&T) -> bool,
{
    if constraint(&value) {
        Ok(value)
    } else {
        Err(PivnetError::Validation(error_message.into()))
    }
}

/// Validates a string against common constraints
pub struct StringValidator;

impl StringValidator {
    /// Validates that a string is not empty or whitespace
    pub fn not_empty(value: impl Into<String>, param_name: &str) -> PivnetResult<String> {
        let value = value.into();
        validate(
            value,
            |s| !s.trim().is_empty(),
            format!("{} cannot be empty", param_name),
        )
    }
}

/// Normalize a configured host: no surrounding whitespace, no trailing slash.
///
/// The host must parse as an absolute URL so that every request path can be
/// joined onto it.
pub fn normalize_host(host: &str) -> PivnetResult<String> {
    let trimmed = host.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(PivnetError::Configuration("host cannot be empty".to_string()));
    }

    url::Url::parse(trimmed).map_err(|e| {
        PivnetError::Configuration(format!("invalid host {:?}: {}", trimmed, e))
    })?;

    Ok(trimmed.to_string())
}

/// Join a base URL and a path with exactly one slash between them.
pub fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, path)
    }
}

/// Percent-encode one path segment so it cannot add segments, a query or a
/// fragment to the request path.
///
/// Empty segments and the dot segments `.` and `..` are rejected outright.
pub fn encode_path_segment(segment: &str, param_name: &str) -> PivnetResult<String> {
    if segment.is_empty() || segment == "." || segment == ".." {
        return Err(PivnetError::Validation(format!(
            "{} is not a valid path segment: {:?}",
            param_name, segment
        )));
    }

    let mut url = url::Url::parse("http://localhost/")
        .map_err(|e| PivnetError::Configuration(format!("path encoder: {}", e)))?;
    url.path_segments_mut()
        .map_err(|_| PivnetError::Configuration("path encoder: base cannot hold segments".to_string()))?
        .clear()
        .push(segment);

    Ok(url.path().trim_start_matches('/').to_string())
}

/// `/{segment}/{segment}...` with every segment encoded
pub fn build_path(segments: &[&str]) -> PivnetResult<String> {
    let mut path = String::new();
    for segment in segments {
        path.push('/');
        path.push_str(&encode_path_segment(segment, "path segment")?);
    }
    Ok(path)
}
