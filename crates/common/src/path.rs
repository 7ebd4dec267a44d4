//! Path template helpers
//!
//! Route paths use `{name}` placeholders. API Gateway also accepts the greedy
//! form `{name+}`, which is kept verbatim in the path but reported as `name`.

/// Extract the placeholder names of a path template, in order of appearance
///
/// # Examples
/// ```
/// use apigw_openapi_common::extract_path_parameters;
///
/// assert_eq!(
///     extract_path_parameters("/users/{user_id}/files/{key+}"),
///     vec!["user_id".to_string(), "key".to_string()]
/// );
/// assert!(extract_path_parameters("/health").is_empty());
/// ```
pub fn extract_path_parameters(path: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = path;

    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            break;
        };

        let name = after[..end].trim_end_matches('+');
        if !name.is_empty() {
            names.push(name.to_string());
        }
        rest = &after[end + 1..];
    }

    names
}

/// Whether a path parameter name can be embedded in a mapping expression
///
/// Names end up inside `$input.params('name')` and
/// `method.request.path.name`, so only word characters and `-` are allowed.
pub fn is_valid_parameter_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
