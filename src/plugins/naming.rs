//! Identifier and import path helpers

/// Converts an identifier to snake_case.
///
/// ```
/// use scaffold_plugins::plugins::naming::to_snake_case;
///
/// assert_eq!(to_snake_case("calcSvc"), "calc_svc");
/// assert_eq!(to_snake_case("HTTPServer"), "httpserver");
/// assert_eq!(to_snake_case("secured-service"), "secured_service");
/// ```
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_is_lowercase = false;

    for ch in s.chars() {
        if ch.is_uppercase() {
            if prev_is_lowercase {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
            prev_is_lowercase = false;
        } else if ch.is_alphanumeric() {
            result.push(ch);
            prev_is_lowercase = ch.is_lowercase() || ch.is_ascii_digit();
        } else if matches!(ch, '-' | '_' | ' ') {
            if !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }
            prev_is_lowercase = false;
        }
    }

    result.trim_end_matches('_').to_string()
}

/// Join import path segments with `/`, skipping empty ones
pub fn join_import(segments: &[&str]) -> String {
    segments
        .iter()
        .map(|s| s.trim_matches('/'))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("calc"), "calc");
        assert_eq!(to_snake_case("multiAuth"), "multi_auth");
        assert_eq!(to_snake_case("Multi Auth"), "multi_auth");
        assert_eq!(to_snake_case("v2Service"), "v2_service");
        assert_eq!(to_snake_case("__calc__"), "calc");
    }

    #[test]
    fn test_join_import() {
        assert_eq!(
            join_import(&["calc/gen", "http", "calc", "kitserver"]),
            "calc/gen/http/calc/kitserver"
        );
        assert_eq!(join_import(&["", "grpc", "calc/", "kitserver"]), "grpc/calc/kitserver");
    }
}
