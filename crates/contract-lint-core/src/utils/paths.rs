//! Dotted module path matching.

/// Checks if a dotted module path matches a pattern.
///
/// Supports wildcards:
/// - `*` matches any single segment
/// - `**` matches any number of segments
///
/// A literal pattern also matches every submodule of the named module, so
/// `os` matches `os.path`.
///
/// # Examples
///
/// ```
/// use contract_lint_core::utils::paths::module_matches;
///
/// assert!(module_matches("os.path", "os"));
/// assert!(module_matches("xml.etree.ElementTree", "xml.*.ElementTree"));
/// assert!(!module_matches("ossify", "os"));
/// ```
#[must_use]
pub fn module_matches(module: &str, pattern: &str) -> bool {
    let path_parts: Vec<&str> = module.split('.').collect();
    let mut pattern_parts: Vec<&str> = pattern.split('.').collect();
    if pattern_parts.last().is_some_and(|p| *p != "**") {
        pattern_parts.push("**");
    }
    match_parts(&path_parts, &pattern_parts)
}

fn match_parts(path: &[&str], pattern: &[&str]) -> bool {
    let Some((first_pattern, rest_pattern)) = pattern.split_first() else {
        return path.is_empty();
    };

    match *first_pattern {
        "**" => (0..=path.len()).any(|i| match_parts(&path[i..], rest_pattern)),
        "*" => !path.is_empty() && match_parts(&path[1..], rest_pattern),
        literal => path.first() == Some(&literal) && match_parts(&path[1..], rest_pattern),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_matches_literal() {
        assert!(module_matches("json", "json"));
        assert!(module_matches("json.decoder", "json"));
        assert!(!module_matches("jsonschema", "json"));
    }

    #[test]
    fn test_module_matches_wildcard() {
        assert!(module_matches("concurrent.futures", "concurrent.*"));
        assert!(!module_matches("concurrent", "concurrent.*"));
    }

    #[test]
    fn test_module_matches_globstar() {
        assert!(module_matches("a.b.c.d", "a.**.d"));
        assert!(module_matches("a.d", "a.**.d"));
    }
}
