//! Comment-based allowance directives.
//!
//! Supports directives like:
//! ```text
//! # contract-lint: allow(forbidden-import) reason="bootstrap module"
//! ```
//! placed on the flagged line (as a trailing comment) or on the line above.

use std::collections::HashSet;

const DIRECTIVE_PREFIX: &str = "contract-lint:";

/// Result of checking for allow directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowCheck {
    /// Rule is not allowed.
    Denied,
    /// Rule is allowed with optional reason.
    Allowed {
        /// The reason provided (if any).
        reason: Option<String>,
    },
}

impl AllowCheck {
    /// Returns true if allowed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// Returns the reason if allowed.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Allowed { reason } => reason.as_deref(),
            Self::Denied => None,
        }
    }
}

/// Parsed allowance directive.
#[derive(Debug, Clone)]
pub struct AllowDirective {
    /// Rule names that are allowed.
    pub rules: HashSet<String>,
    /// Optional reason for the allowance.
    pub reason: Option<String>,
}

/// Checks source code for allowance comments with reason.
///
/// # Arguments
///
/// * `content` - Source code content
/// * `line` - Line number to check (1-indexed)
/// * `rule_name` - Name of the rule to check for
///
/// # Returns
///
/// `AllowCheck::Allowed` with optional reason if an allowance directive is found.
#[must_use]
pub fn check_allow_with_reason(content: &str, line: usize, rule_name: &str) -> AllowCheck {
    let lines: Vec<&str> = content.lines().collect();

    for check_line in [line, line.saturating_sub(1)] {
        if check_line == 0 || check_line > lines.len() {
            continue;
        }

        if let Some(directive) = parse_allow_directive(lines[check_line - 1]) {
            if directive.rules.contains(rule_name) || directive.rules.contains("all") {
                return AllowCheck::Allowed {
                    reason: directive.reason,
                };
            }
        }
    }

    AllowCheck::Denied
}

/// Returns true if the file carries the skip sentinel anywhere.
#[must_use]
pub fn has_skip_sentinel(content: &str, sentinel: &str) -> bool {
    !sentinel.is_empty() && content.contains(sentinel)
}

/// Parses an allowance directive from a line with a `#` comment.
fn parse_allow_directive(line: &str) -> Option<AllowDirective> {
    let hash = line.find('#')?;
    let comment_content = line[hash + 1..].trim();

    let directive = comment_content.strip_prefix(DIRECTIVE_PREFIX)?.trim();
    let allow_content = directive.strip_prefix("allow(")?.trim();

    let paren_end = allow_content.find(')')?;
    let rules: HashSet<String> = allow_content[..paren_end]
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if rules.is_empty() {
        return None;
    }

    let rest = allow_content[paren_end + 1..].trim();
    let reason = rest
        .strip_prefix("reason=")
        .map(str::trim)
        .and_then(|r| r.strip_prefix('"'))
        .and_then(|r| r.find('"').map(|end| r[..end].to_string()))
        .filter(|r| !r.trim().is_empty());

    Some(AllowDirective { rules, reason })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_allow_directive() {
        let directive = parse_allow_directive("# contract-lint: allow(forbidden-import)").unwrap();
        assert!(directive.rules.contains("forbidden-import"));
        assert!(directive.reason.is_none());
    }

    #[test]
    fn test_parse_allow_directive_with_reason() {
        let directive = parse_allow_directive(
            "import os  # contract-lint: allow(forbidden-import) reason=\"bootstrap only\"",
        )
        .unwrap();
        assert!(directive.rules.contains("forbidden-import"));
        assert_eq!(directive.reason, Some("bootstrap only".to_string()));
    }

    #[test]
    fn test_parse_multiple_rules() {
        let directive =
            parse_allow_directive("# contract-lint: allow(missing-marker, vague-naming)").unwrap();
        assert!(directive.rules.contains("missing-marker"));
        assert!(directive.rules.contains("vague-naming"));
    }

    #[test]
    fn test_empty_reason_counts_as_missing() {
        let directive =
            parse_allow_directive("# contract-lint: allow(missing-marker) reason=\"  \"").unwrap();
        assert!(directive.reason.is_none());
    }

    #[test]
    fn test_check_allow_previous_line() {
        let content = "class A(Protocol):\n    # contract-lint: allow(missing-marker) reason=\"returns a future\"\n    async def get(self) -> Future[int]: ...\n";

        let result = check_allow_with_reason(content, 3, "missing-marker");
        assert!(result.is_allowed());
        assert_eq!(result.reason(), Some("returns a future"));
        assert!(!check_allow_with_reason(content, 3, "vague-naming").is_allowed());
    }

    #[test]
    fn test_check_allow_denied() {
        let content = "import os\n";
        let result = check_allow_with_reason(content, 1, "forbidden-import");
        assert_eq!(result, AllowCheck::Denied);
    }

    #[test]
    fn test_skip_sentinel() {
        assert!(has_skip_sentinel(
            "x = 1\n# contract-lint: skip-file\n",
            "# contract-lint: skip-file"
        ));
        assert!(!has_skip_sentinel("x = 1\n", "# contract-lint: skip-file"));
        assert!(!has_skip_sentinel("x = 1\n", ""));
    }
}
