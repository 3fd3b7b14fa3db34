//! Subcommand implementations.

pub mod fix;
pub mod imports;
pub mod init;
pub mod list_rules;
pub mod output;
pub mod scan;

/// Splits a comma-separated option into trimmed, non-empty items.
pub(crate) fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_list_trims_and_drops_empty() {
        assert_eq!(
            split_list(Some("forbidden-import, CL004,,")),
            vec!["forbidden-import", "CL004"]
        );
        assert!(split_list(None).is_empty());
    }
}
