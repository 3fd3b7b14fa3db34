//! Name splitting shared by the naming rules.

/// Splits a `CamelCase` name into words. Acronym runs stay together.
///
/// `HTTPClientFactory` yields `["HTTP", "Client", "Factory"]`.
pub(crate) fn camel_words(name: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = name.char_indices().collect();
    let mut words = Vec::new();
    let mut start = 0;

    for i in 1..chars.len() {
        let (idx, c) = chars[i];
        let prev = chars[i - 1].1;
        let next_lower = chars.get(i + 1).is_some_and(|(_, n)| n.is_lowercase());
        let boundary = c.is_uppercase()
            && (prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_lower));
        if boundary || c == '_' {
            if idx > start {
                words.push(&name[start..idx]);
            }
            start = if c == '_' { idx + 1 } else { idx };
        }
    }
    if start < name.len() {
        words.push(&name[start..]);
    }
    words
}

/// Converts a `CamelCase` name to `snake_case`.
pub(crate) fn to_snake(name: &str) -> String {
    camel_words(name)
        .into_iter()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Segments of a `snake_case` name, leading underscores dropped.
pub(crate) fn snake_segments(name: &str) -> Vec<&str> {
    name.trim_start_matches('_')
        .split('_')
        .filter(|s| !s.is_empty())
        .collect()
}

/// The part of an interface name after its prefix.
pub(crate) fn stem<'a>(name: &'a str, prefix: &str) -> &'a str {
    name.strip_prefix(prefix).unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_camel_case() {
        assert_eq!(camel_words("ProtocolEventBus"), vec!["Protocol", "Event", "Bus"]);
        assert_eq!(camel_words("HTTPClientFactory"), vec!["HTTP", "Client", "Factory"]);
        assert_eq!(camel_words("V2Reader"), vec!["V2", "Reader"]);
        assert_eq!(camel_words("Cache"), vec!["Cache"]);
    }

    #[test]
    fn converts_to_snake() {
        assert_eq!(to_snake("EventBus"), "event_bus");
        assert_eq!(to_snake("HTTPClient"), "http_client");
    }

    #[test]
    fn segments_and_stem() {
        assert_eq!(snake_segments("_read_all"), vec!["read", "all"]);
        assert_eq!(stem("ProtocolCache", "Protocol"), "Cache");
        assert_eq!(stem("Cache", "Protocol"), "Cache");
    }
}
