// Numan Thabit 2025
use std::collections::HashMap;

pub type KvMap = HashMap<String, String>;

/// Decode Grafana's flattened `key=value, key2=value2` strings.
///
/// Segments are split on `,` and trimmed; empty segments are skipped. Only
/// the first `=` separates key from value, and a segment without `=` becomes
/// a key with an empty value. Repeated keys keep the last value.
pub fn decode(raw: Option<&str>) -> KvMap {
    let mut out = KvMap::new();
    let Some(raw) = raw else {
        return out;
    };

    for segment in raw.split(',').map(str::trim) {
        if segment.is_empty() {
            continue;
        }
        match segment.split_once('=') {
            Some((key, value)) => out.insert(key.trim().to_string(), value.trim().to_string()),
            None => out.insert(segment.to_string(), String::new()),
        };
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> KvMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn absent_and_blank_inputs_are_empty() {
        assert!(decode(None).is_empty());
        assert!(decode(Some("")).is_empty());
        assert!(decode(Some("   ")).is_empty());
        assert!(decode(Some(" , ,, ")).is_empty());
    }

    #[test]
    fn decodes_trimmed_pairs() {
        assert_eq!(decode(Some("a=1, b=2")), map(&[("a", "1"), ("b", "2")]));
        assert_eq!(
            decode(Some("  alertname = HighCPU ,severity= page ")),
            map(&[("alertname", "HighCPU"), ("severity", "page")])
        );
    }

    #[test]
    fn bare_keys_map_to_empty_values() {
        assert_eq!(decode(Some("flag, a=1")), map(&[("flag", ""), ("a", "1")]));
    }

    #[test]
    fn splits_on_first_equals_only() {
        assert_eq!(decode(Some("a=1=2")), map(&[("a", "1=2")]));
        assert_eq!(decode(Some("=v")), map(&[("", "v")]));
        assert_eq!(decode(Some("k=")), map(&[("k", "")]));
    }

    #[test]
    fn later_duplicates_overwrite() {
        assert_eq!(decode(Some("a=1, a=2")), map(&[("a", "2")]));
    }
}
