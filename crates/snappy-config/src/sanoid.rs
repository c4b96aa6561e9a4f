//! sanoid.conf reader
//!
//! INI dialect used by sanoid: `[section]` headers, `key = value` pairs
//! delimited by `=` only, and `#` comments on their own line or after a
//! value. Keys keep their case. A repeated key overrides the earlier value
//! and a repeated section merges into the first.

use crate::error::{ConfigError, Result};
use crate::Sections;

/// Parse sanoid.conf text into sections
pub fn parse(text: &str) -> Result<Sections> {
    let mut sections = Sections::new();
    let mut current: Option<String> = None;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = strip_comment(raw).trim();

        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let name = header.strip_suffix(']').ok_or_else(|| ConfigError::Parse {
                line: line_no,
                message: format!("unterminated section header: {}", line),
            })?;
            let name = name.trim();
            if name.is_empty() {
                return Err(ConfigError::Parse {
                    line: line_no,
                    message: "empty section name".to_string(),
                });
            }
            sections.entry(name.to_string()).or_default();
            current = Some(name.to_string());
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            return Err(ConfigError::Parse {
                line: line_no,
                message: format!("expected 'key = value', found: {}", line),
            });
        };

        let key = key.trim();
        if key.is_empty() {
            return Err(ConfigError::Parse {
                line: line_no,
                message: "missing key before '='".to_string(),
            });
        }

        let Some(section) = current.as_ref() else {
            return Err(ConfigError::Parse {
                line: line_no,
                message: format!("key '{}' outside of any section", key),
            });
        };

        sections
            .entry(section.clone())
            .or_default()
            .insert(key.to_string(), value.trim().to_string());
    }

    Ok(sections)
}

/// Drop a `#` comment
///
/// A line starting with `#` is a comment; elsewhere `#` only starts a comment
/// when preceded by whitespace, so values like `pool#1` survive.
fn strip_comment(line: &str) -> &str {
    if line.trim_start().starts_with('#') {
        return "";
    }

    let bytes = line.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'#' && i > 0 && bytes[i - 1].is_ascii_whitespace() {
            return &line[..i];
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sections_and_keys() {
        let text = "\
# sanoid config
[tank/home]
    use_template = production
    daily = 7   # a week of dailies

[template_production]
\tdaily = 30
\tmonthly = 12
";
        let sections = parse(text).unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections["tank/home"]["daily"], "7");
        assert_eq!(sections["tank/home"]["use_template"], "production");
        assert_eq!(sections["template_production"]["monthly"], "12");
    }

    #[test]
    fn test_keys_preserve_case() {
        let sections = parse("[a]\nDaily = 3\n").unwrap();
        assert!(sections["a"].contains_key("Daily"));
        assert!(!sections["a"].contains_key("daily"));
    }

    #[test]
    fn test_duplicates_override_and_merge() {
        let sections = parse("[a]\ndaily = 1\n[b]\nx = 1\n[a]\ndaily = 2\nweekly = 4\n").unwrap();
        assert_eq!(sections["a"]["daily"], "2");
        assert_eq!(sections["a"]["weekly"], "4");
    }

    #[test]
    fn test_hash_inside_value_is_kept() {
        let sections = parse("[a]\nsnapshot_prefix = snap#1\n").unwrap();
        assert_eq!(sections["a"]["snapshot_prefix"], "snap#1");
    }

    #[test]
    fn test_colon_is_not_a_delimiter() {
        let err = parse("[a]\ndaily: 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_key_outside_section() {
        let err = parse("daily = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_unterminated_header() {
        let err = parse("\n\n[tank/home\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: 3, .. }));
    }

    #[test]
    fn test_empty_value_is_allowed() {
        let sections = parse("[a]\nsnapshot_prefix =\n").unwrap();
        assert_eq!(sections["a"]["snapshot_prefix"], "");
    }
}
