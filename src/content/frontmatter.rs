//! Front-matter parsing

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Custom deserializer that handles both a single string and a list of strings
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                vec.push(item);
            }
            Ok(vec)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// Front-matter data at the top of a post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "string_or_vec", default)]
    pub tags: Vec<String>,
    /// Posts are published unless marked otherwise
    #[serde(default = "default_published")]
    pub published: bool,

    /// Additional custom fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

fn default_published() -> bool {
    true
}

impl Default for FrontMatter {
    fn default() -> Self {
        Self {
            title: None,
            slug: None,
            date: None,
            description: None,
            tags: Vec::new(),
            published: true,
            extra: HashMap::new(),
        }
    }
}

impl FrontMatter {
    /// Parse front-matter from the start of `content`.
    ///
    /// Returns the front-matter and the byte offset where the Markdown body
    /// begins. Content without a YAML header, or with one that does not
    /// parse, yields the default front-matter and offset 0.
    pub fn parse(content: &str) -> (Self, usize) {
        let start = content.len() - content.trim_start().len();
        let rest = &content[start..];
        if !rest.starts_with("---") {
            return (FrontMatter::default(), 0);
        }

        // The opening delimiter must be alone on its line
        let after_open = &rest[3..];
        let Some(open_end) = after_open.find('\n') else {
            return (FrontMatter::default(), 0);
        };
        if !after_open[..open_end].trim().is_empty() {
            return (FrontMatter::default(), 0);
        }

        let yaml_start = start + 3 + open_end + 1;
        let yaml_and_rest = &content[yaml_start..];
        let Some(close) = find_closing_delimiter(yaml_and_rest) else {
            return (FrontMatter::default(), 0);
        };

        let yaml_content = &yaml_and_rest[..close.yaml_len];
        let body_offset = yaml_start + close.body_start;

        if yaml_content.trim().is_empty() {
            return (FrontMatter::default(), body_offset);
        }
        if !looks_like_yaml(yaml_content) {
            return (FrontMatter::default(), 0);
        }

        match serde_yaml::from_str::<FrontMatter>(yaml_content) {
            Ok(fm) => (fm, body_offset),
            Err(e) => {
                tracing::warn!(
                    "Failed to parse YAML front-matter, treating as content: {}",
                    e
                );
                (FrontMatter::default(), 0)
            }
        }
    }

    /// Parse the date field
    pub fn parse_date(&self) -> Option<NaiveDateTime> {
        self.date.as_deref().and_then(parse_date_string)
    }
}

struct ClosingDelimiter {
    yaml_len: usize,
    body_start: usize,
}

/// Locate a `---` line closing the front-matter
fn find_closing_delimiter(s: &str) -> Option<ClosingDelimiter> {
    let mut offset = 0;
    for line in s.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let mut body_start = offset + line.len();
            // Skip blank lines between the header and the body
            for next in s[body_start..].split_inclusive('\n') {
                if next.trim().is_empty() && next.ends_with('\n') {
                    body_start += next.len();
                } else {
                    break;
                }
            }
            return Some(ClosingDelimiter {
                yaml_len: offset,
                body_start,
            });
        }
        offset += line.len();
    }
    None
}

/// Valid YAML front-matter has at least one `key: value` line. Markdown
/// that merely uses `---` as a separator does not.
fn looks_like_yaml(content: &str) -> bool {
    content.lines().any(|line| {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return false;
        }
        let Some(colon_pos) = trimmed.find(':') else {
            return false;
        };
        let key = &trimmed[..colon_pos];
        let is_valid_key = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            && !matches!(key, "http" | "https" | "ftp");
        let after_colon = &trimmed[colon_pos + 1..];
        is_valid_key && (after_colon.is_empty() || after_colon.starts_with(' '))
    })
}

/// Parse a date string in various formats
fn parse_date_string(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
    ];
    for fmt in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.naive_local())
}
