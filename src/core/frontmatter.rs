//! On-disk note format: YAML frontmatter between `---` lines, a blank line,
//! then the Markdown body.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use super::schema::{Category, Choice, Confidence, Status};
use crate::error::{VaultError, VaultResult};

lazy_static! {
    static ref FRONTMATTER_RE: Regex =
        Regex::new(r"(?s)^---\r?\n(.*?)\r?\n---[ \t]*(?:\r?\n|$)(.*)").unwrap();
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteMetadata {
    pub title: String,
    pub category: Category,
    pub primary_subject: String,
    pub tags: Vec<String>,
    pub confidence: Confidence,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// A decoded note file.
#[derive(Debug, Clone)]
pub struct NoteDocument {
    pub metadata: NoteMetadata,
    pub body: String,
}

/// Render metadata and body into the file representation.
pub fn encode(metadata: &NoteMetadata, body: &str) -> VaultResult<String> {
    let yaml = serde_yaml::to_string(metadata)
        .map_err(|e| VaultError::Serialization(format!("failed to marshal metadata to YAML: {}", e)))?;
    Ok(format!("---\n{}---\n\n{}", yaml, body))
}

/// Split a file into its raw frontmatter text and body.
pub fn split(content: &str) -> Option<(&str, &str)> {
    let caps = FRONTMATTER_RE.captures(content)?;
    let raw = caps.get(1)?.as_str();
    let rest = caps.get(2).map(|m| m.as_str()).unwrap_or("");
    let body = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);
    Some((raw, body))
}

/// Parse a whole note file.
pub fn decode(content: &str) -> VaultResult<NoteDocument> {
    let (raw, body) = split(content)
        .ok_or_else(|| VaultError::Serialization("missing YAML frontmatter".into()))?;

    let value: Value = serde_yaml::from_str(raw)
        .map_err(|e| VaultError::Serialization(format!("invalid YAML frontmatter: {}", e)))?;
    let map = value
        .as_mapping()
        .ok_or_else(|| VaultError::Serialization("frontmatter is not a mapping".into()))?;

    Ok(NoteDocument {
        metadata: parse_metadata(map)?,
        body: body.to_string(),
    })
}

/// Validate an untyped metadata map field by field.
pub fn parse_metadata(raw: &Mapping) -> VaultResult<NoteMetadata> {
    let title = required_str(raw, "title")?;
    let category = Category::parse_choice(&required_str(raw, "category")?)?;
    let primary_subject = required_str(raw, "primary_subject")?;
    let tags = required_tags(raw)?;
    let confidence = Confidence::parse_choice(&required_str(raw, "confidence")?)?;
    let status = Status::parse_choice(&required_str(raw, "status")?)?;

    Ok(NoteMetadata {
        title,
        category,
        primary_subject,
        tags,
        confidence,
        status,
        created_at: optional_str(raw, "created_at")?,
        updated_at: optional_str(raw, "updated_at")?,
    })
}

fn required_str(raw: &Mapping, field: &str) -> VaultResult<String> {
    match raw.get(field) {
        None | Some(Value::Null) => Err(VaultError::validation(field, "field is required")),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(VaultError::validation(field, "must be a string")),
    }
}

fn optional_str(raw: &Mapping, field: &str) -> VaultResult<Option<String>> {
    match raw.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(VaultError::validation(field, "must be an RFC3339 string")),
    }
}

fn required_tags(raw: &Mapping) -> VaultResult<Vec<String>> {
    let seq = match raw.get("tags") {
        None | Some(Value::Null) => return Err(VaultError::validation("tags", "field is required")),
        Some(Value::Sequence(seq)) => seq,
        Some(_) => return Err(VaultError::validation("tags", "must be an array")),
    };

    seq.iter()
        .map(|tag| match tag {
            Value::String(s) => Ok(s.clone()),
            _ => Err(VaultError::validation("tags", "all tags must be strings")),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NoteMetadata {
        NoteMetadata {
            title: "Simon P. Jones - Protagonist".to_string(),
            category: Category::People,
            primary_subject: "simon_jones".to_string(),
            tags: vec!["people".into(), "simon_jones".into(), "protagonist".into()],
            confidence: Confidence::High,
            status: Status::Confirmed,
            created_at: Some("2025-05-01T10:00:00+00:00".to_string()),
            updated_at: Some("2025-05-01T10:00:00+00:00".to_string()),
        }
    }

    fn to_map(content: &str) -> Mapping {
        let (raw, _) = split(content).unwrap();
        serde_yaml::from_str(raw).unwrap()
    }

    #[test]
    fn test_encode_layout() {
        let content = encode(&sample(), "# Simon\n\n- Age: 14").unwrap();
        assert!(content.starts_with("---\ntitle: "));
        assert!(content.contains("category: people\n"));
        assert!(content.contains("status: confirmed\n"));
        assert!(content.ends_with("---\n\n# Simon\n\n- Age: 14"));
    }

    #[test]
    fn test_roundtrip_through_map() {
        let meta = sample();
        let content = encode(&meta, "body").unwrap();
        let parsed = parse_metadata(&to_map(&content)).unwrap();

        assert_eq!(parsed.title, meta.title);
        assert_eq!(parsed.category, meta.category);
        assert_eq!(parsed.confidence, meta.confidence);
        assert_eq!(parsed.status, meta.status);
        assert_eq!(parsed.tags, meta.tags);
    }

    #[test]
    fn test_decode_returns_body() {
        let content = encode(&sample(), "# Heading\n\nline").unwrap();
        let doc = decode(&content).unwrap();
        assert_eq!(doc.body, "# Heading\n\nline");
        assert_eq!(doc.metadata, sample());
    }

    #[test]
    fn test_timestamps_are_optional() {
        let mut meta = sample();
        meta.created_at = None;
        meta.updated_at = None;
        let content = encode(&meta, "").unwrap();
        assert!(!content.contains("created_at"));
        assert_eq!(decode(&content).unwrap().metadata.created_at, None);
    }

    #[test]
    fn test_parse_metadata_rejects_bad_enum() {
        let yaml = "title: t\ncategory: person\nprimary_subject: s\ntags: [a]\nconfidence: high\nstatus: theory\n";
        let map: Mapping = serde_yaml::from_str(yaml).unwrap();
        let err = parse_metadata(&map).unwrap_err();
        match err {
            VaultError::Validation { field, message } => {
                assert_eq!(field, "category");
                assert!(message.contains("people"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_metadata_type_checks() {
        let yaml = "title: t\ncategory: lore\nprimary_subject: s\ntags: [a, 3]\nconfidence: high\nstatus: theory\n";
        let map: Mapping = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(
            parse_metadata(&map),
            Err(VaultError::Validation { ref field, .. }) if field == "tags"
        ));

        let yaml = "title: t\ncategory: lore\ntags: []\nconfidence: high\nstatus: theory\n";
        let map: Mapping = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(
            parse_metadata(&map),
            Err(VaultError::Validation { ref field, .. }) if field == "primary_subject"
        ));
    }

    #[test]
    fn test_decode_without_frontmatter() {
        assert!(matches!(
            decode("# Just markdown"),
            Err(VaultError::Serialization(_))
        ));
    }
}
