// Field naming policies

use crate::FieldMeta;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a field's externally reported name is chosen.
///
/// Error keys use the resolved name, so picking [`FieldNaming::Wire`] makes
/// form-encoded and JSON payloads of the same entity report errors under
/// the same vocabulary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldNaming {
    /// The structural field name, verbatim
    #[default]
    Structural,
    /// The name from the field's JSON annotation
    #[serde(alias = "json")]
    Wire,
}

impl FieldNaming {
    /// Parse a policy name (`structural`, `wire` or `json`).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "structural" | "struct" => Some(FieldNaming::Structural),
            "wire" | "json" => Some(FieldNaming::Wire),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldNaming::Structural => "structural",
            FieldNaming::Wire => "wire",
        }
    }

    /// Resolve the external name of a field.
    ///
    /// Under [`FieldNaming::Wire`] the first segment of the JSON annotation
    /// wins; `-` yields the empty string, which excludes the field. Fields
    /// without an annotation, or with an empty name segment, keep their
    /// structural name.
    pub fn resolve(&self, meta: &FieldMeta) -> String {
        match self {
            FieldNaming::Structural => meta.name.to_string(),
            FieldNaming::Wire => {
                let name = meta
                    .json
                    .as_deref()
                    .and_then(|tag| tag.split(',').next())
                    .unwrap_or("");
                match name {
                    "-" => String::new(),
                    "" => meta.name.to_string(),
                    name => name.to_string(),
                }
            }
        }
    }
}

impl fmt::Display for FieldNaming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(name: &'static str, json: Option<&str>) -> FieldMeta {
        FieldMeta {
            name,
            json: json.map(String::from),
        }
    }

    #[test]
    fn test_structural_ignores_annotation() {
        let naming = FieldNaming::Structural;
        assert_eq!(naming.resolve(&meta("Email", Some("email"))), "Email");
        assert_eq!(naming.resolve(&meta("Secret", Some("-"))), "Secret");
    }

    #[test]
    fn test_wire_uses_annotation() {
        let naming = FieldNaming::Wire;
        assert_eq!(naming.resolve(&meta("Email", Some("email"))), "email");
        assert_eq!(naming.resolve(&meta("Email", Some("email_address,omitempty"))), "email_address");
    }

    #[test]
    fn test_wire_exclusion_marker() {
        assert_eq!(FieldNaming::Wire.resolve(&meta("Secret", Some("-"))), "");
        assert_eq!(FieldNaming::Wire.resolve(&meta("Secret", Some("-,omitempty"))), "");
    }

    #[test]
    fn test_wire_falls_back_to_structural() {
        assert_eq!(FieldNaming::Wire.resolve(&meta("Age", None)), "Age");
        assert_eq!(FieldNaming::Wire.resolve(&meta("Age", Some(",omitempty"))), "Age");
    }

    #[test]
    fn test_parse_policy() {
        assert_eq!(FieldNaming::parse("wire"), Some(FieldNaming::Wire));
        assert_eq!(FieldNaming::parse("JSON"), Some(FieldNaming::Wire));
        assert_eq!(FieldNaming::parse("structural"), Some(FieldNaming::Structural));
        assert_eq!(FieldNaming::parse("yaml"), None);
    }

    #[test]
    fn test_serde_names() {
        let naming: FieldNaming = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(naming, FieldNaming::Wire);
        assert_eq!(serde_json::to_string(&FieldNaming::Structural).unwrap(), "\"structural\"");
    }
}
