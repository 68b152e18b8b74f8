use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::schema::SchemaOrRef;

/// Encoding object for multipart requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Encoding {
    #[serde(rename = "contentType", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub explode: Option<bool>,
}

/// A media type object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub encoding: IndexMap<String, Encoding>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,
}

impl MediaType {
    /// The declared content type of a multipart part, if any.
    pub fn part_content_type(&self, part: &str) -> Option<&str> {
        self.encoding
            .get(part)
            .and_then(|e| e.content_type.as_deref())
    }
}

/// `multipart/*` or `application/x-www-form-urlencoded`: bodies whose
/// properties travel as separate parameters.
pub fn is_multipart(content_type: &str) -> bool {
    let content_type = content_type.trim().to_ascii_lowercase();
    content_type.starts_with("multipart/")
        || content_type.starts_with("application/x-www-form-urlencoded")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_multipart() {
        assert!(is_multipart("multipart/form-data"));
        assert!(is_multipart("multipart/mixed"));
        assert!(is_multipart("application/x-www-form-urlencoded"));
        assert!(!is_multipart("application/json"));
    }
}
