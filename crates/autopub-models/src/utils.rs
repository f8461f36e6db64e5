//! Parsing helpers shared with the submission layer.

use chrono::{DateTime, Utc};

/// Map a human voice category to a concrete voice identifier.
///
/// An explicit non-empty voice wins over the category.
pub fn voice_for_category(category: &str, explicit: Option<&str>) -> String {
    if let Some(v) = explicit {
        let v = v.trim();
        if !v.is_empty() {
            return v.to_string();
        }
    }
    match category.trim().to_lowercase().as_str() {
        "femme" => "fr-FR-DeniseNeural",
        "homme" => "fr-FR-HenriNeural",
        "enfant-fille" => "en-GB-MaisieNeural",
        "enfant-garcon" => "en-US-AndrewMultilingualNeural",
        _ => "fr-FR-DeniseNeural",
    }
    .to_string()
}

/// Split a comma-separated tag string into trimmed, non-empty tags.
pub fn split_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

/// Parse a publish timestamp as stored by the submission layer.
///
/// Accepts RFC3339 with either an offset or a trailing `Z`; empty or
/// whitespace-only input means "publish immediately".
pub fn parse_publish_iso(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_for_category() {
        assert_eq!(voice_for_category("femme", None), "fr-FR-DeniseNeural");
        assert_eq!(voice_for_category("homme", None), "fr-FR-HenriNeural");
        assert_eq!(voice_for_category("inconnu", None), "fr-FR-DeniseNeural");
        assert_eq!(
            voice_for_category("femme", Some("en-US-JennyNeural")),
            "en-US-JennyNeural"
        );
        assert_eq!(voice_for_category("homme", Some("   ")), "fr-FR-HenriNeural");
    }

    #[test]
    fn test_split_tags() {
        assert_eq!(
            split_tags("shorts, histoire , , fr"),
            vec!["shorts", "histoire", "fr"]
        );
        assert!(split_tags("").is_empty());
        assert!(split_tags(" , ,").is_empty());
    }

    #[test]
    fn test_parse_publish_iso() {
        let dt = parse_publish_iso("2025-03-01T18:00:00Z").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-03-01T18:00:00+00:00");

        let dt = parse_publish_iso("2025-03-01T19:00:00+01:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-03-01T18:00:00+00:00");

        assert!(parse_publish_iso("").is_none());
        assert!(parse_publish_iso("   ").is_none());
        assert!(parse_publish_iso("pas une date").is_none());
    }
}
