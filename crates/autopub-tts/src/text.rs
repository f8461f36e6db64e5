//! Text and voice helpers shared by both engines.

use std::sync::OnceLock;

use regex::Regex;

/// Clamp bound for the neural engine's prosody rate offset, in percent.
const MAX_RATE_OFFSET: i32 = 90;

/// Convert a speed multiplier to the percent rate offset the neural
/// engine expects (`1.3` -> `"+30%"`), clamped to engine limits.
pub fn rate_from_speed(speed: f64) -> String {
    let speed = if speed.is_finite() && speed > 0.0 {
        speed
    } else {
        1.0
    };
    let pct = ((speed - 1.0) * 100.0).round() as i32;
    let pct = pct.clamp(-MAX_RATE_OFFSET, MAX_RATE_OFFSET);
    if pct >= 0 {
        format!("+{}%", pct)
    } else {
        format!("{}%", pct)
    }
}

/// Derive the spoken language from a voice identifier's locale prefix.
///
/// Unknown prefixes default to English.
pub fn lang_from_voice(voice: &str) -> &'static str {
    let v = voice.to_lowercase();
    if v.starts_with("fr-") {
        "fr"
    } else if v.starts_with("en-") {
        "en"
    } else if v.starts_with("es-") {
        "es"
    } else if v.starts_with("pt-") {
        "pt"
    } else if v.starts_with("de-") {
        "de"
    } else if v.starts_with("it-") {
        "it"
    } else {
        "en"
    }
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").unwrap())
}

fn ws_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Strip markup tags and collapse whitespace.
///
/// Never returns an empty string; engines reject empty bodies, so blank
/// input becomes a single space.
pub fn sanitize_text(text: &str) -> String {
    let stripped = tag_re().replace_all(text, " ");
    let collapsed = ws_re().replace_all(&stripped, " ");
    let trimmed = collapsed.trim();
    if trimmed.is_empty() {
        " ".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Split text into chunks no longer than `max_len` characters, breaking
/// on word boundaries. A single oversized word becomes its own chunk.
pub fn chunk_text(text: &str, max_len: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > max_len {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Escape text for embedding in an SSML document.
pub fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_from_speed() {
        assert_eq!(rate_from_speed(1.3), "+30%");
        assert_eq!(rate_from_speed(1.0), "+0%");
        assert_eq!(rate_from_speed(0.75), "-25%");
        // Clamped to engine limits
        assert_eq!(rate_from_speed(3.5), "+90%");
        assert_eq!(rate_from_speed(0.01), "-90%");
        // Nonsense input falls back to natural speed
        assert_eq!(rate_from_speed(f64::NAN), "+0%");
        assert_eq!(rate_from_speed(-2.0), "+0%");
    }

    #[test]
    fn test_lang_from_voice() {
        assert_eq!(lang_from_voice("fr-FR-DeniseNeural"), "fr");
        assert_eq!(lang_from_voice("en-GB-MaisieNeural"), "en");
        assert_eq!(lang_from_voice("pt-BR-FranciscaNeural"), "pt");
        assert_eq!(lang_from_voice("ja-JP-NanamiNeural"), "en");
        assert_eq!(lang_from_voice(""), "en");
    }

    #[test]
    fn test_sanitize_text() {
        assert_eq!(
            sanitize_text("  Bonjour <b>le</b>\n\tmonde  "),
            "Bonjour le monde"
        );
        assert_eq!(sanitize_text("<p></p>"), " ");
        assert_eq!(sanitize_text(""), " ");
    }

    #[test]
    fn test_chunk_text_respects_word_boundaries() {
        let chunks = chunk_text("un deux trois quatre cinq", 9);
        assert_eq!(chunks, vec!["un deux", "trois", "quatre", "cinq"]);

        let long = "supercalifragilisticexpialidocious";
        assert_eq!(chunk_text(long, 10), vec![long.to_string()]);

        assert!(chunk_text("   ", 10).is_empty());
    }

    #[test]
    fn test_xml_escape() {
        assert_eq!(xml_escape("a < b & c > d"), "a &lt; b &amp; c &gt; d");
    }
}
