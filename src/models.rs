//! Wire-level records served by the API.
//!
//! Field names serialize as camelCase to match the JSON contract consumed
//! by existing clients.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One day's verse, produced by a single scrape of bible.com.
///
/// Immutable once created; superseded by the next successful scrape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerseRecord {
    pub verse_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verse_image_url: Option<String>,
    pub verse_text: String,
    pub reference_text: String,
}

/// One day's sermon quote in a given language, scraped from branham.org.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRecord {
    pub language: Language,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_audio_url: Option<String>,
    pub sermon_date: Option<String>,
    pub sermon_title: Option<String>,
    pub quote_text: Option<String>,
    pub scripture_reference: Option<String>,
    pub scripture_text: Option<String>,
}

/// Supported quote languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Fr,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Fr];

    pub fn as_str(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
        }
    }

    /// Route/query parameter mapping: exactly "fr" selects French,
    /// anything else falls back to English.
    pub fn from_param(raw: &str) -> Self {
        if raw == "fr" {
            Language::Fr
        } else {
            Language::En
        }
    }

    pub fn cache_key(self) -> String {
        format!("{}DailyQuote", self.as_str())
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a storage key within the music library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MusicKind {
    Album,
    Artist,
    Track,
}

impl MusicKind {
    pub fn classify(key: &str) -> Self {
        if key.starts_with("album/") {
            MusicKind::Album
        } else if key.starts_with("artist/") {
            MusicKind::Artist
        } else {
            MusicKind::Track
        }
    }
}

/// One entry in a music listing, derived per-request from live storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicEntry {
    pub key: String,
    pub name: String,
    pub size: i64,
    pub last_modified: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: MusicKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_param_is_fr_only_for_exact_match() {
        assert_eq!(Language::from_param("fr"), Language::Fr);
        assert_eq!(Language::from_param("FR"), Language::En);
        assert_eq!(Language::from_param("en"), Language::En);
        assert_eq!(Language::from_param("de"), Language::En);
    }

    #[test]
    fn language_cache_keys() {
        assert_eq!(Language::En.cache_key(), "enDailyQuote");
        assert_eq!(Language::Fr.cache_key(), "frDailyQuote");
    }

    #[test]
    fn classify_by_key_prefix() {
        assert_eq!(MusicKind::classify("album/Jazz/"), MusicKind::Album);
        assert_eq!(MusicKind::classify("artist/Coltrane/"), MusicKind::Artist);
        assert_eq!(MusicKind::classify("loose/track1.mp3"), MusicKind::Track);
        // A key merely containing the prefix is not an album
        assert_eq!(MusicKind::classify("misc/album/x"), MusicKind::Track);
    }

    #[test]
    fn verse_record_serializes_camel_case() {
        let record = VerseRecord {
            verse_date: "2026-08-26".to_string(),
            verse_image_url: None,
            verse_text: "In the beginning".to_string(),
            reference_text: "Genesis 1:1".to_string(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["verseDate"], "2026-08-26");
        assert_eq!(json["verseText"], "In the beginning");
        assert_eq!(json["referenceText"], "Genesis 1:1");
        // Absent optional fields are omitted, not null
        assert!(json.get("verseImageUrl").is_none());
    }

    #[test]
    fn music_entry_kind_serializes_as_type() {
        let entry = MusicEntry {
            key: "album/Jazz/".to_string(),
            name: "Jazz".to_string(),
            size: 0,
            last_modified: Utc::now(),
            kind: MusicKind::Album,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "album");
        assert!(json.get("lastModified").is_some());
    }
}
