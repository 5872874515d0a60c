//! Quote-of-the-day target (branham.org), in English and French.

use serde_json::Value;

use super::{text_field, ScrapeError, ScrapeTarget};
use crate::models::{Language, QuoteRecord};

const WAIT_SELECTOR: &str = ".QOTD";

const EXTRACTOR_JS: &str = r#"
(() => {
    const text = (sel) => document.querySelector(sel)?.textContent?.trim() || null;
    const attr = (sel, name) => document.querySelector(sel)?.getAttribute(name) || null;
    return {
        quoteAudioUrl: attr(".QOTD #audioplayer audio source[type='audio/mpeg']", 'src'),
        sermonDate: text('.QOTDdate'),
        sermonTitle: text('.QOTDtitle span#summary'),
        quoteText: text('.QOTDtext span#content'),
        scriptureReference: text('.dailybread_title span#scripturereference'),
        scriptureText: text('.dailybread_text span#scripturetext'),
    };
})()
"#;

pub fn target(language: Language) -> ScrapeTarget {
    ScrapeTarget {
        cache_key: language.cache_key(),
        url: format!("https://branham.org/{}/QuoteOfTheDay", language.as_str()),
        wait_selector: WAIT_SELECTOR,
        extractor_js: EXTRACTOR_JS,
    }
}

/// Validate extracted page data into a [`QuoteRecord`].
///
/// The quote itself plus its sermon date and title are required; the audio
/// stream and the daily-bread scripture block are not always published.
pub fn parse(language: Language, raw: Value) -> Result<QuoteRecord, ScrapeError> {
    let sermon_date =
        text_field(&raw, "sermonDate").ok_or(ScrapeError::Incomplete { field: "sermonDate" })?;
    let sermon_title =
        text_field(&raw, "sermonTitle").ok_or(ScrapeError::Incomplete { field: "sermonTitle" })?;
    let quote_text =
        text_field(&raw, "quoteText").ok_or(ScrapeError::Incomplete { field: "quoteText" })?;

    Ok(QuoteRecord {
        language,
        quote_audio_url: text_field(&raw, "quoteAudioUrl"),
        sermon_date: Some(sermon_date),
        sermon_title: Some(sermon_title),
        quote_text: Some(quote_text),
        scripture_reference: text_field(&raw, "scriptureReference"),
        scripture_text: text_field(&raw, "scriptureText"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_page() -> Value {
        json!({
            "quoteAudioUrl": "https://branham.org/audio/qotd.mp3",
            "sermonDate": "63-0317E",
            "sermonTitle": "The Breach",
            "quoteText": "Faith cometh by hearing.",
            "scriptureReference": "Romans 10:17",
            "scriptureText": "So then faith cometh by hearing...",
        })
    }

    #[test]
    fn parse_accepts_a_complete_page() {
        let record = parse(Language::En, full_page()).unwrap();
        assert_eq!(record.language, Language::En);
        assert_eq!(record.sermon_title.as_deref(), Some("The Breach"));
        assert_eq!(record.quote_text.as_deref(), Some("Faith cometh by hearing."));
        assert_eq!(
            record.quote_audio_url.as_deref(),
            Some("https://branham.org/audio/qotd.mp3")
        );
    }

    #[test]
    fn audio_and_scripture_are_optional() {
        let record = parse(
            Language::Fr,
            json!({
                "sermonDate": "63-0317E",
                "sermonTitle": "La Breche",
                "quoteText": "La foi vient de ce qu'on entend.",
            }),
        )
        .unwrap();

        assert!(record.quote_audio_url.is_none());
        assert!(record.scripture_reference.is_none());
        assert!(record.scripture_text.is_none());
    }

    #[test]
    fn empty_quote_text_fails_validation() {
        let mut page = full_page();
        page["quoteText"] = json!("");
        let err = parse(Language::En, page).unwrap_err();
        assert!(matches!(err, ScrapeError::Incomplete { field: "quoteText" }));
    }

    #[test]
    fn target_url_and_key_follow_language() {
        let en = target(Language::En);
        let fr = target(Language::Fr);
        assert_eq!(en.url, "https://branham.org/en/QuoteOfTheDay");
        assert_eq!(fr.url, "https://branham.org/fr/QuoteOfTheDay");
        assert_eq!(en.cache_key, "enDailyQuote");
        assert_eq!(fr.cache_key, "frDailyQuote");
    }
}
