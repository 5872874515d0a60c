//! Verse-of-the-day target (bible.com).

use chrono::Local;
use serde_json::Value;

use super::{text_field, ScrapeError, ScrapeTarget};
use crate::models::VerseRecord;

pub const CACHE_KEY: &str = "dailyVerse";

const SOURCE_URL: &str = "https://www.bible.com/verse-of-the-day";
const WAIT_SELECTOR: &str = "main";

// Selectors track bible.com's rendered markup; they break when the site
// redesigns, which is what the retry/refresh machinery is for.
const EXTRACTOR_JS: &str = r#"
(() => {
    const text = (sel) => document.querySelector(sel)?.textContent?.trim() || null;
    const attr = (sel, name) => document.querySelector(sel)?.getAttribute(name) || null;
    return {
        verseDate: text('main .items-center > div:nth-child(1) > div:nth-child(1) > div:nth-child(1) > p'),
        verseImageUrl: attr('main .items-center > div:nth-child(1) img', 'src'),
        verseText: text('main .items-center > div:nth-child(1) > div:nth-child(3) a:nth-child(1)'),
        referenceText: text('main .items-center > div:nth-child(1) div:nth-child(3) a:nth-child(2)'),
    };
})()
"#;

pub fn target() -> ScrapeTarget {
    ScrapeTarget {
        cache_key: CACHE_KEY.to_string(),
        url: SOURCE_URL.to_string(),
        wait_selector: WAIT_SELECTOR,
        extractor_js: EXTRACTOR_JS,
    }
}

/// Validate extracted page data into a [`VerseRecord`].
///
/// Verse and reference text are required; the date banner is sometimes
/// absent from the page and falls back to today's date.
pub fn parse(raw: Value) -> Result<VerseRecord, ScrapeError> {
    let verse_text =
        text_field(&raw, "verseText").ok_or(ScrapeError::Incomplete { field: "verseText" })?;
    let reference_text = text_field(&raw, "referenceText")
        .ok_or(ScrapeError::Incomplete { field: "referenceText" })?;
    let verse_date = text_field(&raw, "verseDate")
        .unwrap_or_else(|| Local::now().date_naive().to_string());

    Ok(VerseRecord {
        verse_date,
        verse_image_url: text_field(&raw, "verseImageUrl"),
        verse_text,
        reference_text,
    })
}
