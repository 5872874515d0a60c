//! Daily cache warming.
//!
//! A background task re-scrapes every tracked content type at local
//! midnight, overwriting whatever is cached. Failures are logged and
//! swallowed; the previous cached value simply stands until it expires or
//! a later scrape succeeds.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveTime};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::models::Language;
use crate::scrapers::ScrapePipeline;

pub fn spawn_daily_refresh(pipeline: Arc<ScrapePipeline>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let wait = until_next_midnight(Local::now());
            info!("Next scheduled refresh in {}s", wait.as_secs());
            tokio::time::sleep(wait).await;
            refresh_all(&pipeline).await;
        }
    })
}

/// Re-scrape every content type, ignoring cache state. Never propagates
/// errors; a failed refresh must not take down the process or block the
/// next scheduled run.
pub async fn refresh_all(pipeline: &ScrapePipeline) {
    info!("Running daily content refresh");

    if let Err(err) = pipeline.refresh_verse().await {
        error!("Daily verse refresh failed: {err}");
    }
    for language in Language::ALL {
        if let Err(err) = pipeline.refresh_quote(language).await {
            error!("Daily {language} quote refresh failed: {err}");
        }
    }
}

fn until_next_midnight(now: DateTime<Local>) -> Duration {
    let next = now
        .date_naive()
        .succ_opt()
        .map(|day| day.and_time(NaiveTime::MIN))
        .unwrap_or_else(|| now.naive_local());

    (next - now.naive_local())
        .to_std()
        .unwrap_or(Duration::from_secs(60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn midnight_is_one_hour_from_eleven_pm() {
        let now = Local.with_ymd_and_hms(2026, 8, 26, 23, 0, 0).unwrap();
        assert_eq!(until_next_midnight(now), Duration::from_secs(3600));
    }

    #[test]
    fn just_after_midnight_waits_a_full_day() {
        let now = Local.with_ymd_and_hms(2026, 8, 26, 0, 0, 1).unwrap();
        assert_eq!(until_next_midnight(now), Duration::from_secs(86399));
    }
}
