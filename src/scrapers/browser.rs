//! Headless-Chrome harvester over CDP.
//!
//! Each harvest launches an isolated browser session, navigates, waits for
//! the target's defining selector, runs its extraction script, and tears
//! the session down on every exit path. Sessions are never reused across
//! attempts or shared between invocations.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{PageHarvester, ScrapeError, ScrapeTarget};

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// HTTP status of the last navigation, where Chrome exposes it. CDP has no
/// direct status accessor; navigation timing reports 0 when unsupported.
const NAV_STATUS_JS: &str = r#"
(() => {
    const nav = performance.getEntriesByType('navigation')[0];
    return nav && nav.responseStatus ? nav.responseStatus : 0;
})()
"#;

/// Launch settings for scrape sessions.
#[derive(Debug, Clone)]
pub struct BrowserSettings {
    /// Run without a visible window (disable for local debugging).
    pub headless: bool,
    /// Bound on navigation and on waiting for the target selector.
    pub timeout_secs: u64,
    /// Explicit Chrome binary; discovered from well-known paths when unset.
    pub chrome_executable: Option<PathBuf>,
    /// Additional Chrome arguments.
    pub chrome_args: Vec<String>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            timeout_secs: 30,
            chrome_executable: None,
            chrome_args: Vec::new(),
        }
    }
}

/// [`PageHarvester`] backed by a locally launched Chrome/Chromium.
pub struct BrowserHarvester {
    settings: BrowserSettings,
}

impl BrowserHarvester {
    /// Common Chrome executable paths to check.
    const CHROME_PATHS: &'static [&'static str] = &[
        // Linux
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        // macOS
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        // Common install locations
        "/opt/google/chrome/google-chrome",
    ];

    pub fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }

    /// Find a Chrome executable.
    fn find_chrome() -> Result<PathBuf, ScrapeError> {
        for path in Self::CHROME_PATHS {
            let p = std::path::Path::new(path);
            if p.exists() {
                debug!("Found Chrome at: {}", path);
                return Ok(p.to_path_buf());
            }
        }

        // Check if in PATH via `which`
        for cmd in &[
            "google-chrome",
            "google-chrome-stable",
            "chromium",
            "chromium-browser",
        ] {
            if let Ok(output) = std::process::Command::new("which").arg(cmd).output() {
                if output.status.success() {
                    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                    if !path.is_empty() {
                        debug!("Found Chrome in PATH: {}", path);
                        return Ok(PathBuf::from(path));
                    }
                }
            }
        }

        Err(ScrapeError::Launch(
            "Chrome/Chromium not found; install it or set an explicit executable path"
                .to_string(),
        ))
    }
}

#[async_trait]
impl PageHarvester for BrowserHarvester {
    async fn harvest(&self, target: &ScrapeTarget) -> Result<Value, ScrapeError> {
        let session = BrowserSession::launch(&self.settings).await?;
        let timeout = Duration::from_secs(self.settings.timeout_secs);
        let result = session.run(target, timeout).await;
        session.shutdown().await;
        result
    }
}

/// A scoped browser session: whoever launches it must call `shutdown`,
/// which `BrowserHarvester::harvest` does on every exit path.
struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

impl BrowserSession {
    async fn launch(settings: &BrowserSettings) -> Result<Self, ScrapeError> {
        let chrome_path = match &settings.chrome_executable {
            Some(path) => path.clone(),
            None => BrowserHarvester::find_chrome()?,
        };

        info!("Launching browser (headless={})", settings.headless);

        let mut builder = BrowserConfig::builder().chrome_executable(chrome_path);

        // with_head means NOT headless, confusingly
        if !settings.headless {
            builder = builder.with_head();
        }

        builder = builder
            .arg("--no-sandbox") // Often needed in containers/restricted environments
            .arg("--disable-setuid-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu") // Recommended for headless
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--disable-sync")
            .arg("--window-size=1920,1080");

        for arg in &settings.chrome_args {
            builder = builder.arg(arg);
        }

        let config = builder.build().map_err(ScrapeError::Launch)?;

        let (browser, mut handler) = Browser::launch(config).await?;

        // Drive CDP messages until the session is torn down
        let handler_task = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            browser,
            handler_task,
        })
    }

    async fn run(&self, target: &ScrapeTarget, timeout: Duration) -> Result<Value, ScrapeError> {
        let page = self.browser.new_page("about:blank").await?;

        // Realistic user agent before any navigation
        page.execute(SetUserAgentOverrideParams::new(USER_AGENT.to_string()))
            .await?;

        debug!("Navigating to {}", target.url);
        let nav = NavigateParams::builder()
            .url(target.url.clone())
            .build()
            .map_err(|reason| ScrapeError::Navigation {
                url: target.url.clone(),
                reason,
            })?;

        let response = match tokio::time::timeout(timeout, page.execute(nav)).await {
            Ok(response) => response?,
            Err(_) => {
                return Err(ScrapeError::Navigation {
                    url: target.url.clone(),
                    reason: "navigation timed out".to_string(),
                })
            }
        };
        if let Some(reason) = response.result.error_text.clone().filter(|t| !t.is_empty()) {
            return Err(ScrapeError::Navigation {
                url: target.url.clone(),
                reason,
            });
        }

        self.wait_for_selector(&page, target.wait_selector, timeout)
            .await?;

        if let Ok(result) = page.evaluate(NAV_STATUS_JS.to_string()).await {
            if let Ok(status) = result.into_value::<u64>() {
                if status != 0 && !(200..300).contains(&status) {
                    return Err(ScrapeError::Navigation {
                        url: target.url.clone(),
                        reason: format!("HTTP status {status}"),
                    });
                }
            }
        }

        debug!("Extracting fields from {}", target.url);
        let raw: Value = page
            .evaluate(target.extractor_js.to_string())
            .await?
            .into_value()?;

        // Close the page to prevent tab accumulation
        let _ = page.close().await;

        Ok(raw)
    }

    /// Poll for `selector` until it resolves or the timeout elapses.
    async fn wait_for_selector(
        &self,
        page: &Page,
        selector: &'static str,
        timeout: Duration,
    ) -> Result<(), ScrapeError> {
        let poll = async {
            loop {
                if page.find_element(selector).await.is_ok() {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(250)).await;
            }
        };

        tokio::time::timeout(timeout, poll)
            .await
            .map_err(|_| ScrapeError::SelectorTimeout { selector })
    }

    async fn shutdown(mut self) {
        if let Err(err) = self.browser.close().await {
            warn!("Browser close failed: {err}");
        }
        let _ = self.browser.wait().await;
        self.handler_task.abort();
    }
}
