//! Chrome over the DevTools protocol
//!
//! [`ChromeSession`] adapts a `chromiumoxide` page to the [`Browser`] seam.
//! Elements found by a lookup are kept in a per-session table and handed out
//! as opaque ids; navigating drops the table, so refs from an older document
//! come back as [`Error::StaleElement`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser as Chromium, BrowserConfig};
use chromiumoxide::{Element, Page};
use futures_util::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::{Browser, ElementRef, SessionFactory};
use crate::common::config::{ChromeConfig, Timeouts};
use crate::common::{Error, Result};

/// Roughly what WebDriver's "element displayed" check looks at
const IS_DISPLAYED_JS: &str = r#"function() {
    const style = window.getComputedStyle(this);
    if (style.display === 'none' || style.visibility === 'hidden') {
        return false;
    }
    return !!(this.offsetWidth || this.offsetHeight || this.getClientRects().length);
}"#;

const SELECT_CONTENTS_JS: &str = "function() { this.focus(); this.select(); }";

/// One browser tab for one scenario
pub struct ChromeSession {
    browser: Mutex<Chromium>,
    handler: JoinHandle<()>,
    page: Page,
    /// Whether the browser process belongs to this session
    launched: bool,
    elements: Mutex<HashMap<String, Arc<Element>>>,
    next_id: AtomicU64,
    closed: AtomicBool,
}

impl ChromeSession {
    /// Launch Chrome (or attach to `config.connect_url`) and open a blank tab
    pub async fn start(config: &ChromeConfig, timeouts: &Timeouts) -> Result<Self> {
        let (browser, mut events) = match &config.connect_url {
            Some(url) => {
                tracing::info!(url = %url, "connecting to running Chrome");
                Chromium::connect(url.clone()).await?
            }
            None => Chromium::launch(launch_config(config, timeouts)?).await?,
        };

        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "DevTools connection closed");
                    break;
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler.abort();
                return Err(e.into());
            }
        };
        tracing::info!(launched = config.connect_url.is_none(), "Chrome session started");

        Ok(Self {
            browser: Mutex::new(browser),
            handler,
            page,
            launched: config.connect_url.is_none(),
            elements: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            closed: AtomicBool::new(false),
        })
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::SessionClosed);
        }
        Ok(())
    }

    async fn element(&self, element: &ElementRef) -> Result<Arc<Element>> {
        self.ensure_open()?;
        self.elements
            .lock()
            .await
            .get(&element.0)
            .cloned()
            .ok_or_else(|| Error::StaleElement(element.0.clone()))
    }

    async fn forget_elements(&self) {
        self.elements.lock().await.clear();
    }
}

#[async_trait]
impl Browser for ChromeSession {
    async fn open(&self, url: &str) -> Result<()> {
        self.ensure_open()?;
        self.forget_elements().await;
        self.page.goto(url).await.map_err(|e| Error::Navigation {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(())
    }

    async fn refresh(&self) -> Result<()> {
        self.ensure_open()?;
        self.forget_elements().await;
        self.page.reload().await?;
        Ok(())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<ElementRef>> {
        self.ensure_open()?;
        let found = self.page.find_elements(selector).await?;

        let mut elements = self.elements.lock().await;
        let refs = found
            .into_iter()
            .map(|element| {
                let id = format!("e{}", self.next_id.fetch_add(1, Ordering::Relaxed));
                elements.insert(id.clone(), Arc::new(element));
                ElementRef(id)
            })
            .collect();
        Ok(refs)
    }

    async fn text(&self, element: &ElementRef) -> Result<String> {
        let element = self.element(element).await?;
        Ok(element.inner_text().await?.unwrap_or_default())
    }

    async fn attribute(&self, element: &ElementRef, name: &str) -> Result<Option<String>> {
        let element = self.element(element).await?;
        Ok(element.attribute(name).await?)
    }

    async fn is_displayed(&self, element: &ElementRef) -> Result<bool> {
        let element = self.element(element).await?;
        let returns = element.call_js_fn(IS_DISPLAYED_JS, false).await?;
        match returns.result.value {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(false),
        }
    }

    async fn click(&self, element: &ElementRef) -> Result<()> {
        let element = self.element(element).await?;
        element.click().await?;
        Ok(())
    }

    async fn set_value(&self, element: &ElementRef, value: &str) -> Result<()> {
        let element = self.element(element).await?;
        // Typed like a user so input masks and framework listeners see it
        element.call_js_fn(SELECT_CONTENTS_JS, false).await?;
        element.press_key("Backspace").await?;
        if !value.is_empty() {
            element.type_str(value).await?;
        }
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        let mut browser = self.browser.lock().await;
        if self.closed.load(Ordering::SeqCst) {
            return Ok(());
        }

        if self.launched {
            browser.close().await?;
            browser.wait().await?;
        } else {
            self.page.clone().close().await?;
        }

        self.closed.store(true, Ordering::SeqCst);
        self.handler.abort();
        self.forget_elements().await;
        tracing::info!(launched = self.launched, "Chrome session closed");
        Ok(())
    }
}

/// Opens one Chrome session per scenario
pub struct ChromeFactory {
    config: ChromeConfig,
    timeouts: Timeouts,
}

impl ChromeFactory {
    pub fn new(config: ChromeConfig, timeouts: Timeouts) -> Self {
        Self { config, timeouts }
    }
}

#[async_trait]
impl SessionFactory for ChromeFactory {
    async fn open_session(&self) -> Result<Arc<dyn Browser>> {
        let session = ChromeSession::start(&self.config, &self.timeouts).await?;
        Ok(Arc::new(session))
    }

    fn describe(&self) -> String {
        match &self.config.connect_url {
            Some(url) => format!("Chrome at {}", url),
            None if self.config.headless => "headless Chrome".to_string(),
            None => "Chrome".to_string(),
        }
    }
}

fn launch_config(config: &ChromeConfig, timeouts: &Timeouts) -> Result<BrowserConfig> {
    let mut builder = BrowserConfig::builder()
        .request_timeout(timeouts.request())
        .args(config.args.iter().map(String::as_str));
    if !config.headless {
        builder = builder.with_head();
    }
    if let Some(path) = &config.executable {
        builder = builder.chrome_executable(path);
    }
    builder.build().map_err(Error::BrowserLaunch)
}
