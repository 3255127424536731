use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, StatusCode, Url};
use stockcheck_core::{AppConfig, Locator};

use super::{ElementHandle, Navigator};
use crate::error::NavError;
use crate::retry::{is_retriable, retry_with_backoff};

/// Retry-After assumed when a 429 carries none.
const DEFAULT_RETRY_AFTER_SECS: u64 = 1;

/// Transport and wait settings shared by every HTTP-backed store.
#[derive(Debug, Clone)]
pub struct HttpNavigatorSettings {
    pub request_timeout: Duration,
    pub user_agent: String,
    /// Ceiling for every wait on a page condition.
    pub wait_timeout: Duration,
    /// Re-fetch interval inside a wait.
    pub poll_interval: Duration,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl Default for HttpNavigatorSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            user_agent: "stockcheck/0.1 (ingredient-availability)".to_string(),
            wait_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(250),
            max_retries: 3,
            backoff_base_ms: 500,
        }
    }
}

impl HttpNavigatorSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            user_agent: config.user_agent.clone(),
            wait_timeout: Duration::from_secs(config.wait_timeout_secs),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            max_retries: config.max_retries,
            backoff_base_ms: config.retry_backoff_base_ms,
        }
    }
}

#[derive(Debug)]
struct Page {
    url: Url,
    body: String,
}

/// [`Navigator`] for server-rendered search pages.
///
/// A locator is a regular expression over the page HTML. Capture group 1, if
/// present, is the element's content; otherwise the whole match is. Waiting
/// re-fetches the current URL every poll interval until the locator matches
/// or the wait expires, which covers pages that fill in results after a
/// short server-side delay.
///
/// Submitting a search treats the element content as a form action,
/// resolves it against the current URL, and loads it with the configured
/// query parameter set to the search text.
pub struct HttpNavigator {
    client: Client,
    settings: HttpNavigatorSettings,
    query_param: String,
    page: Option<Page>,
    patterns: HashMap<String, Regex>,
    closed: bool,
}

impl std::fmt::Debug for HttpNavigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpNavigator")
            .field("current_url", &self.current_url())
            .field("query_param", &self.query_param)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl HttpNavigator {
    /// # Errors
    ///
    /// Returns [`NavError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(settings: HttpNavigatorSettings, query_param: &str) -> Result<Self, NavError> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(settings.user_agent.as_str())
            .build()?;
        Ok(Self {
            client,
            settings,
            query_param: query_param.to_string(),
            page: None,
            patterns: HashMap::new(),
            closed: false,
        })
    }

    /// URL of the current page after redirects.
    #[must_use]
    pub fn current_url(&self) -> Option<&str> {
        self.page.as_ref().map(|p| p.url.as_str())
    }

    fn ensure_open(&self) -> Result<(), NavError> {
        if self.closed {
            Err(NavError::SessionClosed)
        } else {
            Ok(())
        }
    }

    fn current_page_url(&self) -> Result<Url, NavError> {
        self.page
            .as_ref()
            .map(|p| p.url.clone())
            .ok_or(NavError::NoPage)
    }

    fn pattern(&mut self, locator: &Locator) -> Result<Regex, NavError> {
        if let Some(re) = self.patterns.get(locator.as_str()) {
            return Ok(re.clone());
        }
        let re = Regex::new(locator.as_str()).map_err(|e| NavError::InvalidLocator {
            locator: locator.to_string(),
            reason: e.to_string(),
        })?;
        self.patterns
            .insert(locator.as_str().to_string(), re.clone());
        Ok(re)
    }

    async fn load(&mut self, url: Url) -> Result<(), NavError> {
        let client = &self.client;
        let page = retry_with_backoff(
            self.settings.max_retries,
            self.settings.backoff_base_ms,
            || {
                let url = url.clone();
                async move { fetch_page(client, url).await }
            },
        )
        .await?;
        self.page = Some(page);
        Ok(())
    }
}

async fn fetch_page(client: &Client, url: Url) -> Result<Page, NavError> {
    tracing::debug!(url = %url, "fetching page");
    let response = client.get(url.clone()).send().await?;
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
        return Err(NavError::RateLimited {
            url: url.to_string(),
            retry_after_secs,
        });
    }

    if !status.is_success() {
        return Err(NavError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let final_url = response.url().clone();
    let body = response.text().await?;
    Ok(Page {
        url: final_url,
        body,
    })
}

#[async_trait]
impl Navigator for HttpNavigator {
    async fn navigate(&mut self, url: &str) -> Result<(), NavError> {
        self.ensure_open()?;
        let parsed = Url::parse(url).map_err(|e| NavError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        self.load(parsed).await
    }

    async fn wait_until(
        &mut self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<Vec<ElementHandle>, NavError> {
        self.ensure_open()?;
        let re = self.pattern(locator)?;
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            let url = {
                let page = self.page.as_ref().ok_or(NavError::NoPage)?;
                let found = find_elements(&re, locator, &page.body);
                if !found.is_empty() {
                    return Ok(found);
                }
                page.url.clone()
            };

            let now = tokio::time::Instant::now();
            if now >= deadline {
                return Err(wait_timeout(locator, timeout));
            }
            tokio::time::sleep(self.settings.poll_interval.min(deadline - now)).await;

            // A reload never outlives the wait. A slow or transiently failing
            // reload keeps the previous page and counts as "not yet".
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            match tokio::time::timeout(remaining, self.load(url)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) if is_retriable(&e) => {
                    tracing::debug!(locator = %locator, error = %e, "reload failed during wait");
                }
                Ok(Err(e)) => return Err(e),
                Err(_) => return Err(wait_timeout(locator, timeout)),
            }
        }
    }

    async fn type_and_submit(
        &mut self,
        element: &ElementHandle,
        text: &str,
    ) -> Result<(), NavError> {
        self.ensure_open()?;
        let base = self.current_page_url()?;
        let action = decode_entities(element.content.trim());
        let mut url = base.join(&action).map_err(|e| NavError::InvalidUrl {
            url: action.clone(),
            reason: e.to_string(),
        })?;

        let param = self.query_param.clone();
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| *k != param)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .append_pair(&param, text);

        tracing::debug!(url = %url, query = text, "submitting search");
        self.load(url).await
    }

    async fn read_text(&mut self, element: &ElementHandle) -> Result<String, NavError> {
        self.ensure_open()?;
        Ok(clean_text(&element.content))
    }

    async fn click(&mut self, element: &ElementHandle) -> Result<(), NavError> {
        self.ensure_open()?;
        let target = decode_entities(element.content.trim());
        if !looks_like_link(&target) {
            tracing::debug!(locator = %element.locator, "click target is not a link; ignoring");
            return Ok(());
        }
        let base = self.current_page_url()?;
        let url = base.join(&target).map_err(|e| NavError::InvalidUrl {
            url: target.clone(),
            reason: e.to_string(),
        })?;
        self.load(url).await
    }

    async fn quit(&mut self) {
        self.closed = true;
        self.page = None;
        self.patterns.clear();
    }
}

fn wait_timeout(locator: &Locator, waited: Duration) -> NavError {
    NavError::Timeout {
        locator: locator.to_string(),
        waited_ms: u64::try_from(waited.as_millis()).unwrap_or(u64::MAX),
    }
}

fn find_elements(re: &Regex, locator: &Locator, body: &str) -> Vec<ElementHandle> {
    re.captures_iter(body)
        .enumerate()
        .map(|(index, caps)| {
            let content = caps
                .get(1)
                .or_else(|| caps.get(0))
                .map_or("", |m| m.as_str());
            ElementHandle::new(locator, index, content)
        })
        .collect()
}

fn looks_like_link(target: &str) -> bool {
    if target.is_empty() || target.chars().any(char::is_whitespace) || target.contains('<') {
        return false;
    }
    ["http://", "https://", "/", "?", "./", "../"]
        .iter()
        .any(|prefix| target.starts_with(prefix))
}

/// Strips markup, decodes entities, and collapses whitespace.
pub(crate) fn clean_text(input: &str) -> String {
    let tags = Regex::new(r"(?is)<[^>]+>").expect("valid tags regex");
    let no_tags = tags.replace_all(input, " ");
    decode_entities(&no_tags)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn decode_entities(input: &str) -> String {
    let numeric = Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").expect("valid entity regex");
    let decoded = numeric.replace_all(input, |caps: &regex::Captures<'_>| {
        let raw = &caps[1];
        let code = match raw.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => raw.parse::<u32>().ok(),
        };
        code.and_then(char::from_u32)
            .map_or_else(|| caps[0].to_string(), |c| c.to_string())
    });
    decoded
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_strips_tags_and_collapses_whitespace() {
        let raw = "<span class=\"name\">\n  Peanut <b>Butter</b>,\t16oz </span>";
        assert_eq!(clean_text(raw), "Peanut Butter , 16oz");
    }

    #[test]
    fn clean_text_decodes_entities() {
        assert_eq!(clean_text("Ben &amp; Jerry&#39;s"), "Ben & Jerry's");
        assert_eq!(clean_text("Trader Joe&#x2019;s&nbsp;Salsa"), "Trader Joe\u{2019}s Salsa");
    }

    #[test]
    fn decode_entities_leaves_invalid_codepoints() {
        assert_eq!(decode_entities("&#xD800;"), "&#xD800;");
    }

    #[test]
    fn looks_like_link_accepts_urls_and_paths() {
        assert!(looks_like_link("https://shop.example.com/brands"));
        assert!(looks_like_link("/search/brands?q=x"));
        assert!(looks_like_link("?page=2"));
        assert!(!looks_like_link("Show brands"));
        assert!(!looks_like_link(""));
        assert!(!looks_like_link("<a href=\"/x\">"));
    }

    #[test]
    fn find_elements_prefers_first_capture_group() {
        let locator = Locator::new(r#"<li class="title">(.*?)</li>"#);
        let re = Regex::new(locator.as_str()).unwrap();
        let body = r#"<ul><li class="title">Bananas</li><li class="title">Kiwi</li></ul>"#;
        let found = find_elements(&re, &locator, body);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].content, "Bananas");
        assert_eq!(found[1].index, 1);
    }

    #[test]
    fn find_elements_falls_back_to_whole_match() {
        let locator = Locator::new(r"<form[^>]*>");
        let re = Regex::new(locator.as_str()).unwrap();
        let found = find_elements(&re, &locator, r#"<form action="/s">"#);
        assert_eq!(found[0].content, r#"<form action="/s">"#);
    }

    #[test]
    fn settings_default_matches_config_defaults() {
        let settings = HttpNavigatorSettings::default();
        assert_eq!(settings.wait_timeout, Duration::from_secs(5));
        assert_eq!(settings.poll_interval, Duration::from_millis(250));
        assert_eq!(settings.max_retries, 3);
    }
}
