//! The page-navigation collaborator.
//!
//! Adapters never talk to a transport directly; they drive a [`Navigator`]
//! through locators. [`HttpNavigator`] handles server-rendered pages over
//! reqwest. Tests substitute scripted navigators.

mod http;

use std::time::Duration;

use async_trait::async_trait;
use stockcheck_core::Locator;

use crate::error::NavError;

pub use http::{HttpNavigator, HttpNavigatorSettings};

/// An element found on the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    /// Locator that produced this element.
    pub locator: String,
    /// Position among the locator's matches on the page.
    pub index: usize,
    /// Raw element content, possibly still containing markup.
    pub content: String,
}

impl ElementHandle {
    #[must_use]
    pub fn new(locator: &Locator, index: usize, content: impl Into<String>) -> Self {
        Self {
            locator: locator.as_str().to_string(),
            index,
            content: content.into(),
        }
    }
}

#[async_trait]
pub trait Navigator: Send {
    /// Loads `url` as the current page.
    async fn navigate(&mut self, url: &str) -> Result<(), NavError>;

    /// Waits until `locator` matches at least one element, for at most
    /// `timeout`. Returns every match in page order.
    ///
    /// # Errors
    ///
    /// [`NavError::Timeout`] if nothing matched in time.
    async fn wait_until(
        &mut self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<Vec<ElementHandle>, NavError>;

    /// Replaces the element's input text with `text` and submits it.
    async fn type_and_submit(&mut self, element: &ElementHandle, text: &str)
        -> Result<(), NavError>;

    /// Visible text of an element.
    async fn read_text(&mut self, element: &ElementHandle) -> Result<String, NavError>;

    async fn click(&mut self, element: &ElementHandle) -> Result<(), NavError>;

    /// Ends the session. Every later call fails with
    /// [`NavError::SessionClosed`]. Calling it twice is harmless.
    async fn quit(&mut self);
}
