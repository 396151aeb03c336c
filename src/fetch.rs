//! Page-fetch collaborator.
//!
//! Retrieves a URL with a bounded timeout and reduces the HTML to
//! newline-separated plain text for the extractors. Timeouts and HTTP
//! errors are per-URL conditions: callers exclude the URL and move on.

use crate::config::FetchConfig;
use crate::error::{Result, TocForgeError};
use reqwest::Client;
use std::io::Cursor;
use std::time::Duration;

/// Render width for the HTML-to-text conversion; generous so heading lines
/// do not wrap and split mid-title.
const TEXT_WIDTH: usize = 500;

/// Plain text retrieved from one page.
#[derive(Debug, Clone)]
pub struct RawPageText {
    pub url: String,
    /// Newline-separated plain text of the page body.
    pub text: String,
    /// Contents of the HTML `<title>` element, when present.
    pub page_title: Option<String>,
}

/// Fetches pages and converts them to plain text.
#[derive(Clone)]
pub struct PageFetcher {
    client: Client,
    config: FetchConfig,
}

impl PageFetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: FetchConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Fetch `url` and return its plain text.
    pub async fn fetch(&self, url: &str) -> Result<RawPageText> {
        let response = self
            .client
            .get(url)
            .header("User-Agent", &self.config.user_agent)
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .send()
            .await
            .map_err(|e| fetch_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TocForgeError::FetchError {
                url: url.to_string(),
                reason: format!("HTTP {status}"),
            });
        }

        let html = response.text().await.map_err(|e| fetch_error(url, e))?;
        if html.trim().is_empty() {
            return Err(TocForgeError::FetchError {
                url: url.to_string(),
                reason: "empty response body".to_string(),
            });
        }

        Ok(Self::from_html(url, &html))
    }

    /// Reduce raw HTML to a [`RawPageText`].
    pub fn from_html(url: &str, html: &str) -> RawPageText {
        // html2text expects bytes; fall back to the raw markup if the
        // document defeats the converter.
        let text = html2text::from_read(Cursor::new(html.as_bytes()), TEXT_WIDTH)
            .unwrap_or_else(|_| html.to_string());

        RawPageText {
            url: url.to_string(),
            text,
            page_title: page_title(html),
        }
    }
}

fn fetch_error(url: &str, err: reqwest::Error) -> TocForgeError {
    if err.is_timeout() {
        TocForgeError::FetchTimeout {
            url: url.to_string(),
        }
    } else {
        TocForgeError::FetchError {
            url: url.to_string(),
            reason: err.to_string(),
        }
    }
}

fn page_title(html: &str) -> Option<String> {
    let document = scraper::Html::parse_document(html);
    let selector = scraper::Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html>
<head><title>某书目录页</title></head>
<body>
<h1>目录</h1>
<ul>
<li>第一章 绪论</li>
<li>第二章 模型评估</li>
</ul>
</body>
</html>"#;

    #[test]
    fn test_html_reduces_to_lines() {
        let page = PageFetcher::from_html("https://example.com/toc", PAGE);

        assert_eq!(page.url, "https://example.com/toc");
        let lines: Vec<&str> = page.text.lines().map(str::trim).collect();
        assert!(lines.iter().any(|l| l.contains("第一章 绪论")));
        assert!(lines.iter().any(|l| l.contains("第二章 模型评估")));
    }

    #[test]
    fn test_page_title_is_probed() {
        let page = PageFetcher::from_html("u", PAGE);
        assert_eq!(page.page_title.as_deref(), Some("某书目录页"));
    }

    #[test]
    fn test_missing_title_is_none() {
        let page = PageFetcher::from_html("u", "<html><body><p>hello</p></body></html>");
        assert_eq!(page.page_title, None);
    }
}
