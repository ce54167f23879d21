use anyhow::{Context, Result};
use reqwest::blocking::Client;
use tracing::debug;

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Blocking GET of search-result pages with a browser user-agent.
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Any non-2xx status is an error for this page.
    pub fn fetch(&self, url: &str) -> Result<String> {
        debug!("Fetching search page: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .context("Failed to fetch search page")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Search page returned HTTP {}", status);
        }

        let body = response.text().context("Failed to read response body")?;
        debug!("Downloaded {} bytes from {}", body.len(), url);
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve_once;
    use pretty_assertions::assert_eq;

    #[test]
    fn success_returns_body() {
        let url = serve_once("200 OK", "<div data-cy=\"l-card\"></div>");
        let body = PageFetcher::new().unwrap().fetch(&url).unwrap();
        assert_eq!(body, "<div data-cy=\"l-card\"></div>");
    }

    #[test]
    fn not_found_is_a_fetch_error() {
        let url = serve_once("404 Not Found", "gone");
        let err = PageFetcher::new().unwrap().fetch(&url).unwrap_err();
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn server_error_is_a_fetch_error() {
        let url = serve_once("500 Internal Server Error", "<html>oops</html>");
        assert!(PageFetcher::new().unwrap().fetch(&url).is_err());
    }
}
