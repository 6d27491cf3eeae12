//! Contributor fetching and HTML extraction.
//!
//! Fetches the rendered `contributors-list` fragment from the git host's
//! web UI and scrapes contributor identities out of it. Fetching is
//! best-effort: every transport or HTTP failure degrades to an empty list
//! so a missing remote page never fails the build.

use std::time::Duration;

use reqwest::blocking::Client;
use scraper::{Html, Selector};
use tracing::{debug, error, info, warn};
use url::Url;

use bylines_shared::{BylinesError, Contributor, Result};

/// User-Agent string for fetch requests.
const USER_AGENT: &str = concat!("bylines/", env!("CARGO_PKG_VERSION"));

/// Synchronous client for the git host's contributors-list endpoint.
pub struct ContributorClient {
    client: Client,
    host_url: Url,
}

impl ContributorClient {
    /// Create a client targeting the web UI at `host_url` (trailing slash).
    pub fn new(host_url: Url) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| BylinesError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, host_url })
    }

    /// Base URL of the host's web UI.
    pub fn host_url(&self) -> &Url {
        &self.host_url
    }

    /// Fetch the contributors for `path` on `branch` of `repository`.
    ///
    /// Returns an empty list on any failure; a 404 is an expected condition
    /// (file not pushed yet, or part of a submodule) and is only logged.
    pub fn contributors(&self, repository: &str, branch: &str, path: &str) -> Vec<Contributor> {
        let url = format!(
            "{}{repository}/contributors-list/{branch}/{path}",
            self.host_url
        );
        info!(path, "fetching contributors");
        debug!(%url, "contributors-list request");

        let response = match self.client.get(&url).send() {
            Ok(response) => response,
            Err(e) => {
                error!(%url, error = %e, "contributors fetch failed");
                return Vec::new();
            }
        };

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            info!(%url, "contributors listing not found (normal if the file is not on the remote yet, or a git submodule)");
            return Vec::new();
        }
        if !status.is_success() {
            error!(%url, %status, "contributors fetch returned an error status");
            return Vec::new();
        }

        let body = match response.text() {
            Ok(body) => body,
            Err(e) => {
                error!(%url, error = %e, "failed to read contributors response body");
                return Vec::new();
            }
        };

        parse_contributors(&body, &self.host_url)
    }
}

/// Extract contributors from a rendered contributors-list HTML fragment.
///
/// Each `<li>` is one contributor: the first `<a>`'s href (slashes stripped)
/// is the login, the first `<img>`'s src (query string stripped) is the
/// avatar. Document order is preserved and duplicates are kept; a malformed
/// item is skipped rather than failing the page.
pub fn parse_contributors(html: &str, host_url: &Url) -> Vec<Contributor> {
    let doc = Html::parse_document(html);
    let li_sel = Selector::parse("li").unwrap();
    let a_sel = Selector::parse("a").unwrap();
    let img_sel = Selector::parse("img").unwrap();

    let mut contributors = Vec::new();

    for li in doc.select(&li_sel) {
        let Some(href) = li
            .select(&a_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
        else {
            warn!("skipping contributor entry without a profile link");
            continue;
        };

        let Some(src) = li
            .select(&img_sel)
            .next()
            .and_then(|img| img.value().attr("src"))
        else {
            warn!("skipping contributor entry without an avatar image");
            continue;
        };

        let login = href.replace('/', "");
        let avatar = src.split('?').next().unwrap_or(src).to_string();

        contributors.push(Contributor {
            url: format!("{host_url}{login}"),
            name: login.clone(),
            login,
            avatar,
        });
    }

    contributors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> Url {
        Url::parse("https://github.com/").unwrap()
    }

    const LISTING: &str = r#"
        <ul>
          <li><a href="/alice"><img src="https://avatars.example.com/alice.png?s=40&v=4"></a></li>
          <li><a href="/bob"><img src="https://avatars.example.com/bob.png"></a></li>
        </ul>
    "#;

    #[test]
    fn parses_logins_urls_and_avatars() {
        let contributors = parse_contributors(LISTING, &host());

        assert_eq!(contributors.len(), 2);
        assert_eq!(contributors[0].login, "alice");
        assert_eq!(contributors[0].name, "alice");
        assert_eq!(contributors[0].url, "https://github.com/alice");
        assert_eq!(contributors[0].avatar, "https://avatars.example.com/alice.png");
        assert_eq!(contributors[1].login, "bob");
    }

    #[test]
    fn preserves_document_order_and_duplicates() {
        let html = r#"
            <li><a href="/zoe"><img src="https://a/z.png"></a></li>
            <li><a href="/amy"><img src="https://a/a.png"></a></li>
            <li><a href="/zoe"><img src="https://a/z.png"></a></li>
        "#;
        let logins: Vec<String> = parse_contributors(html, &host())
            .into_iter()
            .map(|c| c.login)
            .collect();
        assert_eq!(logins, ["zoe", "amy", "zoe"]);
    }

    #[test]
    fn malformed_items_are_skipped() {
        let html = r#"
            <li>plain text</li>
            <li><a href="/no-image">x</a></li>
            <li><img src="https://a/no-anchor.png"></li>
            <li><a href="/carol"><img src="https://a/c.png?s=64"></a></li>
        "#;
        let contributors = parse_contributors(html, &host());
        assert_eq!(contributors.len(), 1);
        assert_eq!(contributors[0].login, "carol");
        assert_eq!(contributors[0].avatar, "https://a/c.png");
    }

    #[test]
    fn enterprise_host_shapes_profile_urls() {
        let host = Url::parse("https://git.example.com/").unwrap();
        let html = r#"<li><a href="/dave"><img src="https://a/d.png"></a></li>"#;
        let contributors = parse_contributors(html, &host);
        assert_eq!(contributors[0].url, "https://git.example.com/dave");
    }

    #[test]
    fn fetch_failure_yields_empty_list() {
        // Port 1 on loopback refuses connections; the fetch must degrade
        // to an empty list instead of propagating the error.
        let client = ContributorClient::new(Url::parse("http://127.0.0.1:1/").unwrap()).unwrap();
        let contributors = client.contributors("owner/repo", "master", "docs/index.md");
        assert!(contributors.is_empty());
    }
}
