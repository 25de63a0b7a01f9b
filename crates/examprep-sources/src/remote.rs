//! Remote past-paper scraper.
//!
//! Walks a past-paper site from a fixed index page: index → subject page →
//! term pages. On each term page linked documents are preferred; when none
//! of them yields questions, the page's own HTML is parsed instead.
//!
//! Every failure is contained here. [`PaperSource::acquire`] reports it as a
//! skip so the pipeline can fall through to the next tier.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::header::CONTENT_TYPE;
use reqwest::{StatusCode, Url};
use tracing::{debug, instrument, warn};

use examprep_core::model::{normalize_term, subject_aliases, PaperSet, Question};
use examprep_core::traits::{PaperOrigin, PaperSource, TierOutcome};

use crate::config::RemoteConfig;
use crate::document::{DocumentTextExtractor, PdfTextExtractor};
use crate::error::SourceError;
use crate::html::{extract_links, extract_title, question_blocks, Link};
use crate::parse::{extract_year, split_questions};

/// Minimum length of an HTML block accepted as a question.
const MIN_BLOCK_LEN: usize = 12;

/// Question text found on one term page.
#[derive(Debug)]
struct PageHarvest {
    year: i32,
    questions: Vec<String>,
}

/// Scrapes a past-paper website.
pub struct RemotePaperSource {
    client: reqwest::Client,
    base: Url,
    index: Url,
    settings: RemoteConfig,
    extractor: Arc<dyn DocumentTextExtractor>,
}

impl RemotePaperSource {
    pub fn new(config: &RemoteConfig) -> Result<Self, SourceError> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| SourceError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        let index = base
            .join(&config.index_path)
            .map_err(|e| SourceError::InvalidUrl(format!("{}: {e}", config.index_path)))?;

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| SourceError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base,
            index,
            settings: config.clone(),
            extractor: Arc::new(PdfTextExtractor),
        })
    }

    /// Replace the document text extractor.
    pub fn with_extractor(mut self, extractor: Arc<dyn DocumentTextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Crawl the site for `subject` and `term`.
    #[instrument(skip(self), fields(site = %self.base))]
    pub async fn crawl(&self, subject: &str, term: &str) -> Result<PaperSet, SourceError> {
        let subject_page = self.find_subject_page(subject).await?;
        debug!(url = %subject_page, "subject page located");

        let html = self.get_html(&subject_page).await?;
        let term_pages = self.term_links(&subject_page, &html, term);
        debug!(count = term_pages.len(), "term pages selected");

        let harvests: Vec<Option<PageHarvest>> = stream::iter(term_pages)
            .map(|url| async move {
                match self.harvest_page(&url).await {
                    Ok(harvest) => Some(harvest),
                    Err(e) => {
                        debug!(url = %url, error = %e, "skipping term page");
                        None
                    }
                }
            })
            .buffered(self.settings.concurrency.max(1))
            .collect()
            .await;

        let term = normalize_term(term);
        let subject = subject.trim();
        let mut set = PaperSet::new();
        let mut qid = 1;
        for PageHarvest { year, questions } in harvests.into_iter().flatten() {
            let prefix = if year == 0 {
                "u".to_string()
            } else {
                year.to_string()
            };
            let questions: Vec<Question> = questions
                .into_iter()
                .map(|text| {
                    let q = Question {
                        id: format!("{prefix}-{qid}"),
                        year,
                        subject: subject.to_string(),
                        term: term.clone(),
                        text,
                        kind: "general".into(),
                        choices: None,
                        answer: None,
                    };
                    qid += 1;
                    q
                })
                .collect();
            set.extend_year(year, questions);
        }
        set.prune_empty();

        if set.is_empty() {
            return Err(SourceError::NoContent {
                subject: subject.to_string(),
                term,
            });
        }
        Ok(set)
    }

    async fn find_subject_page(&self, subject: &str) -> Result<Url, SourceError> {
        let aliases = subject_aliases(subject);
        let html = self.get_html(&self.index).await?;
        extract_links(&html)
            .into_iter()
            .find(|link| {
                let text = link.text.to_lowercase();
                aliases.iter().any(|alias| text.contains(alias.as_str()))
            })
            .and_then(|link| self.index.join(&link.href).ok())
            .ok_or_else(|| SourceError::SubjectNotFound(subject.to_string()))
    }

    /// Same-site links from the subject page whose text names the term. When
    /// no link names it, every same-site link is used.
    fn term_links(&self, page: &Url, html: &str, term: &str) -> Vec<Url> {
        let links = extract_links(html);
        let wanted = normalize_term(term).to_lowercase();
        let named: Vec<&Link> = links
            .iter()
            .filter(|l| l.text.to_lowercase().contains(&wanted))
            .collect();
        let candidates = if named.is_empty() {
            links.iter().collect()
        } else {
            named
        };

        let mut seen = HashSet::new();
        candidates
            .into_iter()
            .filter_map(|l| page.join(&l.href).ok())
            .filter(|url| url.origin() == self.base.origin())
            .map(|mut url| {
                url.set_fragment(None);
                url
            })
            .filter(|url| seen.insert(url.to_string()))
            .take(self.settings.max_subpages)
            .collect()
    }

    async fn harvest_page(&self, url: &Url) -> Result<PageHarvest, SourceError> {
        let html = self.get_html(url).await?;
        let year = extract_title(&html)
            .and_then(|t| extract_year(&t))
            .or_else(|| extract_year(url.as_str()))
            .unwrap_or(0);

        let mut questions = Vec::new();
        for doc_url in self.document_links(url, &html) {
            match self.document_questions(&doc_url).await {
                Ok(found) => questions.extend(found),
                Err(e) => debug!(url = %doc_url, error = %e, "skipping document"),
            }
        }
        if questions.is_empty() {
            questions = question_blocks(&html, MIN_BLOCK_LEN);
        }
        Ok(PageHarvest { year, questions })
    }

    fn document_links(&self, page: &Url, html: &str) -> Vec<Url> {
        let mut seen = HashSet::new();
        extract_links(html)
            .into_iter()
            .filter(|l| l.href.to_lowercase().contains(".pdf"))
            .filter_map(|l| page.join(&l.href).ok())
            .filter(|url| seen.insert(url.to_string()))
            .take(self.settings.max_documents_per_page)
            .collect()
    }

    async fn document_questions(&self, url: &Url) -> Result<Vec<String>, SourceError> {
        let bytes = self.download(url).await?;
        let extractor = Arc::clone(&self.extractor);
        let max_pages = self.settings.max_document_pages;
        let text = tokio::task::spawn_blocking(move || extractor.extract(&bytes, max_pages))
            .await
            .map_err(|e| SourceError::Extraction(format!("extraction task failed: {e}")))??;
        Ok(split_questions(&text))
    }

    async fn get_html(&self, url: &Url) -> Result<String, SourceError> {
        let secs = self.settings.request_timeout_secs;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(url.as_str(), e, secs))?;
        if response.status() != StatusCode::OK {
            return Err(SourceError::Http {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        response
            .text()
            .await
            .map_err(|e| SourceError::from_reqwest(url.as_str(), e, secs))
    }

    async fn download(&self, url: &Url) -> Result<Vec<u8>, SourceError> {
        let secs = self.settings.document_timeout_secs;
        let response = self
            .client
            .get(url.clone())
            .timeout(Duration::from_secs(secs))
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(url.as_str(), e, secs))?;
        if response.status() != StatusCode::OK {
            return Err(SourceError::Http {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_lowercase();
        if !content_type.contains("pdf") && !url.path().to_lowercase().ends_with(".pdf") {
            return Err(SourceError::NotADocument {
                url: url.to_string(),
                content_type,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SourceError::from_reqwest(url.as_str(), e, secs))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl PaperSource for RemotePaperSource {
    fn name(&self) -> &str {
        "pastpapers"
    }

    fn origin(&self) -> PaperOrigin {
        PaperOrigin::Remote
    }

    async fn acquire(&self, subject: &str, term: &str) -> TierOutcome {
        match self.crawl(subject, term).await {
            Ok(set) => TierOutcome::Acquired(set).non_empty(),
            Err(e) => {
                warn!(tier = self.name(), error = %e, "remote acquisition failed");
                TierOutcome::skipped(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Extractor that ignores the bytes and returns canned text.
    struct CannedText(&'static str);

    impl DocumentTextExtractor for CannedText {
        fn extract(&self, _bytes: &[u8], _max_pages: usize) -> Result<String, SourceError> {
            Ok(self.0.to_string())
        }
    }

    const PAPER_TEXT: &str = "Grade 9 Mathematics\n\
                              1. Solve 2x + 4 = 10 for the value of x.\n\
                              2. Expand (x + 1)(x + 2) fully and simplify.";

    fn html_page(title: &str, body: &str) -> String {
        format!("<html><head><title>{title}</title></head><body>{body}</body></html>")
    }

    async fn mount_html(server: &MockServer, route: &str, html: String) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_raw(html, "text/html; charset=utf-8"))
            .mount(server)
            .await;
    }

    fn source(server: &MockServer) -> RemotePaperSource {
        let config = RemoteConfig {
            base_url: server.uri(),
            index_path: "/index/".into(),
            ..RemoteConfig::default()
        };
        RemotePaperSource::new(&config)
            .unwrap()
            .with_extractor(Arc::new(CannedText(PAPER_TEXT)))
    }

    async fn mount_site(server: &MockServer) {
        mount_html(
            server,
            "/index/",
            html_page(
                "Grade 9 Term Test Papers",
                r#"<a href="/science/">Grade 9 Science</a><a href="/maths/">Grade 9 Mathematics</a>"#,
            ),
        )
        .await;
        mount_html(
            server,
            "/maths/",
            html_page(
                "Grade 9 Maths Papers",
                r#"<a href="/maths/first-2021/">First Term Test 2021</a>
                   <a href="/maths/first-2020/#top">First Term Test 2020</a>
                   <a href="/maths/first-2020/">First Term Test 2020 (mirror)</a>
                   <a href="/maths/second-2021/">Second Term Test 2021</a>
                   <a href="https://elsewhere.example/first">First Term elsewhere</a>"#,
            ),
        )
        .await;
        mount_html(
            server,
            "/maths/first-2021/",
            html_page(
                "Grade 9 Maths First Term Test 2021",
                r#"<p>Download the paper below.</p><a href="/files/maths-2021.pdf">Download</a>"#,
            ),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/files/maths-2021.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4 fake".to_vec(), "application/pdf"))
            .mount(server)
            .await;
        mount_html(
            server,
            "/maths/first-2020/",
            html_page(
                "Grade 9 Maths First Term Test 2020",
                r#"<ol><li>Find the area of a triangle with base 6 cm and height 4 cm.</li></ol>"#,
            ),
        )
        .await;
    }

    #[tokio::test]
    async fn crawls_documents_and_html_pages() {
        let server = MockServer::start().await;
        mount_site(&server).await;

        let set = source(&server).crawl("Maths", "first").await.unwrap();
        assert_eq!(set.years().collect::<Vec<_>>(), vec![2020, 2021]);
        assert_eq!(set.total(), 3);

        let q = set.find("2021-1").unwrap();
        assert_eq!(q.text, "Solve 2x + 4 = 10 for the value of x.");
        assert_eq!(q.kind, "general");
        assert_eq!(q.term, "First term");
        assert!(q.answer.is_none());
        assert!(set.contains_id("2021-2"));

        let q = set.find("2020-3").unwrap();
        assert!(q.text.starts_with("Find the area of a triangle"));
    }

    #[tokio::test]
    async fn acquire_reports_remote_origin() {
        let server = MockServer::start().await;
        mount_site(&server).await;

        let source = source(&server);
        assert_eq!(source.origin(), PaperOrigin::Remote);
        let outcome = source.acquire("mathematics", "First term").await;
        assert!(matches!(outcome, TierOutcome::Acquired(ref s) if s.total() == 3));
    }

    #[tokio::test]
    async fn unknown_subject_is_skipped() {
        let server = MockServer::start().await;
        mount_site(&server).await;

        let source = source(&server);
        let err = source.crawl("History", "First term").await.unwrap_err();
        assert!(matches!(err, SourceError::SubjectNotFound(ref s) if s == "History"));
        assert!(matches!(
            source.acquire("History", "First term").await,
            TierOutcome::Skipped { .. }
        ));
    }

    #[tokio::test]
    async fn index_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/index/"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = source(&server).crawl("Maths", "First term").await.unwrap_err();
        assert!(matches!(err, SourceError::Http { status: 503, .. }));
    }

    #[tokio::test]
    async fn slow_index_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/index/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<a href=\"/maths/\">Maths</a>")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let config = RemoteConfig {
            base_url: server.uri(),
            index_path: "/index/".into(),
            request_timeout_secs: 1,
            ..RemoteConfig::default()
        };
        let err = RemotePaperSource::new(&config)
            .unwrap()
            .crawl("Maths", "First term")
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Timeout { secs: 1, .. }));
    }

    #[tokio::test]
    async fn non_document_attachment_falls_back_to_html() {
        let server = MockServer::start().await;
        mount_html(
            &server,
            "/index/",
            html_page("Index", r#"<a href="/english/">English papers</a>"#),
        )
        .await;
        mount_html(
            &server,
            "/english/",
            html_page("English", r#"<a href="/english/third-term-2019/">Third term papers</a>"#),
        )
        .await;
        mount_html(
            &server,
            "/english/third-term-2019/",
            html_page(
                "English Third Term",
                r#"<a href="/get?file=english.pdf">paper</a>
                   <div class="question">Rewrite the sentence in the passive voice.</div>"#,
            ),
        )
        .await;
        mount_html(&server, "/get", "<html>login required</html>".into()).await;

        let set = source(&server).crawl("English", "third").await.unwrap();
        // year comes from the url when the title has none
        let q = set.find("2019-1").unwrap();
        assert_eq!(q.text, "Rewrite the sentence in the passive voice.");
        assert_eq!(set.total(), 1);
    }

    #[tokio::test]
    async fn nothing_found_is_no_content() {
        let server = MockServer::start().await;
        mount_html(
            &server,
            "/index/",
            html_page("Index", r#"<a href="/science/">Science</a>"#),
        )
        .await;
        mount_html(&server, "/science/", html_page("Science", "<p>Coming soon</p>")).await;

        let err = source(&server).crawl("Science", "Second term").await.unwrap_err();
        assert!(matches!(err, SourceError::NoContent { .. }));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let config = RemoteConfig {
            base_url: "not a url".into(),
            ..RemoteConfig::default()
        };
        assert!(matches!(
            RemotePaperSource::new(&config),
            Err(SourceError::InvalidUrl(_))
        ));
    }
}
