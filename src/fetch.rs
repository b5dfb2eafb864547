use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tracing::{info, warn};

const CONCURRENCY: usize = 8;
const TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = concat!("judgeman/", env!("CARGO_PKG_VERSION"));

/// One loaded source: HTML on success, the error text otherwise.
#[derive(Debug)]
pub struct FetchedPage {
    pub source: String,
    pub html: Option<String>,
    pub error: Option<String>,
    pub latency_ms: i64,
}

pub fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

pub fn client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build HTTP client")
}

/// Load a document from a local path or an http(s) URL.
pub async fn load(client: &reqwest::Client, source: &str) -> Result<String> {
    if is_url(source) {
        info!("Fetching {}", source);
        let resp = client
            .get(source)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", source))?
            .error_for_status()
            .with_context(|| format!("Bad response from {}", source))?;
        resp.text()
            .await
            .with_context(|| format!("Failed to read body of {}", source))
    } else {
        let path = Path::new(source);
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Load many sources concurrently. Failures are kept as error rows so the
/// caller can report them alongside successes. Pages come back in input order.
pub async fn load_all(sources: Vec<String>) -> Result<Vec<FetchedPage>> {
    let client = client()?;
    let semaphore = Arc::new(Semaphore::new(CONCURRENCY));
    let total = sources.len();

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    let (tx, mut rx) = tokio::sync::mpsc::channel::<(usize, FetchedPage)>(CONCURRENCY * 2);

    for (index, source) in sources.into_iter().enumerate() {
        let client = client.clone();
        let sem = Arc::clone(&semaphore);
        let tx = tx.clone();

        tokio::spawn(async move {
            let Ok(_permit) = sem.acquire().await else {
                return;
            };
            let start = Instant::now();
            let result = load(&client, &source).await;
            let latency_ms = start.elapsed().as_millis() as i64;
            let page = match result {
                Ok(html) => FetchedPage {
                    source,
                    html: Some(html),
                    error: None,
                    latency_ms,
                },
                Err(e) => {
                    warn!("Load failed for {}: {:#}", source, e);
                    FetchedPage {
                        source,
                        html: None,
                        error: Some(format!("{:#}", e)),
                        latency_ms,
                    }
                }
            };
            let _ = tx.send((index, page)).await;
        });
    }

    // rx closes once every task has dropped its sender
    drop(tx);

    let mut indexed = Vec::with_capacity(total);
    while let Some(entry) = rx.recv().await {
        indexed.push(entry);
        pb.inc(1);
    }
    pb.finish_and_clear();

    indexed.sort_by_key(|(index, _)| *index);
    let pages: Vec<FetchedPage> = indexed.into_iter().map(|(_, page)| page).collect();

    let errors = pages.iter().filter(|p| p.error.is_some()).count();
    let avg_ms = pages.iter().map(|p| p.latency_ms).sum::<i64>() / pages.len().max(1) as i64;
    info!(
        "Loaded {} sources ({} ok, {} errors, avg {}ms)",
        total,
        total - errors,
        errors,
        avg_ms
    );
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_detection() {
        assert!(is_url("https://www.elitigation.sg/gd/s/2009_SGCA_3"));
        assert!(is_url("http://localhost:8000/a.html"));
        assert!(!is_url("tests/fixtures/judgment.html"));
        assert!(!is_url("ftp://example.com/x"));
    }

    #[tokio::test]
    async fn load_local_file() {
        let client = client().unwrap();
        let html = load(&client, "tests/fixtures/judgment.html").await.unwrap();
        assert!(html.contains("info-table"));
    }

    #[tokio::test]
    async fn load_missing_file_is_error() {
        let client = client().unwrap();
        let err = load(&client, "tests/fixtures/does-not-exist.html").await.unwrap_err();
        assert!(format!("{:#}", err).contains("does-not-exist.html"));
    }

    #[tokio::test]
    async fn load_local_file_with_invalid_utf8() {
        let path = std::env::temp_dir().join(format!("judgeman-cp1252-{}.html", std::process::id()));
        std::fs::write(&path, b"<p class=\"Judg-1\">1 Caf\xe9 owner</p>").unwrap();
        let client = client().unwrap();
        let html = load(&client, path.to_str().unwrap()).await.unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(html.contains("1 Caf\u{FFFD} owner"));
    }

    #[tokio::test]
    async fn load_all_returns_input_order() {
        let sources: Vec<String> = (0..20)
            .map(|i| {
                if i % 3 == 0 {
                    format!("tests/fixtures/missing-{}.html", i)
                } else {
                    "tests/fixtures/judgment.html".to_string()
                }
            })
            .collect();
        let pages = load_all(sources.clone()).await.unwrap();
        let got: Vec<&str> = pages.iter().map(|p| p.source.as_str()).collect();
        assert_eq!(got, sources);
    }

    #[tokio::test]
    async fn load_all_keeps_failures() {
        let pages = load_all(vec![
            "tests/fixtures/judgment.html".to_string(),
            "tests/fixtures/missing.html".to_string(),
        ])
        .await
        .unwrap();
        assert_eq!(pages.len(), 2);
        let ok = pages.iter().find(|p| p.source.ends_with("judgment.html")).unwrap();
        assert!(ok.html.is_some() && ok.error.is_none());
        let bad = pages.iter().find(|p| p.source.ends_with("missing.html")).unwrap();
        assert!(bad.html.is_none() && bad.error.is_some());
    }
}
