use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use reqwest::header::{ACCEPT, USER_AGENT};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::cli::DownloadArgs;
use crate::page::UrlTemplate;
use crate::page_store;

#[derive(Debug, Clone)]
pub struct DownloadPlan {
    pub url_template: UrlTemplate,
    pub out_dir: PathBuf,
    pub total_pages: u32,
    pub concurrency: usize,
    pub timeout: Duration,
}

impl DownloadPlan {
    pub fn from_args(args: &DownloadArgs) -> anyhow::Result<Self> {
        let url_template = UrlTemplate::parse(&args.url_template).context("parse --url-template")?;
        Ok(Self {
            url_template,
            out_dir: PathBuf::from(&args.out),
            total_pages: args.total_pages,
            concurrency: args.concurrency.max(1),
            timeout: Duration::from_secs(args.timeout_secs),
        })
    }
}

#[derive(Debug)]
pub enum PageOutcome {
    Skipped,
    Downloaded,
    Failed(anyhow::Error),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: Vec<u32>,
}

pub async fn run(args: DownloadArgs) -> anyhow::Result<()> {
    let plan = DownloadPlan::from_args(&args)?;
    std::fs::create_dir_all(&plan.out_dir)
        .with_context(|| format!("create output dir: {}", plan.out_dir.display()))?;

    let client = build_http_client().context("build http client")?;
    tracing::info!(
        total = plan.total_pages,
        out = %plan.out_dir.display(),
        concurrency = plan.concurrency,
        "downloading pages"
    );

    let report = download_all(&client, &plan).await?;
    tracing::info!(
        downloaded = report.downloaded,
        skipped = report.skipped,
        failed = report.failed.len(),
        failed_pages = ?report.failed,
        "download finished"
    );
    Ok(())
}

pub fn build_http_client() -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .context("build reqwest client")
}

/// Attempts every page in `1..=total_pages`. Page failures, including a
/// panicking task, are logged and counted without stopping the batch.
pub async fn download_all(
    client: &reqwest::Client,
    plan: &DownloadPlan,
) -> anyhow::Result<BatchReport> {
    let semaphore = Arc::new(Semaphore::new(plan.concurrency));
    let mut tasks = JoinSet::new();
    let mut pages_by_task = HashMap::new();

    for page in 1..=plan.total_pages {
        let client = client.clone();
        let semaphore = Arc::clone(&semaphore);
        let url_template = plan.url_template.clone();
        let path = page_store::page_path(&plan.out_dir, page);
        let timeout = plan.timeout;

        let handle = tasks.spawn(async move {
            let outcome =
                download_page(&client, &semaphore, &url_template, page, &path, timeout).await;
            (page, outcome)
        });
        pages_by_task.insert(handle.id(), page);
    }

    Ok(collect_outcomes(tasks, &pages_by_task, plan.total_pages as usize).await)
}

async fn collect_outcomes(
    mut tasks: JoinSet<(u32, PageOutcome)>,
    pages_by_task: &HashMap<tokio::task::Id, u32>,
    total: usize,
) -> BatchReport {
    let mut progress = Progress::new(total);
    let mut report = BatchReport::default();

    while let Some(joined) = tasks.join_next().await {
        let (page, outcome) = match joined {
            Ok(finished) => finished,
            Err(err) => match pages_by_task.get(&err.id()) {
                Some(&page) => (
                    page,
                    PageOutcome::Failed(anyhow::anyhow!("page download task failed: {err}")),
                ),
                None => {
                    tracing::warn!(error = %err, "unknown download task failed");
                    progress.advance();
                    continue;
                }
            },
        };
        match outcome {
            PageOutcome::Skipped => {
                tracing::debug!(page, "page already present; skipping");
                report.skipped += 1;
            }
            PageOutcome::Downloaded => {
                tracing::debug!(page, "page downloaded");
                report.downloaded += 1;
            }
            PageOutcome::Failed(err) => {
                tracing::warn!(page, error = %format!("{err:#}"), "failed to download page");
                report.failed.push(page);
            }
        }
        progress.advance();
    }

    report.failed.sort_unstable();
    report
}

async fn download_page(
    client: &reqwest::Client,
    semaphore: &Semaphore,
    url_template: &UrlTemplate,
    page: u32,
    path: &Path,
    timeout: Duration,
) -> PageOutcome {
    match page_store::page_exists(path).await {
        Ok(true) => return PageOutcome::Skipped,
        Ok(false) => {}
        Err(err) => return PageOutcome::Failed(err),
    }

    let Ok(_permit) = semaphore.acquire().await else {
        return PageOutcome::Failed(anyhow::anyhow!("download semaphore is closed"));
    };

    match fetch_into(client, url_template, page, path, timeout).await {
        Ok(()) => PageOutcome::Downloaded,
        Err(err) => PageOutcome::Failed(err),
    }
}

async fn fetch_into(
    client: &reqwest::Client,
    url_template: &UrlTemplate,
    page: u32,
    path: &Path,
    timeout: Duration,
) -> anyhow::Result<()> {
    let url = url_template.url_for(page)?;
    let response = client
        .get(url.clone())
        .timeout(timeout)
        .header(USER_AGENT, "svgpages/0.1")
        .header(ACCEPT, "image/svg+xml,*/*;q=0.8")
        .send()
        .await
        .with_context(|| format!("GET {url}"))?
        .error_for_status()
        .with_context(|| format!("GET {url}"))?;
    let body = response
        .bytes()
        .await
        .with_context(|| format!("read body: {url}"))?;

    page_store::write_page(path, &body).await
}

/// Aggregate `completed/total` counter, logged at each 10% step.
#[derive(Debug)]
struct Progress {
    total: usize,
    completed: usize,
    last_decile: usize,
}

impl Progress {
    fn new(total: usize) -> Self {
        Self {
            total,
            completed: 0,
            last_decile: 0,
        }
    }

    fn advance(&mut self) -> bool {
        self.completed += 1;
        let decile = self.completed * 10 / self.total.max(1);
        if decile == self.last_decile && self.completed != self.total {
            return false;
        }
        self.last_decile = decile;
        tracing::info!(
            completed = self.completed,
            total = self.total,
            "progress {}/{}",
            self.completed,
            self.total
        );
        true
    }
}
