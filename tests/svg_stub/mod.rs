use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct SvgStubConfig {
    /// Pages answered with 404.
    pub missing_pages: HashSet<u32>,
    /// Time each response is held before it is sent.
    pub delay: Duration,
}

#[derive(Debug, Default)]
pub struct SvgStubStats {
    pub requests: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

pub struct SvgStub {
    pub base_url: String,
    pub stats: Arc<SvgStubStats>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl SvgStub {
    pub fn spawn(config: SvgStubConfig) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start svg stub server");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}");
        let stats = Arc::new(SvgStubStats::default());

        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let server_stats = Arc::clone(&stats);
        let handle = thread::spawn(move || {
            let mut workers = Vec::new();
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let request = match server.recv_timeout(Duration::from_millis(20)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let stats = Arc::clone(&server_stats);
                let config = config.clone();
                workers.push(thread::spawn(move || {
                    stats.requests.fetch_add(1, Ordering::SeqCst);
                    let now = stats.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    stats.max_in_flight.fetch_max(now, Ordering::SeqCst);

                    thread::sleep(config.delay);
                    let response = respond_for(request.url(), &config);
                    stats.in_flight.fetch_sub(1, Ordering::SeqCst);
                    let _ = request.respond(response);
                }));
            }
            for worker in workers {
                let _ = worker.join();
            }
        });

        Self {
            base_url,
            stats,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn url_template(&self) -> String {
        format!("{}/doc/page_{{i}}.svg", self.base_url)
    }

    pub fn requests(&self) -> usize {
        self.stats.requests.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.stats.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Drop for SvgStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

pub fn page_body(page: u32) -> String {
    format!("<svg xmlns=\"http://www.w3.org/2000/svg\"><text>page {page}</text></svg>")
}

fn respond_for(
    url: &str,
    config: &SvgStubConfig,
) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    let page = url
        .strip_prefix("/doc/page_")
        .and_then(|rest| rest.strip_suffix(".svg"))
        .and_then(|digits| digits.parse::<u32>().ok());

    match page {
        Some(page) if !config.missing_pages.contains(&page) => {
            let header =
                tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"image/svg+xml"[..])
                    .expect("build header");
            tiny_http::Response::from_string(page_body(page)).with_header(header)
        }
        _ => tiny_http::Response::from_string("not found").with_status_code(404),
    }
}
