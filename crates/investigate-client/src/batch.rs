//! Bounded-concurrency batch lookups.
//!
//! A batch converts every item into a request up front, loads them into a
//! work queue and starts a fixed pool of workers. Each worker drains the
//! queue, performs fetch-and-decode for each job and pushes one
//! [`BatchItem`] per job onto the output channel. When a worker finds the
//! queue empty it reports on a completion channel; a supervisor task waits
//! for every worker's report and then releases the last output sender,
//! which ends the [`BatchStream`].
//!
//! Results arrive in completion order, not input order.

use crate::transport::ApiRequest;
use crate::InvestigateClient;
use investigate_core::{DecodeMode, QueryType, Record, Resource, Result};
use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, instrument};

/// Outcome of one item of a batch
#[derive(Debug)]
pub struct BatchItem {
    /// The domain or IP as submitted
    pub item: String,
    /// Decoded record, or why the lookup failed
    pub outcome: Result<Record>,
}

impl BatchItem {
    /// Returns true if the lookup succeeded
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Drop the item name and keep the outcome
    pub fn into_result(self) -> Result<Record> {
        self.outcome
    }
}

/// Unordered stream of batch results
///
/// The stream ends once every submitted item has been reported. Dropping
/// it stops the workers after their in-flight request.
pub struct BatchStream {
    inner: ReceiverStream<BatchItem>,
    submitted: usize,
    workers: usize,
}

impl BatchStream {
    /// Receive the next finished item, or `None` once the batch is done
    pub async fn recv(&mut self) -> Option<BatchItem> {
        self.inner.next().await
    }

    /// Number of items submitted
    #[must_use]
    pub const fn submitted(&self) -> usize {
        self.submitted
    }

    /// Number of workers serving the batch, at most one per item
    #[must_use]
    pub const fn workers(&self) -> usize {
        self.workers
    }

    /// Wait for the whole batch
    pub async fn collect_all(self) -> Vec<BatchItem> {
        self.collect().await
    }

    /// Successful records only, failures discarded
    pub fn records(self) -> impl Stream<Item = Record> {
        self.filter_map(|item| item.outcome.ok())
    }
}

impl Stream for BatchStream {
    type Item = BatchItem;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.submitted))
    }
}

impl std::fmt::Debug for BatchStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchStream")
            .field("submitted", &self.submitted)
            .field("workers", &self.workers)
            .finish_non_exhaustive()
    }
}

/// Batch lookup builder
///
/// Every launcher must be called from within a Tokio runtime.
///
/// # Example
///
/// ```rust,ignore
/// let mut results = client
///     .batch()
///     .concurrency(4)
///     .ip_history(["208.64.121.161", "108.59.1.5"], QueryType::A);
///
/// while let Some(item) = results.recv().await {
///     match item.outcome {
///         Ok(record) => println!("{}: {:?}", item.item, record),
///         Err(err) => eprintln!("{}: {err}", item.item),
///     }
/// }
/// ```
#[derive(Debug)]
pub struct BatchApi {
    client: InvestigateClient,
    concurrency: Option<usize>,
    mode: Option<DecodeMode>,
}

impl BatchApi {
    pub(crate) const fn new(client: InvestigateClient) -> Self {
        Self {
            client,
            concurrency: None,
            mode: None,
        }
    }

    /// Override the client's worker count for this batch
    #[must_use]
    pub const fn concurrency(mut self, workers: usize) -> Self {
        self.concurrency = Some(workers);
        self
    }

    /// Override the client's decode mode for this batch
    #[must_use]
    pub const fn mode(mut self, mode: DecodeMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Record history of many IPs
    pub fn ip_history<I, S>(self, ips: I, query_type: QueryType) -> BatchStream
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run(Resource::IpHistory(query_type), ips)
    }

    /// Record history of many domains
    pub fn domain_history<I, S>(self, domains: I, query_type: QueryType) -> BatchStream
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run(Resource::DomainHistory(query_type), domains)
    }

    /// Categorization of many domains, one request each
    pub fn categorization<I, S>(self, domains: I, labels: bool) -> BatchStream
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run(Resource::Categorization { show_labels: labels }, domains)
    }

    /// Related domains of many domains
    pub fn related<I, S>(self, domains: I) -> BatchStream
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run(Resource::Related, domains)
    }

    /// Co-occurrences of many domains
    pub fn cooccurrences<I, S>(self, domains: I) -> BatchStream
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run(Resource::Cooccurrences, domains)
    }

    /// Security features of many domains
    pub fn security<I, S>(self, domains: I) -> BatchStream
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run(Resource::Security, domains)
    }

    /// Tags of many domains
    pub fn tags<I, S>(self, domains: I) -> BatchStream
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run(Resource::Tags, domains)
    }

    /// Latest malicious domains of many IPs
    pub fn latest_domains<I, S>(self, ips: I) -> BatchStream
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run(Resource::LatestDomains, ips)
    }

    /// WHOIS data of many domains
    pub fn whois<I, S>(self, domains: I) -> BatchStream
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run(Resource::Whois, domains)
    }

    /// Classifier scores of many domains
    pub fn score<I, S>(self, domains: I) -> BatchStream
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run(Resource::Score, domains)
    }

    /// Look up `resource` for every item
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[instrument(skip_all, fields(resource = resource.name()))]
    pub fn run<I, S>(self, resource: Resource, items: I) -> BatchStream
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let limit = self
            .concurrency
            .unwrap_or_else(|| self.client.concurrency());
        let mode = self.mode.unwrap_or_else(|| self.client.decode_mode());

        // Fully loaded before any worker starts; nothing is added afterwards.
        let jobs: VecDeque<Job> = items
            .into_iter()
            .map(|item| {
                let item = item.into();
                let request = self.client.resource_request(&resource, &item);
                Job { item, request }
            })
            .collect();
        let submitted = jobs.len();
        // Workers beyond the item count would only find an empty queue.
        let workers = limit.min(submitted).max(1);
        let queue = Arc::new(Mutex::new(jobs));

        let (out_tx, out_rx) = mpsc::channel(submitted.max(1));
        let (done_tx, mut done_rx) = mpsc::channel(workers);

        debug!(submitted, workers, ?mode, "starting batch");

        for id in 0..workers {
            let worker = Worker {
                id,
                client: self.client.clone(),
                resource,
                mode,
                queue: Arc::clone(&queue),
                out: out_tx.clone(),
            };
            let done = done_tx.clone();

            tokio::spawn(async move {
                let handled = worker.run().await;
                if done.send(id).await.is_err() {
                    debug!(worker = id, "batch supervisor gone");
                }
                debug!(worker = id, handled, "worker finished");
            });
        }
        drop(done_tx);

        tokio::spawn(async move {
            let mut finished = 0;
            while finished < workers {
                if done_rx.recv().await.is_none() {
                    break;
                }
                finished += 1;
            }
            // Last sender; dropping it ends the output stream.
            drop(out_tx);
            debug!(finished, "batch complete");
        });

        BatchStream {
            inner: ReceiverStream::new(out_rx),
            submitted,
            workers,
        }
    }
}

struct Job {
    item: String,
    request: Result<ApiRequest>,
}

struct Worker {
    id: usize,
    client: InvestigateClient,
    resource: Resource,
    mode: DecodeMode,
    queue: Arc<Mutex<VecDeque<Job>>>,
    out: mpsc::Sender<BatchItem>,
}

impl Worker {
    /// Drain the queue; returns the number of jobs handled
    async fn run(self) -> usize {
        let mut handled = 0;

        while let Some(Job { item, request }) = self.next_job() {
            let outcome = match request {
                Ok(request) => {
                    self.client
                        .fetch_request(&self.resource, &request, self.mode)
                        .await
                }
                Err(err) => Err(err),
            };

            if let Err(err) = &outcome {
                debug!(worker = self.id, item = %item, error = %err, "batch item failed");
            }
            handled += 1;

            if self.out.send(BatchItem { item, outcome }).await.is_err() {
                debug!(worker = self.id, "batch stream dropped, stopping");
                break;
            }
        }

        handled
    }

    fn next_job(&self) -> Option<Job> {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryConfig;
    use crate::transport::{RawResponse, Transport};
    use async_trait::async_trait;
    use investigate_core::{AttemptError, InvestigateError};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Serves `/links/name/{domain}.json`; domains starting with `bad` get a 404.
    #[derive(Default)]
    struct LinksTransport {
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    #[async_trait]
    impl Transport for LinksTransport {
        async fn execute(
            &self,
            request: &ApiRequest,
        ) -> std::result::Result<RawResponse, AttemptError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            let domain = request
                .url
                .path()
                .trim_start_matches("/links/name/")
                .trim_end_matches(".json")
                .to_string();
            // Uneven latency so completion order differs from input order.
            let delay = (domain.len() % 4) as u64 * 5;
            tokio::time::sleep(Duration::from_millis(delay)).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            if domain.starts_with("bad") {
                Ok(RawResponse::new(404, r#"{"errorMessage": "Not found"}"#))
            } else {
                Ok(RawResponse::new(200, format!(r#"{{"tb1": [["{domain}", 1]]}}"#)))
            }
        }
    }

    fn client_with(transport: Arc<LinksTransport>) -> InvestigateClient {
        InvestigateClient::builder("test-key")
            .base_url("https://investigate.test")
            .retry(RetryConfig::immediate())
            .transport(transport)
            .build()
            .unwrap()
    }

    fn domains(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("d{i}.example{}.com", "x".repeat(i % 3))).collect()
    }

    async fn run_related(workers: usize, items: &[String]) -> (Vec<BatchItem>, Arc<LinksTransport>) {
        let transport = Arc::new(LinksTransport::default());
        let client = client_with(transport.clone());
        let results = client
            .batch()
            .concurrency(workers)
            .related(items.iter().cloned())
            .collect_all()
            .await;
        (results, transport)
    }

    fn names(results: &[BatchItem]) -> HashSet<String> {
        results.iter().map(|r| r.item.clone()).collect()
    }

    #[tokio::test]
    async fn test_single_worker_delivers_every_item() {
        let items = domains(6);
        let (results, transport) = run_related(1, &items).await;

        assert_eq!(results.len(), 6);
        assert_eq!(names(&results), items.iter().cloned().collect());
        assert_eq!(transport.max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_workers_equal_to_items() {
        let items = domains(8);
        let (results, transport) = run_related(8, &items).await;

        assert_eq!(results.len(), 8);
        assert_eq!(names(&results), items.iter().cloned().collect());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 8);
    }

    #[tokio::test]
    async fn test_more_workers_than_items() {
        let items = domains(3);
        let (results, transport) = run_related(50, &items).await;

        assert_eq!(results.len(), 3);
        assert_eq!(names(&results), items.iter().cloned().collect());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_empty_batch_ends_immediately() {
        let (results, transport) = run_related(4, &[]).await;
        assert!(results.is_empty());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let items = domains(12);
        let (results, transport) = run_related(3, &items).await;

        assert_eq!(results.len(), 12);
        let max = transport.max_in_flight.load(Ordering::SeqCst);
        assert!(max <= 3, "saw {max} requests in flight");
    }

    #[tokio::test]
    async fn test_records_match_their_items() {
        let items = domains(5);
        let (results, _) = run_related(2, &items).await;

        for result in results {
            let list = result.outcome.unwrap();
            let related = list.as_related().unwrap();
            assert_eq!(related.related[0].domain, result.item);
        }
    }

    #[tokio::test]
    async fn test_failures_are_delivered_as_items() {
        let items = vec!["good.com".to_string(), "bad.com".to_string(), "fine.org".to_string()];
        let (results, transport) = run_related(2, &items).await;

        assert_eq!(results.len(), 3);
        // 404 is not retried
        assert_eq!(transport.calls.load(Ordering::SeqCst), 3);

        let failed: Vec<_> = results.iter().filter(|r| !r.is_ok()).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].item, "bad.com");
        assert!(matches!(
            failed[0].outcome,
            Err(InvestigateError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_records_skips_failures() {
        let transport = Arc::new(LinksTransport::default());
        let client = client_with(transport);
        let records: Vec<Record> = client
            .batch()
            .related(["a.com", "bad.net", "b.com"])
            .records()
            .collect()
            .await;

        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_client_concurrency_is_the_default() {
        let transport = Arc::new(LinksTransport::default());
        let client = client_with(transport);
        client.set_concurrency(3);

        let stream = client.batch().related(domains(4));
        assert_eq!(stream.workers(), 3);
        assert_eq!(stream.submitted(), 4);
        assert_eq!(stream.collect_all().await.len(), 4);
    }

    #[tokio::test]
    async fn test_unbounded_concurrency_is_capped_at_item_count() {
        let transport = Arc::new(LinksTransport::default());
        let client = client_with(transport.clone());
        client.set_concurrency(usize::MAX);

        let stream = client.batch().related(["a.com", "b.com"]);
        assert_eq!(stream.workers(), 2);
        assert_eq!(stream.collect_all().await.len(), 2);

        let stream = client.batch().concurrency(usize::MAX).related(Vec::<String>::new());
        assert_eq!(stream.workers(), 1);
        assert!(stream.collect_all().await.is_empty());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_zero_concurrency_runs_one_worker() {
        let transport = Arc::new(LinksTransport::default());
        let client = client_with(transport);

        let stream = client.batch().concurrency(0).related(domains(2));
        assert_eq!(stream.workers(), 1);
        assert_eq!(stream.collect_all().await.len(), 2);
    }

    #[tokio::test]
    async fn test_generic_mode_override() {
        let transport = Arc::new(LinksTransport::default());
        let client = client_with(transport);

        let mut stream = client.batch().mode(DecodeMode::Generic).related(["a.com"]);
        let item = stream.recv().await.unwrap();
        assert!(matches!(item.outcome, Ok(Record::Generic(_))));
        assert!(stream.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_client_decode_mode_applies_to_batches() {
        let client = InvestigateClient::builder("test-key")
            .base_url("https://investigate.test")
            .retry(RetryConfig::immediate())
            .decode_mode(DecodeMode::Generic)
            .transport(Arc::new(LinksTransport::default()))
            .build()
            .unwrap();

        let results = client.batch().related(["a.com"]).collect_all().await;
        assert!(matches!(results[0].outcome, Ok(Record::Generic(_))));

        let results = client
            .batch()
            .mode(DecodeMode::Typed)
            .related(["a.com"])
            .collect_all()
            .await;
        assert!(matches!(results[0].outcome, Ok(Record::Related(_))));
    }

    #[tokio::test]
    async fn test_dropping_stream_stops_workers() {
        let transport = Arc::new(LinksTransport::default());
        let client = client_with(transport.clone());

        let mut stream = client.batch().concurrency(1).related(domains(200));
        assert!(stream.recv().await.is_some());
        drop(stream);

        tokio::time::sleep(Duration::from_millis(100)).await;
        let calls = transport.calls.load(Ordering::SeqCst);
        assert!(calls < 200, "worker kept going after drop: {calls} calls");
    }
}
