//! # Collection Pipeline Module
//!
//! Drives one collection run: plan the search tasks, search each one under the
//! retry policy, process every result into an article, and save the articles
//! that clear the value threshold.
//!
//! A run moves through [`RunState::Planning`], `Searching`, `Processing` and
//! `Persisting` to [`RunState::Done`]. Only an invalid configuration sends it
//! to [`RunState::Failed`]; every per-task and per-article failure is counted
//! in [`RunStats`] and logged, and the run carries on.
//!
//! Tasks run strictly one after another in planner order, so every article
//! of a higher-priority task is handled before the next task starts.

mod config;
mod error;

pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use error::PipelineError;

use crate::analyzer::ContentAnalyzer;
use crate::config::AppConfig;
use crate::fetch::{HttpPageFetcher, PageFetcher};
use crate::model::deepseek_model;
use crate::planner::{SearchTask, SearchTaskPlanner};
use crate::processor::{ArticleProcessor, ProcessorConfig};
use crate::search::{GoogleSearchClient, SearchProvider, search_with_retry};
use crate::store::ArticleStore;
use rig::completion::CompletionModel;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

/// Stage of a collection run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunState {
    /// Building the task list
    Planning,
    /// Waiting on the search API
    Searching,
    /// Fetching and analyzing a result
    Processing,
    /// Writing an article to the store
    Persisting,
    /// All tasks handled, or the run was cancelled
    Done,
    /// Configuration was unusable
    Failed,
}

/// Counters for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Tasks started
    pub tasks_run: usize,
    /// Tasks abandoned because the search failed
    pub tasks_failed: usize,
    /// Search results received
    pub results_fetched: usize,
    /// Articles written to the store
    pub articles_saved: usize,
    /// Results whose URL was already seen or already stored
    pub articles_skipped_duplicate: usize,
    /// Articles analyzed but scored below the threshold
    pub articles_dropped_low_value: usize,
    /// Results dropped by the processor
    pub articles_dropped: usize,
    /// Search failures and store failures
    pub errors: usize,
    /// Whether the run stopped early on request
    pub cancelled: bool,
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tasks run:               {}", self.tasks_run)?;
        writeln!(f, "Tasks failed:            {}", self.tasks_failed)?;
        writeln!(f, "Results fetched:         {}", self.results_fetched)?;
        writeln!(f, "Articles saved:          {}", self.articles_saved)?;
        writeln!(f, "Skipped (duplicate):     {}", self.articles_skipped_duplicate)?;
        writeln!(f, "Dropped (low value):     {}", self.articles_dropped_low_value)?;
        writeln!(f, "Dropped (processing):    {}", self.articles_dropped)?;
        write!(f, "Errors:                  {}", self.errors)?;
        if self.cancelled {
            write!(f, "\nRun was cancelled")?;
        }
        Ok(())
    }
}

/// Sent after each finished task
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    /// Zero-based index of the finished task
    pub task_index: usize,
    /// Number of tasks in this run
    pub total_tasks: usize,
    /// Query of the finished task
    pub query: String,
    /// Counters so far
    pub stats: RunStats,
}

/// One collection run over a planner, a search provider, a processor and a store
pub struct CollectionPipeline<S, F, M>
where
    S: SearchProvider,
    F: PageFetcher,
    M: CompletionModel,
{
    planner: SearchTaskPlanner,
    provider: S,
    processor: ArticleProcessor<F, M>,
    store: ArticleStore,
    config: PipelineConfig,
    state: RunState,
    progress: Option<mpsc::Sender<ProgressEvent>>,
    cancel: Arc<AtomicBool>,
}

impl<S, F, M> CollectionPipeline<S, F, M>
where
    S: SearchProvider + Sync,
    F: PageFetcher,
    M: CompletionModel,
{
    /// Assemble a pipeline from its parts
    pub fn new(
        planner: SearchTaskPlanner,
        provider: S,
        processor: ArticleProcessor<F, M>,
        store: ArticleStore,
        config: PipelineConfig,
    ) -> Self {
        Self {
            planner,
            provider,
            processor,
            store,
            config,
            state: RunState::Planning,
            progress: None,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Send a [`ProgressEvent`] on `sender` after every task
    pub fn with_progress(mut self, sender: mpsc::Sender<ProgressEvent>) -> Self {
        self.progress = Some(sender);
        self
    }

    /// Flag that stops the run before the next task once set
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Current stage
    pub fn state(&self) -> RunState {
        self.state
    }

    /// The store articles are written to
    pub fn store(&self) -> &ArticleStore {
        &self.store
    }

    /// Configuration in use
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Execute the run
    ///
    /// Returns an error only for an invalid configuration.
    #[instrument(skip(self), fields(min_score = self.config.min_value_score))]
    pub async fn run(&mut self) -> crate::error::Result<RunStats> {
        self.state = RunState::Planning;
        if let Err(reason) = self.config.validate() {
            error!("Invalid pipeline configuration: {}", reason);
            self.state = RunState::Failed;
            return Err(PipelineError::Config(reason).into());
        }

        let mut tasks = self.planner.plan();
        if let Some(max) = self.config.max_tasks {
            tasks.truncate(max);
        }
        info!("Planned {} search tasks", tasks.len());

        // URLs already stored count as duplicates without being re-analyzed
        let mut seen = match self.store.existing_urls().await {
            Ok(urls) => urls,
            Err(e) => {
                warn!("Could not load stored URLs, relying on the unique index: {}", e);
                HashSet::new()
            }
        };
        debug!("Loaded {} known URLs", seen.len());

        let mut stats = RunStats::default();
        let total_tasks = tasks.len();

        for (index, task) in tasks.iter().enumerate() {
            if index > 0 && !self.config.task_delay.is_zero() && !self.is_cancelled() {
                tokio::time::sleep(self.config.task_delay).await;
            }
            if self.is_cancelled() {
                info!("Run cancelled before task {}", index + 1);
                stats.cancelled = true;
                break;
            }

            self.run_task(task, index, total_tasks, &mut seen, &mut stats)
                .await;

            if let Some(progress) = &self.progress {
                let event = ProgressEvent {
                    task_index: index,
                    total_tasks,
                    query: task.query.clone(),
                    stats: stats.clone(),
                };
                if progress.send(event).await.is_err() {
                    debug!("Progress receiver dropped");
                }
            }
        }

        self.state = RunState::Done;
        info!(
            tasks_run = stats.tasks_run,
            saved = stats.articles_saved,
            skipped = stats.articles_skipped_duplicate,
            low_value = stats.articles_dropped_low_value,
            dropped = stats.articles_dropped,
            errors = stats.errors,
            "Collection run finished"
        );
        Ok(stats)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    async fn run_task(
        &mut self,
        task: &SearchTask,
        index: usize,
        total_tasks: usize,
        seen: &mut HashSet<String>,
        stats: &mut RunStats,
    ) {
        info!(
            task = index + 1,
            total = total_tasks,
            query = %task.query,
            priority = task.priority,
            "Task started"
        );
        stats.tasks_run += 1;

        self.state = RunState::Searching;
        let results = match search_with_retry(
            &self.provider,
            task,
            self.config.results_per_task,
            &self.config.retry_policy,
        )
        .await
        {
            Ok(results) => results,
            Err(e) => {
                error!(query = %task.query, error = %e, "Search failed, abandoning task");
                stats.tasks_failed += 1;
                stats.errors += 1;
                return;
            }
        };
        stats.results_fetched += results.len();

        for result in results.iter().take(self.config.results_per_task as usize) {
            if seen.contains(&result.url) {
                info!(url = %result.url, "Article skipped: duplicate URL");
                stats.articles_skipped_duplicate += 1;
                continue;
            }

            // Dropped URLs stay unseen so a later task may try them again
            self.state = RunState::Processing;
            let record = match self.processor.process_for_task(result, task).await {
                Ok(record) => record,
                Err(e) => {
                    info!(url = %result.url, reason = e.reason(), error = %e, "Article dropped");
                    stats.articles_dropped += 1;
                    continue;
                }
            };
            seen.insert(result.url.clone());

            if record.value_score < self.config.min_value_score {
                info!(
                    url = %record.url,
                    score = record.value_score,
                    "Article dropped: below value threshold"
                );
                stats.articles_dropped_low_value += 1;
                continue;
            }

            self.state = RunState::Persisting;
            match self.store.save(&record).await {
                Ok(outcome) if outcome.inserted => {
                    info!(
                        url = %record.url,
                        id = outcome.id,
                        score = record.value_score,
                        title = %record.title,
                        "Article saved"
                    );
                    stats.articles_saved += 1;
                }
                Ok(_) => {
                    info!(url = %record.url, "Article skipped: already stored");
                    stats.articles_skipped_duplicate += 1;
                }
                Err(e) => {
                    error!(url = %record.url, error = %e, "Failed to save article");
                    stats.errors += 1;
                }
            }
        }
    }
}

/// Build the production pipeline from the application configuration
///
/// Opens (and if needed creates) the store, and wires the Google search
/// client, the HTTP page fetcher and the rate-limited DeepSeek model.
pub async fn build_pipeline(
    config: &AppConfig,
    planner: SearchTaskPlanner,
    pipeline_config: PipelineConfig,
) -> crate::error::Result<
    CollectionPipeline<GoogleSearchClient, HttpPageFetcher, impl CompletionModel + use<>>,
> {
    pipeline_config
        .validate()
        .map_err(PipelineError::Config)?;

    let store_path = config.database_path.to_string_lossy();
    let store = ArticleStore::new_from_path(&store_path).await?;

    let provider = GoogleSearchClient::new(
        config.google_api_key.clone(),
        config.search_engine_id.clone(),
        config.request_timeout,
    )?;
    let fetcher = HttpPageFetcher::new(config.fetcher_config())?;
    let analyzer = ContentAnalyzer::new(deepseek_model(config)?, config.analyzer_config());
    let processor = ArticleProcessor::new(fetcher, analyzer, ProcessorConfig::default());

    Ok(CollectionPipeline::new(
        planner,
        provider,
        processor,
        store,
        pipeline_config,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FetchError, FetchedPage, PageMetadata};
    use crate::model::mock_model::MockCompletionModel;
    use crate::planner::{ModifierGroup, SubjectGroup};
    use crate::analyzer::AnalyzerConfig;
    use crate::search::{SearchError, SearchResult};
    use crate::store::ArticleRecord;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::tempdir;

    /// Writes to the database behind the pipeline's back on the first search
    enum StoreChange {
        Insert(ArticleRecord),
        DropArticles,
    }

    /// Answers each query from a fixed table
    struct TableProvider {
        results: HashMap<String, Result<Vec<SearchResult>, String>>,
        queries: Mutex<Vec<String>>,
        cancel_after_first: Option<Arc<AtomicBool>>,
        store_change: Mutex<Option<(String, StoreChange)>>,
    }

    impl SearchProvider for TableProvider {
        async fn search(
            &self,
            task: &SearchTask,
            _page_size: u32,
        ) -> Result<Vec<SearchResult>, SearchError> {
            self.queries.lock().unwrap().push(task.query.clone());
            if let Some(flag) = &self.cancel_after_first {
                flag.store(true, Ordering::SeqCst);
            }
            let change = self.store_change.lock().unwrap().take();
            match change {
                Some((db_path, StoreChange::Insert(record))) => {
                    let store = ArticleStore::new_from_path(&db_path).await.unwrap();
                    assert!(store.save(&record).await.unwrap().inserted);
                }
                Some((db_path, StoreChange::DropArticles)) => {
                    let db = libsql::Builder::new_local(&db_path).build().await.unwrap();
                    let conn = db.connect().unwrap();
                    conn.execute("DROP TABLE articles", libsql::params![]).await.unwrap();
                }
                None => {}
            }
            match self.results.get(&task.query) {
                Some(Ok(results)) => Ok(results.clone()),
                Some(Err(msg)) => Err(SearchError::InvalidRequest(msg.clone())),
                None => Ok(Vec::new()),
            }
        }
    }

    /// Serves in-memory page text
    struct MemoryFetcher {
        pages: HashMap<String, String>,
        fail_once: Mutex<HashSet<String>>,
    }

    impl PageFetcher for MemoryFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
            if self.fail_once.lock().unwrap().remove(url) {
                return Err(FetchError::Status {
                    status: 503,
                    url: url.to_string(),
                });
            }
            match self.pages.get(url) {
                Some(text) => Ok(FetchedPage {
                    url: url.to_string(),
                    text: text.clone(),
                    metadata: PageMetadata {
                        domain: "a.test".to_string(),
                        ..PageMetadata::default()
                    },
                }),
                None => Err(FetchError::Status {
                    status: 404,
                    url: url.to_string(),
                }),
            }
        }
    }

    fn planner() -> SearchTaskPlanner {
        SearchTaskPlanner::new(
            vec![
                SubjectGroup {
                    sub_category: "hair dryer".to_string(),
                    priority: 2,
                    terms: vec!["hair dryer".to_string()],
                },
                SubjectGroup {
                    sub_category: "massager".to_string(),
                    priority: 1,
                    terms: vec!["massage gun".to_string()],
                },
            ],
            vec![ModifierGroup {
                kind: "reviews".to_string(),
                terms: vec!["review".to_string()],
            }],
        )
    }

    fn analysis(score: i64) -> String {
        format!(
            r#"{{"category": "user feedback", "summary": "s", "keywords": ["k"], "value_score": {}, "value_reason": "r"}}"#,
            score
        )
    }

    fn long_text() -> String {
        "A detailed review of the device. ".repeat(20)
    }

    fn db_path(dir: &tempfile::TempDir) -> String {
        dir.path().join("news.db").to_str().unwrap().to_string()
    }

    fn fetcher(pages: &[&str], fail_once: &[&str]) -> MemoryFetcher {
        MemoryFetcher {
            pages: pages
                .iter()
                .map(|url| (url.to_string(), long_text()))
                .collect(),
            fail_once: Mutex::new(fail_once.iter().map(|url| url.to_string()).collect()),
        }
    }

    async fn pipeline(
        dir: &tempfile::TempDir,
        provider: TableProvider,
        pages: &[&str],
        model: MockCompletionModel,
        config: PipelineConfig,
    ) -> CollectionPipeline<TableProvider, MemoryFetcher, MockCompletionModel> {
        pipeline_with_fetcher(dir, provider, fetcher(pages, &[]), model, config).await
    }

    async fn pipeline_with_fetcher(
        dir: &tempfile::TempDir,
        provider: TableProvider,
        fetcher: MemoryFetcher,
        model: MockCompletionModel,
        config: PipelineConfig,
    ) -> CollectionPipeline<TableProvider, MemoryFetcher, MockCompletionModel> {
        let store = ArticleStore::new_from_path(&db_path(dir)).await.unwrap();
        let processor = ArticleProcessor::new(
            fetcher,
            ContentAnalyzer::new(model, AnalyzerConfig::default()),
            ProcessorConfig::default(),
        );
        CollectionPipeline::new(planner(), provider, processor, store, config)
    }

    fn provider(entries: Vec<(&str, Result<Vec<SearchResult>, String>)>) -> TableProvider {
        TableProvider {
            results: entries
                .into_iter()
                .map(|(q, r)| (q.to_string(), r))
                .collect(),
            queries: Mutex::new(Vec::new()),
            cancel_after_first: None,
            store_change: Mutex::new(None),
        }
    }

    fn fast_config() -> PipelineConfig {
        PipelineConfig::builder()
            .task_delay(Duration::ZERO)
            .retry_policy(crate::retry::RetryPolicy::no_retry())
            .build()
    }

    #[tokio::test]
    async fn test_counters_across_outcomes() {
        let dir = tempdir().unwrap();
        let provider = provider(vec![
            (
                "hair dryer review",
                Ok(vec![
                    SearchResult::new("keep", "https://a.test/keep", ""),
                    SearchResult::new("low", "https://a.test/low", ""),
                    SearchResult::new("gone", "https://a.test/gone", ""),
                ]),
            ),
            ("massage gun review", Err("bad query".to_string())),
        ]);
        let model = MockCompletionModel::new();
        model.push_text(&analysis(80)).await;
        model.push_text(&analysis(20)).await;

        let mut pipeline = pipeline(
            &dir,
            provider,
            &["https://a.test/keep", "https://a.test/low"],
            model,
            fast_config(),
        )
        .await;
        let stats = pipeline.run().await.unwrap();

        assert_eq!(
            stats,
            RunStats {
                tasks_run: 2,
                tasks_failed: 1,
                results_fetched: 3,
                articles_saved: 1,
                articles_skipped_duplicate: 0,
                articles_dropped_low_value: 1,
                articles_dropped: 1,
                errors: 1,
                cancelled: false,
            }
        );
        assert_eq!(pipeline.state(), RunState::Done);
        assert_eq!(pipeline.store().count().await.unwrap(), 1);

        let saved = pipeline.store().recent(10).await.unwrap();
        assert_eq!(saved[0].url, "https://a.test/keep");
        assert_eq!(saved[0].sub_category, "hair dryer");
    }

    #[tokio::test]
    async fn test_tasks_run_in_priority_order() {
        let dir = tempdir().unwrap();
        let mut pipeline = pipeline(
            &dir,
            provider(Vec::new()),
            &[],
            MockCompletionModel::new(),
            fast_config(),
        )
        .await;
        pipeline.run().await.unwrap();

        let queries = pipeline.provider.queries.lock().unwrap().clone();
        assert_eq!(queries, vec!["hair dryer review", "massage gun review"]);
    }

    #[tokio::test]
    async fn test_stored_urls_are_not_reanalyzed() {
        let dir = tempdir().unwrap();
        let results = vec![SearchResult::new("keep", "https://a.test/keep", "")];
        let model = MockCompletionModel::always_text(&analysis(90)).await;

        let mut first = pipeline(
            &dir,
            provider(vec![("hair dryer review", Ok(results.clone()))]),
            &["https://a.test/keep"],
            model.clone(),
            fast_config(),
        )
        .await;
        assert_eq!(first.run().await.unwrap().articles_saved, 1);
        drop(first);

        let mut second = pipeline(
            &dir,
            provider(vec![("hair dryer review", Ok(results))]),
            &["https://a.test/keep"],
            model.clone(),
            fast_config(),
        )
        .await;
        let stats = second.run().await.unwrap();

        assert_eq!(stats.articles_saved, 0);
        assert_eq!(stats.articles_skipped_duplicate, 1);
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalid_config_fails_before_searching() {
        let dir = tempdir().unwrap();
        let config = PipelineConfig::builder().min_value_score(500).build();
        let mut pipeline = pipeline(
            &dir,
            provider(Vec::new()),
            &[],
            MockCompletionModel::new(),
            config,
        )
        .await;

        let result = pipeline.run().await;

        assert!(matches!(result, Err(crate::Error::Pipeline(_))));
        assert_eq!(pipeline.state(), RunState::Failed);
        assert!(pipeline.provider.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancellation_is_checked_between_tasks() {
        let dir = tempdir().unwrap();
        let mut provider = provider(Vec::new());
        let flag = Arc::new(AtomicBool::new(false));
        provider.cancel_after_first = Some(Arc::clone(&flag));

        let mut pipeline = pipeline(
            &dir,
            provider,
            &[],
            MockCompletionModel::new(),
            fast_config(),
        )
        .await;
        pipeline.cancel = flag;

        let stats = pipeline.run().await.unwrap();

        assert_eq!(stats.tasks_run, 1);
        assert!(stats.cancelled);
        assert_eq!(pipeline.state(), RunState::Done);
    }

    #[tokio::test]
    async fn test_cancellation_during_task_delay_stops_next_task() {
        let dir = tempdir().unwrap();
        let config = PipelineConfig::builder()
            .task_delay(Duration::from_millis(300))
            .retry_policy(crate::retry::RetryPolicy::no_retry())
            .build();
        let mut pipeline = pipeline(
            &dir,
            provider(Vec::new()),
            &[],
            MockCompletionModel::new(),
            config,
        )
        .await;

        let flag = pipeline.cancel_handle();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            flag.store(true, Ordering::SeqCst);
        });
        let stats = pipeline.run().await.unwrap();

        assert_eq!(stats.tasks_run, 1);
        assert!(stats.cancelled);
        assert_eq!(pipeline.provider.queries.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_dropped_url_is_retried_by_later_task() {
        let dir = tempdir().unwrap();
        let url = "https://a.test/flaky";
        let results = vec![SearchResult::new("flaky", url, "")];
        let provider = provider(vec![
            ("hair dryer review", Ok(results.clone())),
            ("massage gun review", Ok(results)),
        ]);
        let model = MockCompletionModel::always_text(&analysis(70)).await;

        let mut pipeline = pipeline_with_fetcher(
            &dir,
            provider,
            fetcher(&[url], &[url]),
            model.clone(),
            fast_config(),
        )
        .await;
        let stats = pipeline.run().await.unwrap();

        assert_eq!(stats.articles_dropped, 1);
        assert_eq!(stats.articles_skipped_duplicate, 0);
        assert_eq!(stats.articles_saved, 1);
        assert_eq!(model.calls(), 1);

        let saved = pipeline.store().recent(10).await.unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].url, url);
        assert_eq!(saved[0].sub_category, "massager");
    }

    #[tokio::test]
    async fn test_low_value_url_is_not_reanalyzed() {
        let dir = tempdir().unwrap();
        let results = vec![SearchResult::new("low", "https://a.test/low", "")];
        let provider = provider(vec![
            ("hair dryer review", Ok(results.clone())),
            ("massage gun review", Ok(results)),
        ]);
        let model = MockCompletionModel::always_text(&analysis(10)).await;

        let mut pipeline = pipeline(
            &dir,
            provider,
            &["https://a.test/low"],
            model.clone(),
            fast_config(),
        )
        .await;
        let stats = pipeline.run().await.unwrap();

        assert_eq!(stats.articles_dropped_low_value, 1);
        assert_eq!(stats.articles_skipped_duplicate, 1);
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_row_stored_mid_run_counts_as_duplicate() {
        let dir = tempdir().unwrap();
        let url = "https://a.test/raced";
        let provider = provider(vec![(
            "hair dryer review",
            Ok(vec![SearchResult::new("raced", url, "")]),
        )]);
        let existing = ArticleRecord {
            id: None,
            title: "Stored elsewhere".to_string(),
            url: url.to_string(),
            source: "a.test".to_string(),
            publish_date: "unknown".to_string(),
            author: "unknown".to_string(),
            category: "market".to_string(),
            sub_category: "hair dryer".to_string(),
            summary: "s".to_string(),
            keywords: Vec::new(),
            value_score: 60,
            value_reason: "r".to_string(),
            created_at: None,
        };
        *provider.store_change.lock().unwrap() =
            Some((db_path(&dir), StoreChange::Insert(existing)));
        let model = MockCompletionModel::always_text(&analysis(90)).await;

        let mut pipeline = pipeline(&dir, provider, &[url], model.clone(), fast_config()).await;
        let stats = pipeline.run().await.unwrap();

        assert_eq!(stats.articles_saved, 0);
        assert_eq!(stats.articles_skipped_duplicate, 1);
        assert_eq!(stats.errors, 0);
        assert_eq!(model.calls(), 1);

        let stored = pipeline.store().recent(10).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].title, "Stored elsewhere");
        assert_eq!(stored[0].value_score, 60);
    }

    #[tokio::test]
    async fn test_store_failure_is_counted_and_run_continues() {
        let dir = tempdir().unwrap();
        let provider = provider(vec![
            (
                "hair dryer review",
                Ok(vec![SearchResult::new("a", "https://a.test/a", "")]),
            ),
            (
                "massage gun review",
                Ok(vec![SearchResult::new("b", "https://a.test/b", "")]),
            ),
        ]);
        *provider.store_change.lock().unwrap() = Some((db_path(&dir), StoreChange::DropArticles));
        let model = MockCompletionModel::always_text(&analysis(90)).await;

        let mut pipeline = pipeline(
            &dir,
            provider,
            &["https://a.test/a", "https://a.test/b"],
            model,
            fast_config(),
        )
        .await;
        let stats = pipeline.run().await.unwrap();

        assert_eq!(stats.tasks_run, 2);
        assert_eq!(stats.tasks_failed, 0);
        assert_eq!(stats.articles_saved, 0);
        assert_eq!(stats.errors, 2);
        assert_eq!(pipeline.state(), RunState::Done);
    }

    #[tokio::test]
    async fn test_build_pipeline_reports_setup_errors() {
        let dir = tempdir().unwrap();
        let config = AppConfig::builder("google-key", "engine", "deepseek-key")
            .database_path(dir.path().join("missing").join("news.db"))
            .build();
        let result = build_pipeline(&config, planner(), fast_config()).await;
        assert!(matches!(result, Err(crate::Error::Database(_))));

        let config = AppConfig::builder("google-key", "engine", "deepseek-key")
            .database_path(dir.path().join("news.db"))
            .build();
        let invalid = PipelineConfig::builder().min_value_score(-1).build();
        let result = build_pipeline(&config, planner(), invalid).await;
        assert!(matches!(result, Err(crate::Error::Pipeline(_))));
    }

    #[tokio::test]
    async fn test_max_tasks_and_progress_events() {
        let dir = tempdir().unwrap();
        let config = PipelineConfig::builder()
            .task_delay(Duration::ZERO)
            .max_tasks(Some(1))
            .build();
        let (tx, mut rx) = mpsc::channel(8);

        let mut pipeline = pipeline(
            &dir,
            provider(Vec::new()),
            &[],
            MockCompletionModel::new(),
            config,
        )
        .await
        .with_progress(tx);

        let stats = pipeline.run().await.unwrap();
        drop(pipeline);

        assert_eq!(stats.tasks_run, 1);
        let event = rx.recv().await.unwrap();
        assert_eq!(event.task_index, 0);
        assert_eq!(event.total_tasks, 1);
        assert_eq!(event.query, "hair dryer review");
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn test_stats_display() {
        let stats = RunStats {
            articles_saved: 3,
            cancelled: true,
            ..RunStats::default()
        };
        let text = stats.to_string();
        assert!(text.contains("Articles saved:          3"));
        assert!(text.ends_with("Run was cancelled"));
    }
}
