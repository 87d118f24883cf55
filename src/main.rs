//! # appliance-intel CLI
//!
//! Command-line front end for the news collection pipeline.
//!
//! ## Subcommands
//!
//! - `collect`: run one collection pass (search, fetch, analyze, store)
//! - `plan`: print the search tasks a run would execute
//! - `recent`: list the most recently stored articles
//! - `top`: list the highest-scored stored articles
//!
//! Credentials and defaults come from the environment (and `.env`); flags
//! override individual values for a single invocation.

mod telemetry;

use anyhow::anyhow;
use appliance_intel::config::{AppConfig, database_path_from_env};
use appliance_intel::pipeline::{ProgressEvent, build_pipeline};
use appliance_intel::planner::{QueryStyle, SearchTaskPlanner};
use appliance_intel::store::{ArticleRecord, ArticleStore};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::time::Duration;
use telemetry::OtelGuard;
use tokio::sync::mpsc;
use tracing::{info, instrument, warn};

#[derive(Parser)]
#[command(author, version, about = "Collects and scores personal-care appliance news", long_about = None)]
struct Cli {
    /// Also print info-level logs to the console
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one collection pass
    Collect(CollectArgs),

    /// Show the planned search tasks
    Plan(PlanArgs),

    /// List the most recently stored articles
    Recent(ListArgs),

    /// List the highest-scored stored articles
    Top(ListArgs),
}

#[derive(Args, Debug)]
struct CollectArgs {
    /// Stop after this many search tasks
    #[arg(long)]
    max_tasks: Option<usize>,

    /// Minimum value score to store (overrides MIN_VALUE_SCORE)
    #[arg(long)]
    min_score: Option<i64>,

    /// Search results per task (overrides RESULTS_PER_TASK)
    #[arg(long)]
    results: Option<u32>,

    /// Pause between tasks in milliseconds
    #[arg(long, default_value = "1000")]
    delay_ms: u64,

    /// Use intitle:"subject" "modifier" queries
    #[arg(long)]
    quoted: bool,

    /// Database path (overrides APPLIANCE_INTEL_DB)
    #[arg(long)]
    database: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct PlanArgs {
    /// Output format (text|json)
    #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Use intitle:"subject" "modifier" queries
    #[arg(long)]
    quoted: bool,
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Number of articles to show
    #[arg(short = 'n', long, default_value = "10")]
    limit: usize,

    /// Output format (text|json)
    #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Database path (overrides APPLIANCE_INTEL_DB)
    #[arg(long)]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _otel: OtelGuard = telemetry::init_tracing_subscriber(cli.verbose)?;

    match cli.command {
        Some(Commands::Collect(args)) => collect_command(args).await?,
        Some(Commands::Plan(args)) => plan_command(args)?,
        Some(Commands::Recent(args)) => list_command(args, ListOrder::Recent).await?,
        Some(Commands::Top(args)) => list_command(args, ListOrder::Top).await?,
        None => {
            let _ = Cli::parse_from(["appliance-intel", "--help"]);
        }
    }

    Ok(())
}

fn planner(quoted: bool) -> SearchTaskPlanner {
    let style = if quoted {
        QueryStyle::Quoted
    } else {
        QueryStyle::Plain
    };
    SearchTaskPlanner::default().with_style(style)
}

#[instrument]
async fn collect_command(args: CollectArgs) -> anyhow::Result<()> {
    let mut config = AppConfig::from_env()?;
    if let Some(path) = args.database {
        config.database_path = path;
    }
    if let Some(min_score) = args.min_score {
        config.min_value_score = min_score;
    }
    if let Some(results) = args.results {
        config.results_per_task = results;
    }
    info!(?config, "Starting collection run");

    let mut pipeline_config = config.pipeline_config();
    pipeline_config.max_tasks = args.max_tasks;
    pipeline_config.task_delay = Duration::from_millis(args.delay_ms);

    let planner = planner(args.quoted);
    let total_tasks = args
        .max_tasks
        .map_or(planner.plan().len(), |max| max.min(planner.plan().len()));

    let (progress_sender, mut progress_receiver) = mpsc::channel::<ProgressEvent>(16);
    let mut pipeline = build_pipeline(&config, planner, pipeline_config)
        .await?
        .with_progress(progress_sender);

    let cancel = pipeline.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping after the current task");
            cancel.store(true, Ordering::SeqCst);
        }
    });

    let progress_bar = ProgressBar::new(total_tasks as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({eta}) {msg}")
            .map_err(|e| anyhow!("Invalid progress template: {}", e))?
            .progress_chars("##-"),
    );
    progress_bar.set_message("Searching...");

    let progress_handle = tokio::spawn({
        let progress_bar = progress_bar.clone();
        async move {
            while let Some(event) = progress_receiver.recv().await {
                progress_bar.set_position(event.task_index as u64 + 1);
                progress_bar.set_message(format!(
                    "saved {} | {}",
                    event.stats.articles_saved, event.query
                ));
            }
        }
    });

    let start_time = std::time::Instant::now();
    let stats = pipeline.run().await?;
    let store = pipeline.store().clone();
    drop(pipeline);
    let _ = progress_handle.await;
    progress_bar.finish_with_message("Collection finished");

    println!("\nCollection finished in {:.2?}", start_time.elapsed());
    println!("{}", stats);
    println!("Articles in store:       {}", store.count().await?);

    if stats.articles_saved > 0 {
        println!("\nTop articles:");
        print_articles(&store.top_valued(5).await?);
    }

    Ok(())
}

#[instrument]
fn plan_command(args: PlanArgs) -> anyhow::Result<()> {
    let tasks = planner(args.quoted).plan();

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&tasks)?),
        _ => {
            println!("{} search tasks", tasks.len());
            for (i, task) in tasks.iter().enumerate() {
                println!(
                    "{:>3}. [{:>2}] {:<14} {}",
                    i + 1,
                    task.priority,
                    task.sub_category,
                    task.query
                );
            }
        }
    }

    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum ListOrder {
    Recent,
    Top,
}

#[instrument]
async fn list_command(args: ListArgs, order: ListOrder) -> anyhow::Result<()> {
    let path = args.database.unwrap_or_else(database_path_from_env);
    let store = ArticleStore::new_from_path(&path.to_string_lossy()).await?;

    let articles = match order {
        ListOrder::Recent => store.recent(args.limit).await?,
        ListOrder::Top => store.top_valued(args.limit).await?,
    };

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&articles)?),
        _ => {
            println!("{} articles", articles.len());
            print_articles(&articles);
        }
    }

    Ok(())
}

fn print_articles(articles: &[ArticleRecord]) {
    for (i, article) in articles.iter().enumerate() {
        println!("{}. [{}] {}", i + 1, article.value_score, article.title);
        println!("   URL: {}", article.url);
        println!(
            "   {} | {} | {} | {}",
            article.source, article.publish_date, article.category, article.sub_category
        );
        if !article.keywords.is_empty() {
            println!("   Keywords: {}", article.keywords_text());
        }
        println!("   Why: {}", article.value_reason);
        println!();
    }
}
