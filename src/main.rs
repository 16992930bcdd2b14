//! reviewbuddy - Main CLI Entry Point

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use std::io::{self, IsTerminal};
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use reviewbuddy::{
    bench::{BenchPhase, BenchmarkHarness, BenchmarkReport, BenchmarkSettings, LatencyStats},
    bootstrap::{Bootstrap, BootstrapStatus},
    cli::{Args, Commands, Verbosity},
    config::Config,
    corpus::{load_reviews, CorpusSummary},
    memory::{IndexManifest, IndexReport, IndexStatus},
    models::OllamaClient,
    repl::{BufReadSource, DisplayManager, InputHandler, ReplSession},
    AppContext,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbosity());

    let mut config = Config::load(args.config.as_deref())?;
    args.apply_overrides(&mut config);
    config.validate()?;

    match args.command() {
        Commands::Chat => run_chat(&args, config).await?,
        Commands::Index { rebuild } => run_index(&args, config, rebuild).await?,
        Commands::Query {
            question,
            k,
            retrieve_only,
        } => run_query(&args, config, &question, k, retrieve_only).await?,
        Commands::Bench { output } => {
            if let Some(path) = output {
                config.bench.report_path = path;
            }
            run_bench(&args, config).await?
        }
        Commands::Doctor => run_doctor(&config).await?,
        Commands::Config => show_config(&args, &config)?,
    }

    Ok(())
}

/// `RUST_LOG` wins over the verbosity flags
fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_directive()));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

/// Build or reopen the index; dataset problems are fatal here
async fn open_index(args: &Args, ctx: &AppContext, rebuild: bool) -> Result<IndexReport> {
    let indexer = ctx.indexer(args.verbosity().show_progress());
    let dataset = ctx.dataset_path();

    indexer
        .initialize_with(&dataset, rebuild)
        .await
        .with_context(|| format!("Failed to index reviews from {}", dataset.display()))
}

async fn run_chat(args: &Args, config: Config) -> Result<()> {
    let ctx = AppContext::from_config(config)?;
    let report = open_index(args, &ctx, false).await?;
    let pipeline = ctx.pipeline()?;

    let display = DisplayManager::new(args.verbosity() != Verbosity::Normal);
    let mut stdout = io::stdout();
    display.show_banner(&mut stdout, pipeline.generator_model(), report.document_count)?;

    let summary = if io::stdin().is_terminal() {
        let input = match InputHandler::default_history_path() {
            Some(path) => InputHandler::with_history(path)?,
            None => InputHandler::new()?,
        };
        let mut session = ReplSession::new(input, display);
        let summary = session.run(&pipeline, &mut stdout).await?;

        if let Err(e) = session.source_mut().save_history() {
            warn!(error = %e, "failed to save history");
        }
        summary
    } else {
        let stdin = io::stdin();
        let mut session = ReplSession::new(BufReadSource::new(stdin.lock()), display);
        session.run(&pipeline, &mut stdout).await?
    };

    tracing::info!(
        answered = summary.answered,
        failed = summary.failed,
        "session ended"
    );
    Ok(())
}

async fn run_index(args: &Args, config: Config, rebuild: bool) -> Result<()> {
    let ctx = AppContext::from_config(config)?;
    let report = open_index(args, &ctx, rebuild).await?;

    match &report.status {
        IndexStatus::Built => println!("{}", "✓ Index built".green()),
        IndexStatus::Reopened => println!("{}", "✓ Index is up to date".green()),
        IndexStatus::Rebuilt { reason } => {
            println!("{} ({})", "✓ Index rebuilt".green(), reason.dimmed())
        }
    }
    println!("  Documents:  {}", report.document_count);
    println!("  Dimension:  {}", report.dimension);
    println!("  Collection: {}", ctx.store.collection());
    println!("  Backend:    {}", ctx.store.backend());
    println!("  Took:       {:.0}ms", report.elapsed_ms);

    Ok(())
}

async fn run_query(
    args: &Args,
    config: Config,
    question: &str,
    k: Option<usize>,
    retrieve_only: bool,
) -> Result<()> {
    let k = k.unwrap_or(config.retrieval.top_k);
    if k == 0 {
        bail!("--k must be at least 1");
    }

    let ctx = AppContext::from_config(config)?;
    open_index(args, &ctx, false).await?;
    let pipeline = ctx.pipeline()?;

    let display = DisplayManager::new(true);
    let mut stdout = io::stdout();

    if retrieve_only {
        let reviews = pipeline.retriever().retrieve_k(question, k).await?;
        display.show_reviews(&mut stdout, &reviews)?;
    } else {
        let response = pipeline.answer_k(question, k).await?;
        display.show_answer(&mut stdout, &response, response.total_ms())?;
    }

    Ok(())
}

async fn run_bench(args: &Args, config: Config) -> Result<()> {
    let ctx = AppContext::from_config(config)?;
    open_index(args, &ctx, false).await?;
    let pipeline = ctx.pipeline()?;
    let config = &ctx.config;

    let records = load_reviews(&config.index.dataset_path)?;
    let corpus = CorpusSummary::from_records(&records);

    println!("\n{}", "Restaurant Review RAG Benchmark".bold().cyan());
    println!("{}", "=".repeat(50).cyan());
    println!("Dataset size:     {} reviews", corpus.total_reviews);
    println!("Vector store:     {}", ctx.store.backend());
    println!("Embedding model:  {}", config.ollama.embedding_model);
    println!("LLM:              {}", config.ollama.generation_model);
    println!("Retrieval count:  k={}", config.retrieval.top_k);

    let harness = BenchmarkHarness::new(config.bench.queries.clone());
    let run = harness
        .run_with_progress(&pipeline, &mut |phase, i, total, ms| {
            if i == 1 {
                match phase {
                    BenchPhase::Retrieval => {
                        println!("\nBenchmarking retrieval ({} queries)...", total)
                    }
                    BenchPhase::EndToEnd => {
                        println!("\nBenchmarking end-to-end responses ({} queries)...", total)
                    }
                }
            }
            println!("  Query {}/{}: {:.2}ms", i, total, ms);
        })
        .await
        .context("Benchmark run failed")?;

    println!("\n{}", "Results".bold());
    print_stats("Retrieval", run.retrieval_stats());
    print_stats("LLM generation", run.generation_stats());
    print_stats("End-to-end", run.end_to_end_stats());

    let settings = BenchmarkSettings {
        store_backend: ctx.store.backend().to_string(),
        embedding_model: config.ollama.embedding_model.clone(),
        generation_model: config.ollama.generation_model.clone(),
        top_k: config.retrieval.top_k,
    };
    let report = BenchmarkReport::new(settings, corpus, run);
    report
        .write_to(&config.bench.report_path)
        .with_context(|| format!("Failed to write {}", config.bench.report_path.display()))?;

    println!(
        "\n{} {}",
        "✓ Report written to".green(),
        config.bench.report_path.display()
    );
    Ok(())
}

fn print_stats(label: &str, stats: Option<LatencyStats>) {
    match stats {
        Some(s) => println!(
            "  {:<15} mean {:>9.2}ms  median {:>9.2}ms  p95 {:>9.2}ms",
            label, s.mean, s.median, s.p95
        ),
        None => println!("  {:<15} no samples", label),
    }
}

async fn run_doctor(config: &Config) -> Result<()> {
    let client = OllamaClient::new(config.ollama_url(), Some(Duration::from_secs(5)))?;
    let bootstrap = Bootstrap::new(
        client,
        vec![
            config.ollama.embedding_model.clone(),
            config.ollama.generation_model.clone(),
        ],
    );

    println!("\nChecking {}...\n", config.ollama_url());
    let status = bootstrap.check().await?;

    match &status {
        BootstrapStatus::Ready => {
            println!("{} Ollama is running", "✓".green());
            for model in bootstrap.required_models() {
                println!("{} Model installed: {}", "✓".green(), model);
            }
        }
        BootstrapStatus::OllamaNotRunning => {
            println!("{} Ollama is not reachable", "✗".red());
        }
        BootstrapStatus::ModelsNotAvailable(missing) => {
            println!("{} Ollama is running", "✓".green());
            for model in missing {
                println!("{} Model missing: {}", "✗".red(), model);
            }
        }
    }

    match IndexManifest::load(&config.index.store_path) {
        Ok(Some(manifest)) => println!(
            "{} Index: {} documents embedded with {} ({})",
            "✓".green(),
            manifest.document_count,
            manifest.embedding_model,
            manifest.created_at.format("%Y-%m-%d %H:%M")
        ),
        Ok(None) => println!(
            "{} Index: not built yet (run `reviewbuddy index`)",
            "-".yellow()
        ),
        Err(e) => println!("{} Index: unreadable manifest ({})", "✗".red(), e),
    }

    if let Some(hint) = status.hint() {
        println!("\n{}", hint.yellow());
    }
    println!();

    std::process::exit(if status.is_ready() { 0 } else { 1 });
}

fn show_config(args: &Args, config: &Config) -> Result<()> {
    let source = match &args.config {
        Some(path) => path.display().to_string(),
        None => "defaults and discovered config files".to_string(),
    };
    println!("# reviewbuddy configuration ({})\n", source);

    let rendered = toml::to_string_pretty(config).context("Failed to serialize config")?;
    println!("{}", rendered);
    Ok(())
}
