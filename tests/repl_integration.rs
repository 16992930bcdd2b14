//! Question loop driven by scripted input

mod common;

use std::io::Cursor;
use std::sync::Arc;
use tempfile::TempDir;

use common::{stub_context, test_config, CannedGenerator, KeywordEmbedder};
use reviewbuddy::repl::{BufReadSource, DisplayManager, ReplSession, SessionSummary};

fn scripted(input: &str) -> ReplSession<BufReadSource<Cursor<String>>> {
    ReplSession::new(
        BufReadSource::new(Cursor::new(input.to_string())),
        DisplayManager::new(false),
    )
}

#[tokio::test]
async fn test_quit_and_empty_never_reach_models() {
    let temp_dir = TempDir::new().unwrap();
    let embedder = Arc::new(KeywordEmbedder::new("keyword-v1"));
    let generator = Arc::new(CannedGenerator::answering());
    let ctx = stub_context(test_config(temp_dir.path()), embedder.clone(), generator.clone());
    let pipeline = ctx.pipeline().unwrap();

    let mut out = Vec::new();
    let summary = scripted("\n   \nQ\nIs the pasta good?\n")
        .run(&pipeline, &mut out)
        .await
        .unwrap();

    assert_eq!(summary, SessionSummary::default());
    assert_eq!(embedder.calls(), 0);
    assert_eq!(generator.calls(), 0);

    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.matches("Please enter a question").count(), 2);
    assert!(text.contains("Goodbye!"));
}

#[tokio::test]
async fn test_question_is_answered() {
    let temp_dir = TempDir::new().unwrap();
    let generator = Arc::new(CannedGenerator::answering());
    let ctx = stub_context(
        test_config(temp_dir.path()),
        Arc::new(KeywordEmbedder::new("keyword-v1")),
        generator.clone(),
    );
    ctx.indexer(false).initialize(&ctx.dataset_path()).await.unwrap();
    let pipeline = ctx.pipeline().unwrap();

    let mut out = Vec::new();
    let summary = scripted("Is the pasta good?\nexit\n")
        .run(&pipeline, &mut out)
        .await
        .unwrap();

    assert_eq!(summary.answered, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(generator.calls(), 1);

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Canned answer"));
    assert!(text.contains("Based on 5 relevant reviews"));
}

#[tokio::test]
async fn test_errors_do_not_end_the_loop() {
    let temp_dir = TempDir::new().unwrap();
    let generator = Arc::new(CannedGenerator::failing());
    let ctx = stub_context(
        test_config(temp_dir.path()),
        Arc::new(KeywordEmbedder::new("keyword-v1")),
        generator.clone(),
    );
    ctx.indexer(false).initialize(&ctx.dataset_path()).await.unwrap();
    let pipeline = ctx.pipeline().unwrap();

    let mut out = Vec::new();
    // No quit word: end of input also ends the session
    let summary = scripted("Any pizza?\nHow are the prices?\n")
        .run(&pipeline, &mut out)
        .await
        .unwrap();

    assert_eq!(summary.answered, 0);
    assert_eq!(summary.failed, 2);
    assert_eq!(generator.calls(), 2);

    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.matches("Error:").count(), 2);
    assert!(text.contains("model not loaded"));
    assert!(text.contains("Goodbye!"));
}
