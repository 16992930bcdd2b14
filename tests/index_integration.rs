//! Index lifecycle tests
//!
//! Build once, reopen without re-embedding, and rebuild when the manifest
//! no longer describes what is on disk.

mod common;

use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Arc;
use tempfile::TempDir;

use common::{stub_context, test_config, write_csv, CannedGenerator, KeywordEmbedder, SAMPLE_ROWS};
use reviewbuddy::memory::{
    EmbeddedDocument, IndexManifest, IndexStatus, LocalVectorStore, ReviewIndexer, ReviewMetadata,
    VectorStore,
};
use reviewbuddy::RagError;

#[tokio::test]
async fn test_first_run_indexes_every_row() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(temp_dir.path());
    let embedder = Arc::new(KeywordEmbedder::new("keyword-v1"));
    let ctx = stub_context(config, embedder.clone(), Arc::new(CannedGenerator::answering()));

    let report = ctx.indexer(false).initialize(&ctx.dataset_path()).await.unwrap();

    assert_eq!(report.status, IndexStatus::Built);
    assert_eq!(report.document_count, SAMPLE_ROWS.len() as u64);
    assert_eq!(ctx.store.count().await.unwrap(), SAMPLE_ROWS.len() as u64);

    let manifest = IndexManifest::load(&ctx.config.index.store_path)
        .unwrap()
        .expect("manifest written after build");
    assert_eq!(manifest.embedding_model, "keyword-v1");
    assert_eq!(manifest.document_count, SAMPLE_ROWS.len() as u64);
    assert_eq!(manifest.dimension, 9);
}

#[tokio::test]
async fn test_second_run_adds_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(temp_dir.path());
    let embedder = Arc::new(KeywordEmbedder::new("keyword-v1"));
    let ctx = stub_context(config.clone(), embedder.clone(), Arc::new(CannedGenerator::answering()));
    ctx.indexer(false).initialize(&ctx.dataset_path()).await.unwrap();
    let calls_after_build = embedder.calls();

    // Fresh process: reopen the store from disk
    let reopened_embedder = Arc::new(KeywordEmbedder::new("keyword-v1"));
    let ctx = stub_context(config, reopened_embedder.clone(), Arc::new(CannedGenerator::answering()));
    let report = ctx.indexer(false).initialize(&ctx.dataset_path()).await.unwrap();

    assert_eq!(report.status, IndexStatus::Reopened);
    assert!(!report.ingested());
    assert_eq!(ctx.store.count().await.unwrap(), SAMPLE_ROWS.len() as u64);
    assert_eq!(reopened_embedder.calls(), 0);
    assert!(calls_after_build > 0);
}

#[tokio::test]
async fn test_model_mismatch_fails_fast() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(temp_dir.path());
    let ctx = stub_context(
        config.clone(),
        Arc::new(KeywordEmbedder::new("keyword-v1")),
        Arc::new(CannedGenerator::answering()),
    );
    ctx.indexer(false).initialize(&ctx.dataset_path()).await.unwrap();

    let other = Arc::new(KeywordEmbedder::new("keyword-v2"));
    let ctx = stub_context(config, other.clone(), Arc::new(CannedGenerator::answering()));
    let err = ctx
        .indexer(false)
        .initialize(&ctx.dataset_path())
        .await
        .unwrap_err();

    match err {
        RagError::EmbeddingModelMismatch { expected, found } => {
            assert_eq!(expected, "keyword-v2");
            assert_eq!(found, "keyword-v1");
        }
        e => panic!("unexpected error: {e}"),
    }
    assert_eq!(other.calls(), 0);
    assert_eq!(ctx.store.count().await.unwrap(), SAMPLE_ROWS.len() as u64);
}

#[tokio::test]
async fn test_forced_rebuild_switches_model() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(temp_dir.path());
    let ctx = stub_context(
        config.clone(),
        Arc::new(KeywordEmbedder::new("keyword-v1")),
        Arc::new(CannedGenerator::answering()),
    );
    ctx.indexer(false).initialize(&ctx.dataset_path()).await.unwrap();

    let ctx = stub_context(
        config,
        Arc::new(KeywordEmbedder::new("keyword-v2")),
        Arc::new(CannedGenerator::answering()),
    );
    let report = ctx
        .indexer(false)
        .initialize_with(&ctx.dataset_path(), true)
        .await
        .unwrap();

    assert!(matches!(report.status, IndexStatus::Rebuilt { .. }));
    assert_eq!(report.document_count, SAMPLE_ROWS.len() as u64);
    let manifest = IndexManifest::load(&ctx.config.index.store_path).unwrap().unwrap();
    assert_eq!(manifest.embedding_model, "keyword-v2");
}

#[tokio::test]
async fn test_changed_dataset_is_rebuilt() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(temp_dir.path());
    let ctx = stub_context(
        config.clone(),
        Arc::new(KeywordEmbedder::new("keyword-v1")),
        Arc::new(CannedGenerator::answering()),
    );
    ctx.indexer(false).initialize(&ctx.dataset_path()).await.unwrap();

    let mut rows = SAMPLE_ROWS.to_vec();
    rows.push(("New place", "Brand new dessert bar", 3, "2024-06-01"));
    write_csv(&config.index.dataset_path, &rows);

    let ctx = stub_context(
        config,
        Arc::new(KeywordEmbedder::new("keyword-v1")),
        Arc::new(CannedGenerator::answering()),
    );
    let report = ctx.indexer(false).initialize(&ctx.dataset_path()).await.unwrap();

    assert!(matches!(report.status, IndexStatus::Rebuilt { .. }));
    assert_eq!(report.document_count, rows.len() as u64);
    assert_eq!(ctx.store.count().await.unwrap(), rows.len() as u64);
}

#[tokio::test]
async fn test_dimension_disagreement_is_rebuilt() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(temp_dir.path());
    let ctx = stub_context(
        config.clone(),
        Arc::new(KeywordEmbedder::new("keyword-v1")),
        Arc::new(CannedGenerator::answering()),
    );
    ctx.indexer(false).initialize(&ctx.dataset_path()).await.unwrap();

    let mut manifest = IndexManifest::load(&config.index.store_path).unwrap().unwrap();
    manifest.dimension = 1024;
    manifest.save(&config.index.store_path).unwrap();

    let ctx = stub_context(
        config.clone(),
        Arc::new(KeywordEmbedder::new("keyword-v1")),
        Arc::new(CannedGenerator::answering()),
    );
    let report = ctx.indexer(false).initialize(&ctx.dataset_path()).await.unwrap();

    assert!(matches!(report.status, IndexStatus::Rebuilt { .. }));
    assert_eq!(report.dimension, 9);
    let manifest = IndexManifest::load(&config.index.store_path).unwrap().unwrap();
    assert_eq!(manifest.dimension, 9);
}

#[tokio::test]
async fn test_partial_store_without_manifest_is_rebuilt() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(temp_dir.path());

    // Leftovers of an interrupted build: documents but no manifest
    {
        let store = LocalVectorStore::open(&config.index.store_path, &config.index.collection).unwrap();
        store
            .add_batch(vec![EmbeddedDocument {
                id: "0".to_string(),
                vector: KeywordEmbedder::vector_for("Great Pasta"),
                text: "Great Pasta".to_string(),
                metadata: ReviewMetadata {
                    rating: 5.0,
                    date: "2024-01-05".to_string(),
                },
            }])
            .await
            .unwrap();
    }

    let ctx = stub_context(
        config,
        Arc::new(KeywordEmbedder::new("keyword-v1")),
        Arc::new(CannedGenerator::answering()),
    );
    let report = ctx.indexer(false).initialize(&ctx.dataset_path()).await.unwrap();

    assert!(matches!(report.status, IndexStatus::Rebuilt { .. }));
    assert_eq!(ctx.store.count().await.unwrap(), SAMPLE_ROWS.len() as u64);
}

#[tokio::test]
async fn test_torn_write_is_rebuilt() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(temp_dir.path());

    // First batch landed, second was cut off mid-line
    {
        let store = LocalVectorStore::open(&config.index.store_path, &config.index.collection).unwrap();
        store
            .add_batch(vec![EmbeddedDocument {
                id: "0".to_string(),
                vector: KeywordEmbedder::vector_for("Great Pasta"),
                text: "Great Pasta".to_string(),
                metadata: ReviewMetadata {
                    rating: 5.0,
                    date: "2024-01-05".to_string(),
                },
            }])
            .await
            .unwrap();
        let mut file = OpenOptions::new().append(true).open(store.file_path()).unwrap();
        file.write_all(br#"{"id":"1","vector":[0.1,"#).unwrap();
    }

    let ctx = stub_context(
        config.clone(),
        Arc::new(KeywordEmbedder::new("keyword-v1")),
        Arc::new(CannedGenerator::answering()),
    );
    let report = ctx.indexer(false).initialize(&ctx.dataset_path()).await.unwrap();
    assert!(matches!(report.status, IndexStatus::Rebuilt { .. }));
    assert_eq!(report.document_count, SAMPLE_ROWS.len() as u64);

    // The rewritten file is clean and reopens as current
    let ctx = stub_context(
        config,
        Arc::new(KeywordEmbedder::new("keyword-v1")),
        Arc::new(CannedGenerator::answering()),
    );
    let report = ctx.indexer(false).initialize(&ctx.dataset_path()).await.unwrap();
    assert_eq!(report.status, IndexStatus::Reopened);
    assert_eq!(ctx.store.count().await.unwrap(), SAMPLE_ROWS.len() as u64);
}

#[tokio::test]
async fn test_missing_dataset_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let store_dir = temp_dir.path().join("db");
    let store = Arc::new(LocalVectorStore::open(&store_dir, "restaurant_reviews").unwrap());
    let indexer = ReviewIndexer::new(Arc::new(KeywordEmbedder::new("keyword-v1")), store, &store_dir);

    let err = indexer
        .initialize(&temp_dir.path().join("missing.csv"))
        .await
        .unwrap_err();
    assert!(matches!(err, RagError::DatasetNotFound(_)));
    assert!(IndexManifest::load(&store_dir).unwrap().is_none());
}
