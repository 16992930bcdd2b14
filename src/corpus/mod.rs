//! Review corpus loading
//!
//! Reads the restaurant reviews CSV (`Title, Review, Rating, Date`) into
//! [`ReviewRecord`]s and fingerprints the file so the index can tell when
//! the dataset has changed underneath it.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::path::Path;

use crate::errors::{RagError, Result};

/// Header names the dataset must provide
pub const REQUIRED_COLUMNS: [&str; 4] = ["Title", "Review", "Rating", "Date"];

/// One customer review row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Review")]
    pub review: String,
    #[serde(rename = "Rating")]
    pub rating: f64,
    #[serde(rename = "Date")]
    pub date: String,
}

impl ReviewRecord {
    /// Text that gets embedded: title and review separated by a space
    pub fn document_text(&self) -> String {
        format!("{} {}", self.title, self.review)
    }
}

/// Load every review in the dataset, in file order
pub fn load_reviews(path: &Path) -> Result<Vec<ReviewRecord>> {
    if !path.exists() {
        return Err(RagError::DatasetNotFound(path.display().to_string()));
    }

    let file = File::open(path)?;
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(file);

    let headers = reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(RagError::MissingColumn(column.to_string()));
        }
    }

    let mut records = Vec::new();
    for row in reader.deserialize() {
        let record: ReviewRecord = row?;
        records.push(record);
    }

    Ok(records)
}

/// SHA-256 of the dataset file, hex encoded
pub fn dataset_checksum(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(RagError::DatasetNotFound(path.display().to_string()));
    }

    let bytes = std::fs::read(path)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{:x}", digest))
}

/// Aggregate figures about the dataset, shown in the benchmark report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusSummary {
    pub total_reviews: usize,
    pub avg_review_chars: f64,
    pub avg_rating: f64,
}

impl CorpusSummary {
    pub fn from_records(records: &[ReviewRecord]) -> Self {
        if records.is_empty() {
            return Self {
                total_reviews: 0,
                avg_review_chars: 0.0,
                avg_rating: 0.0,
            };
        }

        let n = records.len() as f64;
        let total_chars: usize = records.iter().map(|r| r.review.chars().count()).sum();
        let total_rating: f64 = records.iter().map(|r| r.rating).sum();

        Self {
            total_reviews: records.len(),
            avg_review_chars: total_chars as f64 / n,
            avg_rating: total_rating / n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_reviews() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "reviews.csv",
            "Title,Date,Rating,Review\n\
             Great Pasta,2024-01-01,5,The pasta was amazing\n\
             Bad Service,2024-01-02,1,\"Waiter was rude, slow too\"\n",
        );

        let records = load_reviews(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "Great Pasta");
        assert_eq!(records[0].rating, 5.0);
        assert_eq!(records[1].review, "Waiter was rude, slow too");
        assert_eq!(records[1].date, "2024-01-02");
    }

    #[test]
    fn test_document_text_joins_title_and_review() {
        let record = ReviewRecord {
            title: "Great Pasta".to_string(),
            review: "The pasta was amazing".to_string(),
            rating: 5.0,
            date: "2024-01-01".to_string(),
        };
        assert_eq!(record.document_text(), "Great Pasta The pasta was amazing");
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_reviews(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, RagError::DatasetNotFound(_)));
    }

    #[test]
    fn test_missing_column() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "reviews.csv", "Title,Review,Date\nA,B,2024-01-01\n");

        let err = load_reviews(&path).unwrap_err();
        match err {
            RagError::MissingColumn(column) => assert_eq!(column, "Rating"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_rating() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "reviews.csv",
            "Title,Review,Rating,Date\nA,B,five,2024-01-01\n",
        );
        assert!(matches!(load_reviews(&path), Err(RagError::Csv(_))));
    }

    #[test]
    fn test_checksum_changes_with_content() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "a.csv", "Title,Review,Rating,Date\nA,B,3,x\n");
        let first = dataset_checksum(&path).unwrap();
        assert_eq!(first.len(), 64);
        assert_eq!(first, dataset_checksum(&path).unwrap());

        fs::write(&path, "Title,Review,Rating,Date\nA,C,3,x\n").unwrap();
        assert_ne!(first, dataset_checksum(&path).unwrap());
    }

    #[test]
    fn test_summary() {
        let records = vec![
            ReviewRecord {
                title: "t".to_string(),
                review: "abcd".to_string(),
                rating: 5.0,
                date: "d".to_string(),
            },
            ReviewRecord {
                title: "t".to_string(),
                review: "ab".to_string(),
                rating: 2.0,
                date: "d".to_string(),
            },
        ];

        let summary = CorpusSummary::from_records(&records);
        assert_eq!(summary.total_reviews, 2);
        assert_eq!(summary.avg_review_chars, 3.0);
        assert_eq!(summary.avg_rating, 3.5);
        assert_eq!(CorpusSummary::from_records(&[]).total_reviews, 0);
    }
}
