//! Seed reference data from YAML files.
//!
//! FAQ file format:
//!
//! ```yaml
//! - question: How do I cancel a booking?
//!   answer: Open the appointment and choose Cancel while it is still pending.
//! - question: Which cards do you accept?
//!   answer: Visa, Mastercard, American Express and Discover.
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use pawgo_api::db::{self, FaqRepository};

#[derive(Debug, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

/// Parse and check a FAQ file before touching the database.
///
/// # Errors
///
/// Returns a message for YAML errors, blank fields or repeated questions.
pub fn parse_faqs(content: &str) -> Result<Vec<FaqEntry>, String> {
    let entries: Vec<FaqEntry> = serde_yaml::from_str(content).map_err(|e| e.to_string())?;

    let mut seen = std::collections::HashSet::new();
    for (i, entry) in entries.iter().enumerate() {
        if entry.question.trim().is_empty() || entry.answer.trim().is_empty() {
            return Err(format!("entry {}: question and answer are required", i + 1));
        }
        if !seen.insert(entry.question.trim()) {
            return Err(format!("entry {}: duplicate question", i + 1));
        }
    }

    Ok(entries)
}

/// Insert FAQs from `file_path`, leaving existing questions untouched.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the file cannot be read
/// or parsed, or an insert fails.
pub async fn faqs(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let database_url = super::database_url().ok_or("PAWGO_DATABASE_URL not set")?;

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading FAQs from file");
    let content = tokio::fs::read_to_string(path).await?;
    let entries = parse_faqs(&content)?;
    info!(count = entries.len(), "Parsed FAQ file");

    let pool = db::create_pool(&database_url).await?;
    let repo = FaqRepository::new(&pool);

    let mut inserted = 0_usize;
    for entry in &entries {
        let question = entry.question.trim();
        if repo.create_if_absent(question, entry.answer.trim()).await?.is_some() {
            inserted += 1;
        } else {
            warn!(question, "FAQ already exists, skipping");
        }
    }

    info!(inserted, skipped = entries.len() - inserted, "FAQ seeding complete");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_faqs() {
        let yaml = "- question: Do you board cats?\n  answer: Yes.\n";
        let entries = parse_faqs(yaml).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].question, "Do you board cats?");
    }

    #[test]
    fn test_parse_faqs_rejects_blank_and_duplicates() {
        assert!(parse_faqs("- question: ''\n  answer: x\n").is_err());
        let dup = "- question: Q\n  answer: a\n- question: Q \n  answer: b\n";
        assert!(parse_faqs(dup).unwrap_err().contains("duplicate"));
    }
}
