//! Reachable command implementation

use super::export::parse_questionnaire;
use super::output;
use crate::MemoryStore;
use anyhow::{Context, Result};
use qexport_eval::AvailabilityResolver;
use std::path::PathBuf;

/// Configuration for reachable command
pub struct ReachableConfig {
    pub data: PathBuf,
    /// `id:version`
    pub questionnaire: String,
    pub pretty: bool,
    pub output_file: Option<PathBuf>,
}

/// Print the questions of a questionnaire version that conditions do not rule out
pub async fn reachable(config: ReachableConfig) -> Result<()> {
    let store = MemoryStore::from_path(&config.data)
        .with_context(|| format!("Failed to load data file: {}", config.data.display()))?;
    let reference = parse_questionnaire(&config.questionnaire)?;
    let questionnaire = store.questionnaire(reference).with_context(|| {
        format!("Questionnaire {} v{} not found", reference.id, reference.version)
    })?;

    let questions = AvailabilityResolver::resolve(&questionnaire.questions);
    let removed = questionnaire.questions.len() - questions.len();
    if removed > 0 {
        eprintln!(
            "{}",
            output::format_warning(&format!("{removed} questions can never be reached"))
        );
    }

    let content = if config.pretty {
        serde_json::to_string_pretty(&questions)
    } else {
        serde_json::to_string(&questions)
    }
    .context("Failed to serialize JSON")?;
    output::write_output(&content, config.output_file.as_deref())
}
