//! Export command implementation

use super::output;
use crate::{AbortSignal, ArchiveReport, ExportOptions, Feature, MemoryStore, SpoolWriter, run_export};
use anyhow::{Context, Result, bail};
use qexport_model::QuestionnaireRef;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Output path that streams the archive to stdout
const STDOUT: &str = "-";

/// Configuration for export command
pub struct ExportConfig {
    /// JSON options file; command line values override its fields
    pub options_file: Option<PathBuf>,
    pub study: Option<String>,
    pub data: PathBuf,
    /// `-` writes to stdout
    pub output_file: PathBuf,
    pub questionnaires: Vec<String>,
    pub features: Vec<String>,
    pub participants: Vec<String>,
    pub delimiter: Option<char>,
    pub utc_offset_minutes: Option<i32>,
    pub timeout_secs: Option<u64>,
    pub verbose: bool,
}

/// Export a study from a JSON snapshot into a zip file
pub async fn export(config: ExportConfig) -> Result<()> {
    let options = build_options(&config)?;

    let store = MemoryStore::from_path(&config.data)
        .with_context(|| format!("Failed to load data file: {}", config.data.display()))?;
    if config.verbose {
        eprintln!("Loaded data from {}", config.data.display());
    }

    let store = Arc::new(store);
    let (report, target) = if config.output_file == Path::new(STDOUT) {
        let (_, report) = run_export(store, options, SpoolWriter::new(io::stdout()), AbortSignal::never())
            .await
            .context("Export failed")?;
        (report, "stdout".to_string())
    } else {
        (
            export_to_file(store, options, &config.output_file).await?,
            config.output_file.display().to_string(),
        )
    };

    eprintln!("{}", output::format_report(&report));
    if report.is_complete() {
        eprintln!(
            "{}",
            output::format_success(&format!("Archive written to {target}"))
        );
    } else {
        eprintln!(
            "{}",
            output::format_warning(&format!(
                "Archive written to {target} with {} incomplete entries",
                report.failures().count()
            ))
        );
    }
    Ok(())
}

async fn export_to_file(
    store: Arc<MemoryStore>,
    options: ExportOptions,
    path: &Path,
) -> Result<ArchiveReport> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let (_, report) = run_export(store, options, BufWriter::new(file), AbortSignal::never())
        .await
        .context("Export failed")?;
    Ok(report)
}

fn build_options(config: &ExportConfig) -> Result<ExportOptions> {
    let mut options = match (&config.options_file, &config.study) {
        (Some(path), _) => ExportOptions::from_path(path)?,
        (None, Some(study)) => ExportOptions::new(study.clone()),
        (None, None) => bail!("either --options or --study is required"),
    };

    if let Some(study) = &config.study {
        options.study_name.clone_from(study);
    }
    if !config.questionnaires.is_empty() {
        options.questionnaires = config
            .questionnaires
            .iter()
            .map(|value| parse_questionnaire(value))
            .collect::<Result<_>>()?;
    }
    if !config.features.is_empty() {
        options.features = config
            .features
            .iter()
            .map(|value| value.parse::<Feature>())
            .collect::<Result<_, _>>()?;
    }
    if !config.participants.is_empty() {
        options.participants = Some(config.participants.clone());
    }
    if let Some(delimiter) = config.delimiter {
        options.delimiter = delimiter;
    }
    if let Some(offset) = config.utc_offset_minutes {
        options.utc_offset_minutes = offset;
    }
    if config.timeout_secs.is_some() {
        options.timeout_secs = config.timeout_secs;
    }

    options.validate()?;
    Ok(options)
}

/// Parse `id:version`
pub fn parse_questionnaire(value: &str) -> Result<QuestionnaireRef> {
    let (id, version) = value
        .split_once(':')
        .with_context(|| format!("Invalid questionnaire '{value}', expected id:version"))?;
    let id = id
        .trim()
        .parse()
        .with_context(|| format!("Invalid questionnaire id in '{value}'"))?;
    let version = version
        .trim()
        .parse()
        .with_context(|| format!("Invalid questionnaire version in '{value}'"))?;
    Ok(QuestionnaireRef::new(id, version))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ExportConfig {
        ExportConfig {
            options_file: None,
            study: Some("Teststudie".to_string()),
            data: PathBuf::from("data.json"),
            output_file: PathBuf::from("export.zip"),
            questionnaires: vec!["3:2".to_string()],
            features: Vec::new(),
            participants: Vec::new(),
            delimiter: None,
            utc_offset_minutes: None,
            timeout_secs: None,
            verbose: false,
        }
    }

    #[test]
    fn test_parse_questionnaire() {
        assert_eq!(parse_questionnaire("3:2").unwrap(), QuestionnaireRef::new(3, 2));
        assert!(parse_questionnaire("3").is_err());
        assert!(parse_questionnaire("a:2").is_err());
    }

    #[test]
    fn test_command_line_values_build_options() {
        let mut config = config();
        config.features = vec!["codebook".to_string()];
        config.delimiter = Some(',');

        let options = build_options(&config).unwrap();
        assert_eq!(options.study_name, "Teststudie");
        assert_eq!(options.questionnaires, vec![QuestionnaireRef::new(3, 2)]);
        assert_eq!(options.features, vec![Feature::Codebook]);
        assert_eq!(options.delimiter, ',');
    }

    #[test]
    fn test_study_is_required() {
        let mut config = config();
        config.study = None;
        assert!(build_options(&config).is_err());
    }
}
