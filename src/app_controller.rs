use anyhow::{Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::translation::{TranslationService, TranslationStatus};

// @module: Application controller for Markdown file translation

/// Where a translated document is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// `<stem>.<lang>.<ext>` beside the input
    Beside,
    /// Replace the input file
    InPlace,
    /// An explicit path
    Path(PathBuf),
}

/// Result of translating one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Translation written to this path
    Written(PathBuf),
    /// Output already existed and overwriting was not allowed
    Skipped(PathBuf),
}

/// Counts for a folder run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FolderSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Main application controller for document translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Translation service built from the configuration
    service: TranslationService,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let service = TranslationService::new(config.clone())?;
        Ok(Self { config, service })
    }

    // @method: Create a controller around an existing service
    pub fn with_service(service: TranslationService) -> Self {
        Self {
            config: service.config.clone(),
            service,
        }
    }

    /// Resolve the output path for an input file
    pub fn output_path(&self, input_file: &Path, target: &OutputTarget) -> PathBuf {
        match target {
            OutputTarget::Beside => {
                FileManager::generate_output_path(input_file, &self.config.target_language)
            }
            OutputTarget::InPlace => input_file.to_path_buf(),
            OutputTarget::Path(path) => path.clone(),
        }
    }

    /// Translate one Markdown file
    pub async fn run(
        &self,
        input_file: &Path,
        target: &OutputTarget,
        force_overwrite: bool,
    ) -> Result<FileOutcome> {
        if !FileManager::file_exists(input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        let output_path = self.output_path(input_file, target);
        if output_path != input_file && output_path.exists() && !force_overwrite {
            warn!(
                "Skipping {:?}, translation already exists (use --force to overwrite)",
                input_file
            );
            return Ok(FileOutcome::Skipped(output_path));
        }

        let start_time = Instant::now();
        let markdown = FileManager::read_to_string(input_file)?;

        info!("Translating {:?}...", input_file);
        let spinner = Self::create_spinner();
        let on_status = |status: TranslationStatus| spinner.set_message(status.to_text());
        let result = self.service.translate_with_report(&markdown, &on_status).await;
        spinner.finish_and_clear();

        let report = result?;
        if report.passthrough_fragments > 0 {
            warn!(
                "{} fragment(s) of {:?} were too long to translate and were kept as is",
                report.passthrough_fragments, input_file
            );
        }

        FileManager::write_to_file(&output_path, &report.translation)?;
        info!(
            "Saved {:?} in {} ({} API calls)",
            output_path,
            Self::format_duration(start_time.elapsed()),
            report.api_calls
        );

        Ok(FileOutcome::Written(output_path))
    }

    /// Run the workflow in folder mode, translating every Markdown file found
    /// Files that already have a translation are skipped
    pub async fn run_folder(
        &self,
        input_dir: &Path,
        in_place: bool,
        force_overwrite: bool,
    ) -> Result<FolderSummary> {
        let start_time = Instant::now();

        if !FileManager::dir_exists(input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let files = FileManager::find_markdown_files(input_dir, &self.config.target_language)?;
        if files.is_empty() {
            return Err(anyhow!("No Markdown files found in directory: {:?}", input_dir));
        }

        let target = if in_place {
            OutputTarget::InPlace
        } else {
            OutputTarget::Beside
        };

        let mut summary = FolderSummary::default();
        for (index, file) in files.iter().enumerate() {
            info!("[{}/{}] {:?}", index + 1, files.len(), file);
            match self.run(file, &target, force_overwrite).await {
                Ok(FileOutcome::Written(_)) => summary.processed += 1,
                Ok(FileOutcome::Skipped(_)) => summary.skipped += 1,
                Err(e) => {
                    error!("Error processing file {:?}: {:#}", file, e);
                    summary.failed += 1;
                }
            }
        }

        info!(
            "Folder processing completed in {}: {} processed, {} skipped, {} errors",
            Self::format_duration(start_time.elapsed()),
            summary.processed,
            summary.skipped,
            summary.failed
        );

        Ok(summary)
    }

    fn create_spinner() -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner.set_message(TranslationStatus::Waiting.to_text());
        spinner
    }

    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
