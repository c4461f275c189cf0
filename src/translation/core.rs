/*!
 * Core translation service implementation.
 *
 * This module contains the TranslationService struct, the entry point that
 * turns one Markdown document into its translation: code blocks are set
 * aside, the remaining text is cut into fragments, the fragments are
 * translated concurrently and the code blocks are put back.
 */

use anyhow::{Context, Result};
use log::{debug, info};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::errors::TranslationError;
use crate::markdown::{CodeBlockGuard, line_endings, split_at_blank_lines};
use crate::providers::openai::OpenAi;
use crate::providers::{ApiCaller, ApiOptions, StatusCallback};

use super::concurrency::RequestThrottle;
use super::orchestrator::{Orchestrator, TranslationReport};
use super::prompts::PromptTemplate;

/// Main translation service for Markdown documents
#[derive(Debug, Clone)]
pub struct TranslationService {
    /// Model caller used for every fragment
    caller: Arc<dyn ApiCaller>,

    /// Configuration for the translation service
    pub config: Config,

    /// Instruction template
    template: PromptTemplate,

    /// Shared by every request made through this service
    throttle: RequestThrottle,
}

impl TranslationService {
    /// Create a new translation service calling the OpenAI API
    pub fn new(config: Config) -> Result<Self> {
        let client = OpenAi::new_with_config(
            config.api.api_key.clone(),
            config.api.endpoint.clone(),
            config.api.timeout_secs,
            config.api.https_proxy.as_deref(),
        )?;

        Self::with_caller(config, Arc::new(client))
    }

    /// Create a translation service around any caller
    pub fn with_caller(config: Config, caller: Arc<dyn ApiCaller>) -> Result<Self> {
        let template =
            PromptTemplate::from_optional_file(config.translation.instruction_file.as_deref())
                .context("Failed to load instruction template")?;

        let throttle = RequestThrottle::new(
            config.translation.max_concurrent_requests,
            Duration::from_millis(config.translation.api_call_interval_ms),
        );

        Ok(Self {
            caller,
            config,
            template,
            throttle,
        })
    }

    /// Model options sent with every fragment
    pub fn api_options(&self) -> ApiOptions {
        ApiOptions::new(self.config.api.resolved_model(), self.config.api.temperature)
    }

    /// Instruction sent with every fragment
    pub fn instruction(&self) -> Result<String, TranslationError> {
        let language = self
            .config
            .target_language_name()
            .map_err(|e| TranslationError::Configuration(e.to_string()))?;
        Ok(self.template.render(&language))
    }

    /// Translate a Markdown document
    pub async fn translate(&self, document: &str) -> Result<String, TranslationError> {
        self.translate_with_report(document, &|_| {})
            .await
            .map(|report| report.translation)
    }

    /// Translate a Markdown document, reporting progress and call counts
    pub async fn translate_with_report(
        &self,
        document: &str,
        on_status: StatusCallback<'_>,
    ) -> Result<TranslationReport, TranslationError> {
        self.config
            .validate()
            .map_err(|e| TranslationError::Configuration(e.to_string()))?;
        let instruction = self.instruction()?;
        let options = self.api_options();

        let crlf = line_endings::uses_crlf(document);
        let document = line_endings::to_lf(document);
        let document: &str = &document;

        let guard = CodeBlockGuard::for_document(document);
        let (stripped, blocks) = guard.extract(document);
        let fragments = split_at_blank_lines(&stripped, self.config.translation.fragment_size)
            .unwrap_or_else(|| vec![stripped.clone()]);

        info!(
            "Translating {} chars in {} fragments ({} code blocks), model {}, temperature {}",
            document.len(),
            fragments.len(),
            blocks.len(),
            options.model,
            options.temperature
        );
        let started = Instant::now();

        let mut report = Orchestrator::new(self.caller.as_ref())
            .with_throttle(self.throttle.clone())
            .with_max_split_depth(self.config.translation.max_split_depth)
            .translate_many_with_report(fragments, &instruction, &options, on_status)
            .await?;

        let mut translation = guard.restore(&report.translation, &blocks);
        if document.ends_with('\n') && !translation.ends_with('\n') {
            translation.push('\n');
        }
        if crlf {
            translation = line_endings::to_crlf(&translation);
        }
        report.translation = translation;

        debug!(
            "Finished in {:.1}s: {} calls, {} splits, {} untranslated fragments",
            started.elapsed().as_secs_f64(),
            report.api_calls,
            report.splits,
            report.passthrough_fragments
        );
        Ok(report)
    }
}
