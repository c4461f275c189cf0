/*!
 * Instruction templates for Markdown translation.
 *
 * A template is plain text with a `{target_language}` placeholder. The
 * rendered instruction is identical for every fragment of a request.
 */

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::markdown::PLACEHOLDER_KEYWORD;

/// Instruction template for the translator model.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// The default instruction for Markdown documentation.
    pub const MARKDOWN_TRANSLATOR: &'static str = r#"I am translating technical documentation into {target_language}.
Please translate the Markdown content I'll paste later to {target_language}.

You must strictly follow the rules below.

- Never change the Markdown markup structure. Don't add or remove links. Do not change any URL.
- Never change the contents of code blocks even if they appear to have a bug. Importantly, never touch lines containing the `{placeholder_keyword}-xxxxxx` keyword.
- Always preserve the original line breaks. Do not add or remove blank lines.
- Never touch the permalink such as `{/*try-react*/}` at the end of each heading.
- Never touch HTML-like tags such as `<Notes>` or `<YouWillLearn>`."#;

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Create the default Markdown translator template.
    pub fn markdown_translator() -> Self {
        Self::new(Self::MARKDOWN_TRANSLATOR)
    }

    /// Load a template from a text file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let template = fs::read_to_string(path)
            .with_context(|| format!("Failed to read instruction file: {}", path.display()))?;
        if template.trim().is_empty() {
            anyhow::bail!("Instruction file is empty: {}", path.display());
        }
        Ok(Self::new(&template))
    }

    /// The template, or the default when no file is given.
    pub fn from_optional_file(path: Option<&str>) -> Result<Self> {
        match path.filter(|p| !p.is_empty()) {
            Some(path) => Self::from_file(path),
            None => Ok(Self::markdown_translator()),
        }
    }

    /// Render the template for a target language display name.
    pub fn render(&self, target_language: &str) -> String {
        self.template
            .replace("{target_language}", target_language)
            .replace("{placeholder_keyword}", PLACEHOLDER_KEYWORD)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::markdown_translator()
    }
}
