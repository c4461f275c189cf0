/*!
 * Translation progress states.
 *
 * Every fragment moves through `waiting → pending → done | error`.
 * `pending` carries the latest progress token and can be re-entered as
 * streamed output arrives; `done` and `error` are terminal.
 */

use std::fmt;

/// Progress of one fragment, or of a whole request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationStatus {
    /// Not dispatched yet, or dispatched and waiting for the first output
    Waiting,
    /// In progress; `last_token` is the most recent short progress excerpt
    Pending { last_token: String },
    /// Finished with this translation
    Done { translation: String },
    /// Failed with this message
    Error { message: String },
}

impl TranslationStatus {
    /// Create a pending status
    pub fn pending(last_token: impl Into<String>) -> Self {
        Self::Pending {
            last_token: last_token.into(),
        }
    }

    /// Create a done status
    pub fn done(translation: impl Into<String>) -> Self {
        Self::Done {
            translation: translation.into(),
        }
    }

    /// Create an error status
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Whether no further transition can happen
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done { .. } | Self::Error { .. })
    }

    /// Whether moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: &TranslationStatus) -> bool {
        match self {
            Self::Waiting => true,
            Self::Pending { .. } => !matches!(next, Self::Waiting),
            Self::Done { .. } | Self::Error { .. } => false,
        }
    }

    /// Short human-readable rendering
    pub fn to_text(&self) -> String {
        match self {
            Self::Waiting => "waiting".to_string(),
            Self::Pending { last_token } if last_token.is_empty() => "pending".to_string(),
            Self::Pending { last_token } => format!("pending:{}", last_token),
            Self::Done { .. } => "done".to_string(),
            Self::Error { message } => format!("error:{}", message),
        }
    }
}

impl fmt::Display for TranslationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

/// Render a set of child statuses as `[a, b, c]`
pub fn render_children<'a, I>(children: I) -> String
where
    I: IntoIterator<Item = &'a TranslationStatus>,
{
    let parts: Vec<String> = children.into_iter().map(TranslationStatus::to_text).collect();
    format!("[{}]", parts.join(", "))
}
