/*!
 * Fenced code block markers.
 *
 * Recognises the opening and closing lines of fenced code regions
 * (backtick or tilde fences, optionally indented by up to three spaces,
 * with an optional info string such as a language tag).
 */

/// An opening fence line that is waiting for its closing line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fence {
    /// Fence character, either '`' or '~'
    marker: char,
    /// Number of fence characters on the opening line
    length: usize,
}

impl Fence {
    /// Parse a line as an opening fence
    pub fn opening(line: &str) -> Option<Self> {
        let rest = strip_indent(line)?;
        let marker = rest.chars().next()?;
        if marker != '`' && marker != '~' {
            return None;
        }

        let length = rest.chars().take_while(|c| *c == marker).count();
        if length < 3 {
            return None;
        }

        // A backtick fence's info string may not contain backticks
        let info = &rest[length..];
        if marker == '`' && info.contains('`') {
            return None;
        }

        Some(Self { marker, length })
    }

    /// Whether `line` closes this fence
    pub fn is_closed_by(&self, line: &str) -> bool {
        let Some(rest) = strip_indent(line) else {
            return false;
        };

        let run = rest.chars().take_while(|c| *c == self.marker).count();
        run >= self.length && rest[run * self.marker.len_utf8()..].trim().is_empty()
    }
}

/// Tracks whether a line-by-line scan is currently inside a fenced region
#[derive(Debug, Default, Clone)]
pub struct FenceTracker {
    open: Option<Fence>,
}

impl FenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next line of the scan
    pub fn feed(&mut self, line: &str) {
        match self.open {
            Some(fence) => {
                if fence.is_closed_by(line) {
                    self.open = None;
                }
            }
            None => self.open = Fence::opening(line),
        }
    }

    /// Whether the scan is inside an unclosed fence
    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }
}

/// Strip up to three leading spaces; four or more means an indented code line
fn strip_indent(line: &str) -> Option<&str> {
    let spaces = line.chars().take_while(|c| *c == ' ').count();
    if spaces > 3 {
        return None;
    }
    Some(&line[spaces..])
}
