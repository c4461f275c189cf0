/*!
 * Line ending normalization.
 *
 * Fence and blank-line detection work on `\n`. Documents written with
 * `\r\n` are converted before processing and converted back afterwards.
 */

use std::borrow::Cow;

/// Whether the document uses Windows line endings
pub fn uses_crlf(text: &str) -> bool {
    text.contains("\r\n")
}

/// Replace every `\r\n` with `\n`
pub fn to_lf(text: &str) -> Cow<'_, str> {
    if uses_crlf(text) {
        Cow::Owned(text.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Write every line break as `\r\n`
pub fn to_crlf(text: &str) -> String {
    to_lf(text).replace('\n', "\r\n")
}
