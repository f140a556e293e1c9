//! Escaping of user input for interpolation into generated HTML.

/// Escapes `&`, `<`, `>`, `"` and `'`, in that order.
///
/// #### Example
/// ```rust
/// # use quickpack_utils::html::escape;
/// assert_eq!(escape("<b>Tom & Jerry's</b>"), "&lt;b&gt;Tom &amp; Jerry&#039;s&lt;/b&gt;");
/// ```
pub fn escape(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}

/// Like [`escape`], but also turns newlines into `<br>` tags.
pub fn escape_multiline(text: &str) -> String {
    escape(text).replace('\n', "<br>")
}
