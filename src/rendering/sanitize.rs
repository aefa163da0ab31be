//! HTML escaping for untrusted text.

/// Escapes `&`, `<`, `>`, `"` and `'` to their entity equivalents.
///
/// Single pass: the output never contains any of the five raw characters
/// except as part of an entity.
///
/// # Examples
///
/// ```rust
/// use lostboard::escape_html;
///
/// assert_eq!(escape_html("<b>\"x\"&'y'</b>"), "&lt;b&gt;&quot;x&quot;&amp;&#39;y&#39;&lt;/b&gt;");
/// assert_eq!(escape_html(""), "");
/// ```
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
