//! Text normalisation for mrkdwn output.

use once_cell::sync::Lazy;
use regex::Regex;

/// Runs of HTML whitespace collapse to one space outside `pre`.
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\r\n\x0C]+").unwrap());

pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").into_owned()
}

/// Escape the three characters mrkdwn treats as control syntax.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Split `text` into leading ASCII spaces, core, and trailing ASCII spaces.
///
/// Marks only render when they hug non-space characters, so wrappers are
/// applied to the core and the surrounding spaces moved outside.
pub fn split_padding(text: &str) -> (&str, &str, &str) {
    let core = text.trim_matches(' ');
    let lead = text.len() - text.trim_start_matches(' ').len();
    let (head, rest) = text.split_at(lead);
    let (core, tail) = rest.split_at(core.len());
    (head, core, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_html_whitespace() {
        assert_eq!(collapse_whitespace("a \n\t  b"), "a b");
        assert_eq!(collapse_whitespace("\u{2003}x"), "\u{2003}x");
    }

    #[test]
    fn escapes_control_characters() {
        assert_eq!(escape("a < b && c > d"), "a &lt; b &amp;&amp; c &gt; d");
    }

    #[test]
    fn splits_padding() {
        assert_eq!(split_padding("  hi there "), ("  ", "hi there", " "));
        assert_eq!(split_padding("   "), ("   ", "", ""));
        assert_eq!(split_padding("x"), ("", "x", ""));
    }
}
