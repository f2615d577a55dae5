//! Best-effort markup removal for rendered HTML pages

use regex::Regex;
use std::sync::LazyLock;

/// Shortest `<...>` span on a single line
static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<.*?>").unwrap());

/// Strip all HTML/XML tags from text
///
/// Entities are left encoded and script/style bodies are kept; this is a cleaner,
/// not a parser.
pub fn strip_tags(text: &str) -> String {
    TAG_REGEX.replace_all(text, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_simple_tags() {
        assert_eq!(strip_tags("<b>hi</b> there"), "hi there");
    }

    #[test]
    fn test_plain_text_unchanged() {
        let text = "No markup here, just 3 > 2 and a & b.\nSecond line.";
        assert_eq!(strip_tags(text), text);
    }

    #[test]
    fn test_attributes_and_nesting() {
        let html = r#"<div class="ltx_para"><p id="p1">We use <a href="https://numpy.org">NumPy</a>.</p></div>"#;
        assert_eq!(strip_tags(html), "We use NumPy.");
    }

    #[test]
    fn test_entities_and_scripts_kept() {
        assert_eq!(strip_tags("<p>a &amp; b</p>"), "a &amp; b");
        assert_eq!(strip_tags("<script>var x = 1;</script>"), "var x = 1;");
    }

    #[test]
    fn test_tag_split_across_lines_is_kept() {
        // `.` does not cross newlines, so a broken tag survives
        let html = "<a\nhref=\"x\">link</a>";
        assert_eq!(strip_tags(html), "<a\nhref=\"x\">link");
    }

    #[test]
    fn test_empty_brackets_removed() {
        assert_eq!(strip_tags("a<>b"), "ab");
    }
}
