//! HTML to plain text.

use std::sync::OnceLock;

use regex::Regex;

fn hidden_blocks() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>|<!--.*?-->")
            .expect("valid regex")
    })
}

fn block_tags() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)<\s*(br|/p|/div|/li|/h[1-6]|/tr|/title|/section|/article)\b[^>]*>")
            .expect("valid regex")
    })
}

fn any_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"))
}

fn spaces() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t\u{a0}]+").expect("valid regex"))
}

/// Strips markup, keeping one line per block element.
pub(super) fn to_text(html: &str) -> String {
    let without_hidden = hidden_blocks().replace_all(html, " ");
    let with_breaks = block_tags().replace_all(&without_hidden, "\n");
    let stripped = any_tag().replace_all(&with_breaks, " ");
    let decoded = decode_entities(&stripped);

    decoded
        .lines()
        .map(|line| spaces().replace_all(line, " ").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn decode_entities(text: &str) -> String {
    // &amp; last so that "&amp;lt;" stays "&lt;"
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_tags_and_keeps_blocks() {
        let html = "<html><head><title>Report</title></head>\
                    <body><h1>Intro</h1><p>First <b>bold</b> para.</p><p>Second</p></body></html>";
        assert_eq!(to_text(html), "Report\nIntro\nFirst bold para.\nSecond");
    }

    #[test]
    fn test_drops_script_style_and_comments() {
        let html = "<p>Visible</p><script type=\"text/javascript\">var x = '<p>';</script>\
                    <style>p { color: red; }</style><!-- hidden --><p>Also visible</p>";
        assert_eq!(to_text(html), "Visible\nAlso visible");
    }

    #[test]
    fn test_decodes_entities() {
        assert_eq!(
            to_text("<p>Fish &amp; chips &lt;3&nbsp;&quot;yes&quot;</p>"),
            "Fish & chips <3 \"yes\""
        );
        assert_eq!(to_text("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_line_breaks() {
        assert_eq!(to_text("one<br>two<BR/>three"), "one\ntwo\nthree");
    }
}
