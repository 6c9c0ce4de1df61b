use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref PARAGRAPH: Regex = Regex::new(r"(?i)<\s*(p|br)\s*/?>|<\s*/\s*p\s*>").unwrap();
    static ref LINK: Regex = Regex::new(r#"(?is)<a\s[^>]*>(.*?)</a>"#).unwrap();
    static ref TAG: Regex = Regex::new(r"<[^>]+>").unwrap();
    static ref BLANK_LINES: Regex = Regex::new(r"\n{3,}").unwrap();
}

/// Turns the HTML fragments the API uses for post and comment bodies into
/// plain text. Paragraph breaks become blank lines, links keep their text,
/// other tags are dropped and entities decoded.
pub fn plain_text(html: &str) -> String {
    let text = PARAGRAPH.replace_all(html, "\n\n");
    let text = LINK.replace_all(&text, "$1");
    let text = TAG.replace_all(&text, "");
    let text = html_escape::decode_html_entities(&text);
    let text = BLANK_LINES.replace_all(&text, "\n\n");
    text.trim().to_string()
}
