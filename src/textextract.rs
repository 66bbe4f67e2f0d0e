//! Markup to display text.
//!
//! Tags are dropped wholesale and only `&lt;` / `&gt;` are decoded. There is
//! no HTML parser behind this; `<` inside attribute values ends nothing.

use crate::base::urlref::UrlRef;

const LT_ENTITY: &str = "&lt;";
const GT_ENTITY: &str = "&gt;";

/// Strip tags from `body` and decode the two angle-bracket entities.
pub fn extract_text(body: &str) -> String {
    let mut text = String::with_capacity(body.len());
    let mut in_tag = false;
    let mut rest = body;

    while let Some(c) = rest.chars().next() {
        if !in_tag && c == '&' {
            if rest.starts_with(LT_ENTITY) {
                text.push('<');
                rest = &rest[LT_ENTITY.len()..];
                continue;
            }
            if rest.starts_with(GT_ENTITY) {
                text.push('>');
                rest = &rest[GT_ENTITY.len()..];
                continue;
            }
        }

        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
        rest = &rest[c.len_utf8()..];
    }

    text
}

/// What the user sees for `url`: the raw body for `view-source:`, the
/// extracted text otherwise.
pub fn render_body(url: &UrlRef, body: &str) -> String {
    if url.is_view_source() {
        body.to_string()
    } else {
        extract_text(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_tags_and_decodes_entities() {
        assert_eq!(extract_text("<p>a &lt; b</p>"), "a < b");
        assert_eq!(extract_text("<b>x &gt; y</b>"), "x > y");
    }

    #[test]
    fn test_decoded_bracket_does_not_open_a_tag() {
        assert_eq!(extract_text("&lt;div&gt;"), "<div>");
    }

    #[test]
    fn test_entities_inside_tags_ignored() {
        assert_eq!(extract_text("<a title=\"&lt;\">link</a>"), "link");
    }

    #[test]
    fn test_other_entities_untouched() {
        assert_eq!(extract_text("fish &amp; chips &lt"), "fish &amp; chips &lt");
    }

    #[test]
    fn test_multibyte_text() {
        assert_eq!(extract_text("<h1>héllo → wörld</h1>"), "héllo → wörld");
    }

    #[test]
    fn test_unclosed_tag_swallows_rest() {
        assert_eq!(extract_text("visible<span hidden"), "visible");
    }

    #[test]
    fn test_render_body_view_source_passthrough() {
        let source = UrlRef::parse("view-source:http://example.org/").unwrap();
        let normal = UrlRef::parse("http://example.org/").unwrap();
        assert_eq!(render_body(&source, "<p>hi</p>"), "<p>hi</p>");
        assert_eq!(render_body(&normal, "<p>hi</p>"), "hi");
    }
}
