//! HTML template minification, run once at startup.
//!
//! - Comments are dropped, except conditional comments (`<!--[if ...]>`)
//! - Whitespace between tags is removed, other runs collapse to one space
//! - `script`, `style`, `pre` and `textarea` bodies are copied verbatim

use std::sync::LazyLock;

use regex::Regex;

static BETWEEN_TAGS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r">\s+<").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

const RAW_TEXT_TAGS: &[&str] = &["script", "style", "pre", "textarea"];

/// Minify an HTML document.
pub fn minify_html(source: &str) -> String {
    let lower = source.to_ascii_lowercase();
    let mut masked = String::with_capacity(source.len());
    let mut blocks = Vec::new();
    let mut pos = 0;

    // Comments and raw-text elements are handled in document order, so a tag
    // inside a comment is never taken for an element and vice versa. Kept
    // blocks are swapped for tag-shaped markers so that the whitespace rules
    // treat them like any other element.
    loop {
        let comment = lower[pos..].find("<!--").map(|i| pos + i);
        let raw = next_raw_block(&lower, pos);
        let (start, end, keep) = match (comment, raw) {
            (Some(start), raw) if raw.map_or(true, |(raw_start, _)| start < raw_start) => {
                let end = lower[start..].find("-->").map_or(lower.len(), |i| start + i + 3);
                (start, end, lower[start + 4..].starts_with("[if"))
            }
            (_, Some((start, end))) => (start, end, true),
            (_, None) => break,
        };
        masked.push_str(&source[pos..start]);
        if keep {
            masked.push_str(&marker(blocks.len()));
            blocks.push(&source[start..end]);
        }
        pos = end;
    }
    masked.push_str(&source[pos..]);

    let mut out = collapse(&masked);
    for (i, block) in blocks.iter().enumerate() {
        out = out.replacen(&marker(i), block, 1);
    }
    out.trim().to_string()
}

fn marker(index: usize) -> String {
    format!("<\u{0}{index}\u{0}>")
}

/// Byte range of the next raw-text element at or after `from`.
fn next_raw_block(lower: &str, from: usize) -> Option<(usize, usize)> {
    RAW_TEXT_TAGS
        .iter()
        .filter_map(|tag| {
            let open = format!("<{tag}");
            let mut search = from;
            loop {
                let start = search + lower[search..].find(&open)?;
                let after = start + open.len();
                let boundary = lower[after..].chars().next();
                if matches!(boundary, Some(c) if c == '>' || c == '/' || c.is_ascii_whitespace()) {
                    let close = format!("</{tag}");
                    let end = match lower[after..].find(&close) {
                        Some(rel) => {
                            let close_start = after + rel;
                            lower[close_start..]
                                .find('>')
                                .map_or(lower.len(), |gt| close_start + gt + 1)
                        }
                        None => lower.len(),
                    };
                    return Some((start, end));
                }
                search = after;
            }
        })
        .min_by_key(|(start, _)| *start)
}

fn collapse(markup: &str) -> String {
    let tight = BETWEEN_TAGS_RE.replace_all(markup, "><");
    WHITESPACE_RE.replace_all(&tight, " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_whitespace_and_drops_comments() {
        let source = "<html>\n  <!-- build info -->\n  <body>\n    <p>Hello   world</p>\n  </body>\n</html>\n";
        assert_eq!(minify_html(source), "<html><body><p>Hello world</p></body></html>");
    }

    #[test]
    fn test_keeps_conditional_comments() {
        let source = "<head>\n<!--[if lt IE 9]><script src=\"x.js\"></script><![endif]-->\n</head>";
        assert_eq!(
            minify_html(source),
            "<head><!--[if lt IE 9]><script src=\"x.js\"></script><![endif]--></head>"
        );
    }

    #[test]
    fn test_script_bodies_untouched() {
        let source = "<body>\n  <script>\n    // keep me\n    var a = 1;\n  </script>\n</body>";
        assert_eq!(
            minify_html(source),
            "<body><script>\n    // keep me\n    var a = 1;\n  </script></body>"
        );
    }

    #[test]
    fn test_prefix_tags_are_not_raw() {
        let source = "<preview>\n  a  </preview>";
        assert_eq!(minify_html(source), "<preview> a </preview>");
    }

    #[test]
    fn test_placeholders_survive() {
        let source = "<title>\n  {%= title %}\n</title>";
        assert_eq!(minify_html(source), "<title> {%= title %} </title>");
    }

    #[test]
    fn test_tag_inside_comment_is_not_raw() {
        let source = "<head><!-- todo <script async --><title>T</title></head><body>{%# markup %}</body>";
        assert_eq!(
            minify_html(source),
            "<head><title>T</title></head><body>{%# markup %}</body>"
        );
    }

    #[test]
    fn test_comment_markers_inside_script_kept() {
        let source = "<script>\n  var s = \"<!--\";\n</script>\n<p>a</p>";
        assert_eq!(
            minify_html(source),
            "<script>\n  var s = \"<!--\";\n</script><p>a</p>"
        );
    }
}
