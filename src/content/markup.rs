/// Escape text for use inside HTML element content or a quoted attribute
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Turn recognized plain text into editor paragraphs, one per line.
/// Blank lines become the editor's empty paragraph.
pub fn text_to_paragraphs(text: &str) -> String {
    text.trim_end()
        .lines()
        .map(|line| {
            let line = line.trim_end();
            if line.is_empty() {
                "<p><br></p>".to_string()
            } else {
                format!("<p>{}</p>", escape_html(line))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"a < b & "c" > d"#), "a &lt; b &amp; &quot;c&quot; &gt; d");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_text_to_paragraphs() {
        assert_eq!(
            text_to_paragraphs("Total: 5 < 6\r\n\nDone\n"),
            "<p>Total: 5 &lt; 6</p><p><br></p><p>Done</p>"
        );
        assert_eq!(text_to_paragraphs("  \n"), "");
    }
}
