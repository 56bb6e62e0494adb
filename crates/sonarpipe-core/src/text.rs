pub const BODY_EXCERPT_CHARS: usize = 200;

#[must_use]
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    let Some((clip_idx, _)) = text.char_indices().nth(max_chars) else {
        return text.to_string();
    };

    let mut out = text[..clip_idx].to_string();
    out.push_str("...");
    out
}

/// Single-line excerpt of an HTTP body for error messages.
#[must_use]
pub fn body_excerpt(body: &str) -> String {
    let flattened = body.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_text(&flattened, BODY_EXCERPT_CHARS)
}

/// Leading characters of a secret, safe to show to an operator.
#[must_use]
pub fn secret_prefix(secret: &str, visible_chars: usize) -> String {
    let visible = secret.chars().take(visible_chars).collect::<String>();
    if visible.chars().count() == secret.chars().count() {
        return "*".repeat(visible.chars().count().max(3));
    }
    format!("{visible}...")
}

#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_text_preserves_utf8_char_boundaries() {
        let input = "\u{C548}\u{B155}\u{D558}\u{C138}\u{C694}-hello";
        let clipped = truncate_text(input, 5);
        let expected = format!("{}...", "\u{C548}\u{B155}\u{D558}\u{C138}\u{C694}");
        assert_eq!(clipped, expected);
    }

    #[test]
    fn truncate_text_returns_original_when_input_fits_limit() {
        assert_eq!(truncate_text("hello", 5), "hello");
    }

    #[test]
    fn body_excerpt_flattens_whitespace_and_clips() {
        let body = format!("{{\n  \"errors\": [\n{}\n]}}", "x".repeat(400));
        let excerpt = body_excerpt(&body);
        assert!(!excerpt.contains('\n'));
        assert!(excerpt.ends_with("..."));
        assert_eq!(excerpt.chars().count(), BODY_EXCERPT_CHARS + 3);
    }

    #[test]
    fn secret_prefix_never_reveals_short_secrets() {
        assert_eq!(secret_prefix("squ_abcdef123456", 6), "squ_ab...");
        assert_eq!(secret_prefix("abc", 6), "***");
    }

    #[test]
    fn escape_html_escapes_markup_characters() {
        assert_eq!(
            escape_html("<a href=\"x\">Tom & 'Jerry'</a>"),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }
}
