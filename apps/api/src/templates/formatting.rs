/// Escapes text for HTML element and attribute content.
///
/// Braces are escaped as well so user content can never form `{{…}}`
/// placeholders once it is inside a template.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '{' => out.push_str("&#123;"),
            '}' => out.push_str("&#125;"),
            _ => out.push(c),
        }
    }
    out
}

/// Terminal-style rendering used by template3: each non-blank line becomes a
/// `code-line` span, lines are joined with `<br>`. No raw newline survives.
pub fn code_lines(text: &str) -> String {
    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let indent = line.len() - line.trim_start().len();
            format!(
                "<span class=\"code-line\">{}{}</span>",
                "&nbsp;".repeat(indent),
                escape_html(line.trim_start())
            )
        })
        .collect::<Vec<_>>()
        .join("<br>")
}

/// Escapes `text` and, when `code` is set, applies [`code_lines`].
pub fn format_text(text: &str, code: bool) -> String {
    if code {
        code_lines(text)
    } else {
        escape_html(text)
    }
}

/// Turns a free-form string into a quoted JS-like string literal for terminal layouts.
pub fn code_string(text: &str) -> String {
    format!("<span class=\"token string\">\"{}\"</span>", escape_html(text))
}
