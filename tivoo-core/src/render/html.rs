use std::fmt::Write;

/// Escapes text for use in element content and double-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Wraps `body` (already markup) in a complete page titled `title` (text).
pub fn document(title: &str, body: &str) -> String {
    let mut html = String::with_capacity(body.len() + 160);
    let _ = writeln!(html, "<!DOCTYPE html>");
    let _ = writeln!(html, "<html>");
    let _ = writeln!(
        html,
        "<head><meta charset=\"utf-8\"><title>{}</title></head>",
        escape(title)
    );
    let _ = writeln!(html, "<body>");
    html.push_str(body);
    let _ = writeln!(html, "</body>");
    let _ = writeln!(html, "</html>");
    html
}
