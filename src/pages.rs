/// Home page with the paste creation form.
pub const INDEX: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <title>Pastebin Lite</title>
  </head>
  <body>
    <h2>Create Paste</h2>
    <form method="POST" action="/api/pastes">
      <textarea name="content" rows="10" cols="60" required></textarea><br><br>
      TTL (seconds): <input type="number" name="ttl_seconds" min="1"><br><br>
      Max Views: <input type="number" name="max_views" min="1"><br><br>
      <button type="submit">Create Paste</button>
    </form>
  </body>
</html>
"#;

/// Render a paste as a page with its content in a `<pre>` block.
pub fn paste_page(content: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n  <head>\n    <meta charset=\"utf-8\">\n    \
         <title>Pastebin Lite</title>\n  </head>\n  <body>\n    <pre>{}</pre>\n  \
         </body>\n</html>\n",
        escape_html(content)
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
