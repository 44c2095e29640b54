//! HTML presentation of song rows
//!
//! Consumes rows that were already fetched; never touches the store.

use playlist_common::Song;
use serde_json::Value;

/// CSS classes applied to every rendered table
const TABLE_CLASSES: &str = "table table-bordered table-hover align-middle";

/// Render rows as an HTML table with one header cell per column
pub fn render_table(columns: &[String], rows: &[Song]) -> String {
    let mut html = format!("<table class=\"{}\">\n<thead>\n<tr>", TABLE_CLASSES);
    for column in columns {
        html.push_str(&format!("<th>{}</th>", escape_html(column)));
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");

    for row in rows {
        html.push_str("<tr>");
        for column in columns {
            let text = row.get(column).map(cell_text).unwrap_or_default();
            html.push_str(&format!("<td>{}</td>", escape_html(&text)));
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</tbody>\n</table>");
    html
}

/// Wrap a rendered table in a page with pagination controls
pub fn render_page(table_html: &str, page: i64, total_pages: i64) -> String {
    let prev = if page > 1 {
        format!("<a class=\"button\" href=\"?page={}\">&lsaquo; Prev</a>", page - 1)
    } else {
        String::new()
    };
    let next = if page < total_pages {
        format!("<a class=\"button\" href=\"?page={}\">Next &rsaquo;</a>", page + 1)
    } else {
        String::new()
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Songs - Page {page}</title>
    <style>
        body {{
            font-family: system-ui, -apple-system, sans-serif;
            margin: 40px auto;
            padding: 20px;
        }}
        table {{
            border-collapse: collapse;
        }}
        th, td {{
            border: 1px solid #ccc;
            padding: 4px 8px;
        }}
        .button {{
            display: inline-block;
            padding: 6px 14px;
            background: #0066cc;
            color: white;
            text-decoration: none;
            border-radius: 4px;
            margin: 10px 5px;
        }}
    </style>
</head>
<body>
    <h1>Songs</h1>
    {table_html}
    <nav aria-label="Songs pagination">
        {prev}
        <span>Page {page} of {total_pages}</span>
        {next}
    </nav>
</body>
</html>
"#
    )
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
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
