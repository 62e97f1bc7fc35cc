//! HTML pages for the viewer.

use std::fmt::Write;

use url::Url;

use crate::source::{ResultDocument, ResultSummary};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// Only used to percent-encode link paths; the host never appears in the page.
const LINK_BASE: &str = "http://viewer/";

const STYLE: &str = r#"
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background: #f5f5f5; padding: 20px; color: #333; }
        .container { max-width: 1200px; margin: 0 auto; background: white; border-radius: 8px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); padding: 30px; }
        h1 { color: #2c3e50; margin-bottom: 30px; border-bottom: 3px solid #3498db; padding-bottom: 10px; }
        .file-list { list-style: none; }
        .file-item { background: #f8f9fa; border: 1px solid #dee2e6; border-radius: 6px; padding: 15px; margin-bottom: 15px; }
        .file-header { display: flex; justify-content: space-between; align-items: center; margin-bottom: 10px; }
        .file-name { font-weight: 600; color: #2c3e50; font-size: 18px; }
        .file-date { color: #6c757d; font-size: 14px; }
        .btn { padding: 8px 16px; border-radius: 4px; text-decoration: none; display: inline-block; font-size: 14px; color: white; background: #3498db; }
        .btn-success { background: #27ae60; }
        .metrics { display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 15px; margin-top: 15px; list-style: none; }
        .metric { background: white; padding: 12px; border-radius: 6px; border-left: 4px solid #3498db; font-weight: 600; }
        .no-results { text-align: center; padding: 60px 20px; color: #6c757d; }
        .header { display: flex; justify-content: space-between; align-items: center; margin-bottom: 30px; }
        pre { background: #2c3e50; color: #ecf0f1; padding: 20px; border-radius: 6px; overflow-x: auto; font-size: 14px; line-height: 1.6; }
"#;

/// Renders the results list page.
pub fn list_page(results: &[ResultSummary]) -> String {
    let mut body = String::from(
        "<p><a href=\"/\" class=\"btn\">Refresh</a></p>\n<h1>Performance Test Results</h1>\n",
    );

    if results.is_empty() {
        body.push_str(concat!(
            "<div class=\"no-results\">\n",
            "<h2>No test results found</h2>\n",
            "<p>Run your load tests to generate results. They will appear here automatically.</p>\n",
            "</div>\n",
        ));
    } else {
        body.push_str("<ul class=\"file-list\">\n");
        for result in results {
            body.push_str(&result_item(result));
        }
        body.push_str("</ul>\n");
    }

    page("Performance Test Results", &body)
}

fn result_item(result: &ResultSummary) -> String {
    let metrics = if result.metrics.is_empty() {
        String::new()
    } else {
        let items: String = result
            .metrics
            .rows()
            .iter()
            .map(|(label, value)| format!("<li class=\"metric\">{label}: {value}</li>\n"))
            .collect();
        format!("<ul class=\"metrics\">\n{items}</ul>\n")
    };

    format!(
        r#"<li class="file-item">
<div class="file-header"><div>
<div class="file-name">{name}</div>
<div class="file-date">{date}</div>
</div><div>
<a href="{view}" class="btn">View Details</a>
<a href="{download}" class="btn btn-success">Download JSON</a>
</div></div>
{metrics}</li>
"#,
        name = escape(&result.name),
        date = result.date.format(DATE_FORMAT),
        view = escape(&result_href("view", &result.key)),
        download = escape(&result_href("download", &result.key)),
    )
}

/// Renders one result as indented JSON.
pub fn detail_page(doc: &ResultDocument) -> String {
    let pretty = serde_json::to_string_pretty(&doc.body).unwrap_or_default();
    let body = format!(
        r#"<div class="header">
<h1>{name}</h1>
<a href="/" class="btn">Back to List</a>
</div>
<pre id="json-content">{json}</pre>
"#,
        name = escape(&doc.name),
        json = escape(&pretty),
    );
    page(&format!("Test Results - {}", doc.name), &body)
}

fn page(title: &str, body: &str) -> String {
    let mut out = String::with_capacity(STYLE.len() + body.len() + 512);
    // writing into a String cannot fail
    let _ = write!(
        out,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>{STYLE}</style>
</head>
<body>
<div class="container">
{body}</div>
</body>
</html>
"#,
        title = escape(title),
    );
    out
}

/// Path to `/<action>/<key>` with `key` percent-encoded as one segment.
pub fn result_href(action: &str, key: &str) -> String {
    Url::parse(LINK_BASE)
        .ok()
        .and_then(|mut url| {
            url.path_segments_mut().ok()?.clear().push(action).push(key);
            Some(url.path().to_string())
        })
        .unwrap_or_else(|| format!("/{action}/{key}"))
}

/// Escapes text for HTML element content and quoted attributes.
pub fn escape(text: &str) -> String {
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
