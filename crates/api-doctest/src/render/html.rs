//! HTML report pages and the report index.

use super::{escape_html, ReportRenderer};
use crate::files::ReportFiles;
use crate::item::{DocItem, NamedValues, RequestItem, ResponseItem, UploadItem};
use crate::json::JsonComparator;
use crate::result::DocTestResult;
use tracing::info;

/// Stem of the generated index page
pub const INDEX_NAME: &str = "index";

const STYLE: &str = r"
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 20px; }
        nav { background: #f5f5f5; padding: 10px 20px; border-radius: 8px; margin-bottom: 20px; }
        .section { border-bottom: 1px solid #ddd; padding-bottom: 4px; }
        .request { background: #e3f2fd; border-left: 4px solid #1976d2; padding: 10px; margin: 8px 0; }
        .response { background: #f1f8e9; border-left: 4px solid #689f38; padding: 10px; margin: 8px 0; }
        .upload { background: #fff3e0; border-left: 4px solid #ff9800; padding: 10px; margin: 8px 0; }
        .verify { color: #2e7d32; }
        .verify::before { content: '\2714  '; }
        pre { background: #fafafa; border: 1px solid #eee; padding: 8px; white-space: pre-wrap; }
        table { border-collapse: collapse; margin: 4px 0; }
        td, th { border: 1px solid #ddd; padding: 2px 8px; text-align: left; font-family: monospace; }
";

/// Writes each report as an HTML page and keeps `index.html` current
#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    files: ReportFiles,
    json: JsonComparator,
}

impl HtmlRenderer {
    /// Create a renderer writing through `files`
    #[must_use]
    pub const fn new(files: ReportFiles) -> Self {
        Self {
            files,
            json: JsonComparator::new(),
        }
    }

    /// Render one report page
    #[must_use]
    pub fn render_page(&self, items: &[DocItem], report_name: &str) -> String {
        let mut html = page_header(report_name);

        let sections: Vec<&str> = items
            .iter()
            .filter_map(|item| match item {
                DocItem::Section(section) => Some(section.title.as_str()),
                _ => None,
            })
            .collect();
        if !sections.is_empty() {
            html.push_str("<nav>\n    <ul>\n");
            for (i, title) in sections.iter().enumerate() {
                html.push_str(&format!(
                    "        <li><a href=\"#section-{}\">{}</a></li>\n",
                    i + 1,
                    escape_html(title)
                ));
            }
            html.push_str("    </ul>\n</nav>\n");
        }

        let mut section_index = 0;
        for item in items {
            match item {
                DocItem::Text(text) => {
                    html.push_str(&format!("<p>{}</p>\n", escape_html(&text.text)));
                }
                DocItem::Section(section) => {
                    section_index += 1;
                    html.push_str(&format!(
                        "<h2 class=\"section\" id=\"section-{section_index}\">{}</h2>\n",
                        escape_html(&section.title)
                    ));
                }
                DocItem::Preformatted(block) => {
                    html.push_str(&format!("<pre>{}</pre>\n", escape_html(&block.text)));
                }
                DocItem::Request(request) => self.push_request(&mut html, request),
                DocItem::Response(response) => self.push_response(&mut html, response),
                DocItem::Upload(upload) => self.push_upload(&mut html, upload),
                DocItem::Verify(verify) => {
                    html.push_str(&format!(
                        "<pre class=\"verify\">{}</pre>\n",
                        escape_html(&verify.message)
                    ));
                }
                DocItem::Link(link) => {
                    html.push_str(&format!(
                        "<p><a href=\"{}\">{}</a></p>\n",
                        escape_html(&link.target),
                        escape_html(&link.name)
                    ));
                }
            }
        }

        html.push_str(&page_footer());
        html
    }

    /// Rebuild the index page from the report files on disk
    pub fn write_index(&self) -> DocTestResult<()> {
        let index_file = format!("{INDEX_NAME}{}", self.files.extension());
        let links: Vec<DocItem> = self
            .files
            .list_reports()?
            .into_iter()
            .filter(|file| *file != index_file)
            .filter_map(|file| {
                let name = file.strip_suffix(self.files.extension())?.to_string();
                Some(DocItem::link(file, name))
            })
            .collect();

        let html = self.render_page(&links, "Doc Tests");
        let path = self.files.complete_file_name(INDEX_NAME);
        self.files.write_file(&path, &html)
    }

    fn push_request(&self, html: &mut String, request: &RequestItem) {
        html.push_str("<div class=\"request\">\n");
        html.push_str(&format!(
            "    <strong>{}</strong> <code>{}</code>\n",
            request.method,
            escape_html(&request.uri)
        ));
        push_named_values(html, "Headers", &request.headers);
        push_named_values(html, "Cookies", &request.cookies);
        if let Some(payload) = &request.payload {
            self.push_payload(html, payload, request.is_json);
        }
        html.push_str("</div>\n");
    }

    fn push_response(&self, html: &mut String, response: &ResponseItem) {
        html.push_str("<div class=\"response\">\n");
        html.push_str(&format!(
            "    <strong>{}</strong> {}\n",
            response.status_code,
            escape_html(&response.reason_phrase)
        ));
        push_named_values(html, "Headers", &response.headers);
        if let Some(payload) = &response.payload {
            self.push_payload(html, payload, response.is_json);
        }
        html.push_str("</div>\n");
    }

    fn push_upload(&self, html: &mut String, upload: &UploadItem) {
        let marker = self.files.line_break_marker();
        // keep the break marker as markup, escape everything around it
        let content = upload
            .content_as_text
            .split(marker)
            .map(escape_html)
            .collect::<Vec<_>>()
            .join(marker);

        html.push_str("<div class=\"upload\">\n");
        html.push_str(&format!(
            "    <strong>POST</strong> <code>{}</code>\n",
            escape_html(&upload.uri)
        ));
        html.push_str(&format!(
            "    <p>{} ({} bytes, {})</p>\n",
            escape_html(&upload.filename),
            upload.size_bytes,
            escape_html(&upload.mime_type)
        ));
        push_named_values(html, "Headers", &upload.headers);
        push_named_values(html, "Cookies", &upload.cookies);
        html.push_str(&format!("    <div class=\"content\">{content}</div>\n"));
        html.push_str("</div>\n");
    }

    fn push_payload(&self, html: &mut String, payload: &str, is_json: bool) {
        let text = if is_json {
            self.json
                .pretty_print(payload)
                .unwrap_or_else(|| payload.to_string())
        } else {
            payload.to_string()
        };
        html.push_str(&format!("    <pre>{}</pre>\n", escape_html(&text)));
    }
}

impl ReportRenderer for HtmlRenderer {
    fn render(&self, items: &[DocItem], report_name: &str) -> DocTestResult<()> {
        let html = self.render_page(items, report_name);
        let path = self.files.complete_file_name(report_name);
        self.files.write_file(&path, &html)?;
        self.write_index()?;
        info!(report = report_name, path = %path.display(), "HTML report written");
        Ok(())
    }
}

fn push_named_values(html: &mut String, label: &str, values: &NamedValues) {
    if values.is_empty() {
        return;
    }
    html.push_str(&format!("    <table>\n        <tr><th colspan=\"2\">{label}</th></tr>\n"));
    for entry in values {
        html.push_str(&format!(
            "        <tr><td>{}</td><td>{}</td></tr>\n",
            escape_html(&entry.name),
            escape_html(&entry.value)
        ));
    }
    html.push_str("    </table>\n");
}

fn page_header(title: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
    <style>{STYLE}    </style>
</head>
<body>
<h1>{title}</h1>
"#,
        title = escape_html(title)
    )
}

fn page_footer() -> String {
    format!(
        r"
<footer>
    <p>Generated {}</p>
</footer>
</body>
</html>
",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocTestConfig;
    use crate::http::HttpMethod;
    use std::fs;
    use tempfile::TempDir;

    fn renderer(dir: &TempDir) -> (HtmlRenderer, ReportFiles) {
        let files = ReportFiles::new(&DocTestConfig::default().with_output_dir(dir.path()));
        (HtmlRenderer::new(files.clone()), files)
    }

    mod page_tests {
        use super::*;

        #[test]
        fn test_text_is_escaped() {
            let dir = TempDir::new().unwrap();
            let (html, _) = renderer(&dir);
            let page = html.render_page(&[DocItem::text("<b>a & b</b>")], "Escape");
            assert!(page.contains("<p>&lt;b&gt;a &amp; b&lt;/b&gt;</p>"));
            assert!(page.contains("<title>Escape</title>"));
        }

        #[test]
        fn test_sections_get_anchors() {
            let dir = TempDir::new().unwrap();
            let (html, _) = renderer(&dir);
            let items = [
                DocItem::section("Create"),
                DocItem::text("x"),
                DocItem::section("Delete"),
            ];
            let page = html.render_page(&items, "Sections");
            assert!(page.contains("href=\"#section-1\">Create<"));
            assert!(page.contains("id=\"section-2\">Delete<"));
        }

        #[test]
        fn test_item_order_kept() {
            let dir = TempDir::new().unwrap();
            let (html, _) = renderer(&dir);
            let items = [DocItem::text("first"), DocItem::verify("second")];
            let page = html.render_page(&items, "Order");
            let first = page.find("first").unwrap();
            let second = page.find("second").unwrap();
            assert!(first < second);
        }

        #[test]
        fn test_json_payload_pretty_printed() {
            let dir = TempDir::new().unwrap();
            let (html, _) = renderer(&dir);
            let item = DocItem::Request(RequestItem {
                uri: "/orders".to_string(),
                method: HttpMethod::Post,
                payload: Some(r#"{"id":1}"#.to_string()),
                is_json: true,
                headers: NamedValues::new().with("Accept", "application/json"),
                cookies: NamedValues::new(),
            });
            let page = html.render_page(&[item], "Pretty");
            assert!(page.contains("<strong>POST</strong> <code>/orders</code>"));
            assert!(page.contains("{\n  &quot;id&quot;: 1\n}"));
            assert!(page.contains("<td>Accept</td>"));
            assert!(!page.contains("Cookies"));
        }

        #[test]
        fn test_response_raw_payload() {
            let dir = TempDir::new().unwrap();
            let (html, _) = renderer(&dir);
            let item = DocItem::Response(ResponseItem {
                status_code: 404,
                reason_phrase: "Not Found".to_string(),
                payload: Some("<p>gone</p>".to_string()),
                is_json: false,
                headers: NamedValues::new(),
            });
            let page = html.render_page(&[item], "Raw");
            assert!(page.contains("<strong>404</strong> Not Found"));
            assert!(page.contains("&lt;p&gt;gone&lt;/p&gt;"));
        }

        #[test]
        fn test_upload_keeps_line_breaks() {
            let dir = TempDir::new().unwrap();
            let (html, _) = renderer(&dir);
            let item = DocItem::Upload(UploadItem {
                uri: "/files".to_string(),
                filename: "file.txt".to_string(),
                content_as_text: "a<b<br/>c".to_string(),
                size_bytes: 5,
                mime_type: "text/plain".to_string(),
                headers: NamedValues::new(),
                cookies: NamedValues::new(),
            });
            let page = html.render_page(&[item], "Upload");
            assert!(page.contains("a&lt;b<br/>c"));
            assert!(page.contains("file.txt (5 bytes, text/plain)"));
        }
    }

    mod file_tests {
        use super::*;

        #[test]
        fn test_render_writes_page_and_index() {
            let dir = TempDir::new().unwrap();
            let (html, files) = renderer(&dir);
            html.render(&[DocItem::text("hello")], "Orders").unwrap();
            html.render(&[], "Accounts").unwrap();

            let page = fs::read_to_string(files.complete_file_name("Orders")).unwrap();
            assert!(page.contains("<p>hello</p>"));

            let index = fs::read_to_string(files.complete_file_name(INDEX_NAME)).unwrap();
            assert!(index.contains("<a href=\"Orders.html\">Orders</a>"));
            assert!(index.contains("<a href=\"Accounts.html\">Accounts</a>"));
            assert!(!index.contains("index.html"));
        }

        #[test]
        fn test_index_ignores_other_extensions() {
            let dir = TempDir::new().unwrap();
            let (html, files) = renderer(&dir);
            fs::write(dir.path().join("Orders.json"), "{}").unwrap();
            html.write_index().unwrap();
            let index = fs::read_to_string(files.complete_file_name(INDEX_NAME)).unwrap();
            assert!(!index.contains("Orders.json"));
        }
    }
}
