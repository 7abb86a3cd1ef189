//! Server-rendered HTML pages: home, content submission and search.

pub mod add;
pub mod home;
pub mod search;

pub use add::*;
pub use home::*;
pub use search::*;

use actix_web::{http::header::ContentType, http::StatusCode, HttpResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavItem {
    Home,
    Add,
    Search,
}

/// Notice displayed above a form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    fn render(&self) -> String {
        match self {
            Notice::Success(message) => {
                format!(r#"<p class="notice success">{}</p>"#, escape_html(message))
            }
            Notice::Error(message) => {
                format!(r#"<p class="notice error" role="alert">{}</p>"#, escape_html(message))
            }
        }
    }
}

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #fafafa; color: #18181b; }
header { display: flex; justify-content: space-between; align-items: center; padding: 0.5rem 1.5rem; border-bottom: 1px solid #e4e4e7; background: #fff; }
nav a { margin-left: 1rem; padding: 0.4rem 1rem; border-radius: 999px; color: #71717a; text-decoration: none; }
nav a.active { background: #f4f4f5; color: #18181b; }
main { max-width: 52rem; margin: 2rem auto; padding: 0 1rem; }
form label { display: block; margin-top: 1rem; font-weight: 600; }
form input, form textarea { width: 100%; padding: 0.5rem; box-sizing: border-box; }
.notice { padding: 0.75rem; border-radius: 0.5rem; }
.notice.success { background: #dcfce7; }
.notice.error { background: #fee2e2; }
.cards { list-style: none; padding: 0; display: grid; gap: 1rem; }
.card { background: #fff; border: 1px solid #e4e4e7; border-radius: 0.5rem; padding: 1rem; }
.card .meta { color: #71717a; margin: 0.25rem 0; }
.spinner { width: 1rem; height: 1rem; margin: 1rem auto; border: 2px solid #e4e4e7; border-top-color: #18181b; border-radius: 50%; animation: spin 0.8s linear infinite; }
.spinner[hidden] { display: none; }
@keyframes spin { to { transform: rotate(360deg); } }
#results[aria-busy="true"] { opacity: 0.5; }
form fieldset { border: 0; padding: 0; margin: 0; }
"#;

/// Escapes the characters with a meaning in HTML text and attribute values
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Wraps a page body with the document head and the top navigation
pub fn render_layout(title: &str, active: NavItem, body: &str) -> String {
    let link = |item: NavItem, href: &str, label: &str| {
        let class = if item == active { r#" class="active""# } else { "" };
        format!(r#"<a href="{}"{}>{}</a>"#, href, class, label)
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{style}</style>
</head>
<body>
<header><strong>{title}</strong><nav>{home}{add}{search}</nav></header>
<main>
{body}
</main>
</body>
</html>"#,
        title = escape_html(title),
        style = STYLE,
        home = link(NavItem::Home, "/", "Home"),
        add = link(NavItem::Add, "/add", "Add"),
        search = link(NavItem::Search, "/search", "Search"),
        body = body,
    )
}

pub fn html_response(status: StatusCode, page: String) -> HttpResponse {
    HttpResponse::build(status)
        .insert_header(ContentType::html())
        .body(page)
}
