use actix_web::{http::StatusCode, HttpResponse};

use super::{html_response, render_layout, NavItem};

#[tracing::instrument(name = "Home page")]
pub async fn home_page() -> HttpResponse {
    let body = r#"<h1>Marketing content</h1>
<p>Store marketing texts and find them back by meaning rather than by keywords.</p>
<ul>
<li><a href="/add">Add marketing content</a></li>
<li><a href="/search">Search similar content</a></li>
</ul>"#;

    html_response(StatusCode::OK, render_layout("Marketing content", NavItem::Home, body))
}
