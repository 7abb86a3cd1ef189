use actix_web::{http::StatusCode, web, HttpResponse, ResponseError};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::{escape_html, html_response, render_layout, NavItem, Notice};
use crate::{
    domain::{entities::content_item::ContentMetadata, services::comma_list::split_comma_list},
    routes::InsertVectorError,
    use_cases::insert_content::{InsertContentRequest, InsertContentUseCase},
};

/// Fields of the submission form, as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AddFormData {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: String,
    /// Comma-separated
    #[serde(default)]
    pub tags: String,
    /// Comma-separated
    #[serde(default)]
    pub categories: String,
    #[serde(default)]
    pub date: String,
}

impl AddFormData {
    /// An empty form, dated today
    pub fn blank() -> Self {
        Self {
            date: Utc::now().format("%Y-%m-%d").to_string(),
            ..Default::default()
        }
    }

    pub fn to_request(&self) -> InsertContentRequest {
        InsertContentRequest {
            title: Some(self.title.clone()),
            text: Some(self.content.clone()),
            metadata: Some(ContentMetadata {
                title: None,
                author: Some(self.author.clone()),
                tags: split_comma_list(&self.tags),
                categories: split_comma_list(&self.categories),
                content: self.content.clone(),
                date: Some(self.date.clone()),
            }),
        }
    }
}

#[tracing::instrument(name = "Add content page")]
pub async fn add_content_page() -> HttpResponse {
    html_response(
        StatusCode::OK,
        render_add_page(&AddFormData::blank(), None),
    )
}

/// Saves the submitted content.
///
/// The form is emptied on success. On failure the typed values are kept and the error is displayed.
#[tracing::instrument(name = "Add content form submission", skip(use_case, form), fields(title = %form.title))]
pub async fn add_content(
    use_case: web::Data<InsertContentUseCase>,
    form: web::Form<AddFormData>,
) -> HttpResponse {
    let form = form.into_inner();

    if form.title.trim().is_empty() {
        let notice = Notice::Error("Title is required".into());
        return html_response(StatusCode::BAD_REQUEST, render_add_page(&form, Some(notice)));
    }

    match use_case.execute(form.to_request()).await {
        Ok(id) => {
            info!(%id, "Content saved from the form");
            let notice = Notice::Success(format!("Content saved with id {}", id));
            html_response(
                StatusCode::OK,
                render_add_page(&AddFormData::blank(), Some(notice)),
            )
        }
        Err(error) => {
            let error = InsertVectorError::from(error);
            error!(?error, "Failed to save content from the form");
            let notice = Notice::Error(error.to_string());
            html_response(error.status_code(), render_add_page(&form, Some(notice)))
        }
    }
}

pub fn render_add_page(form: &AddFormData, notice: Option<Notice>) -> String {
    let notice = notice.map(|notice| notice.render()).unwrap_or_default();

    let body = format!(
        r#"<h1>Add Marketing Content</h1>
<p>Enter the details of your marketing text.</p>
{notice}
<form method="post" action="/add" onsubmit="setTimeout(() => this.elements.controls.disabled = true)">
<fieldset name="controls">
<label for="title">Title</label>
<input id="title" name="title" placeholder="Title" value="{title}" required>
<label for="content">Content</label>
<textarea id="content" name="content" placeholder="Content" rows="6" required>{content}</textarea>
<label for="author">Author</label>
<input id="author" name="author" placeholder="Author" value="{author}">
<label for="tags">Tags (comma-separated)</label>
<input id="tags" name="tags" placeholder="e.g., marketing, SEO, sales" value="{tags}">
<label for="categories">Categories (comma-separated)</label>
<input id="categories" name="categories" placeholder="e.g., digital marketing, content strategy" value="{categories}">
<label for="date">Date</label>
<input id="date" name="date" type="date" value="{date}">
<p><button type="submit">Save</button></p>
</fieldset>
</form>"#,
        notice = notice,
        title = escape_html(&form.title),
        content = escape_html(&form.content),
        author = escape_html(&form.author),
        tags = escape_html(&form.tags),
        categories = escape_html(&form.categories),
        date = escape_html(&form.date),
    );

    render_layout("Add", NavItem::Add, &body)
}
