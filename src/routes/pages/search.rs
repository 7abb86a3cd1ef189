use actix_web::{http::StatusCode, web, HttpResponse, ResponseError};
use serde::Deserialize;
use tracing::error;

use super::{escape_html, html_response, render_layout, NavItem, Notice};
use crate::{
    configuration::SearchUiSettings,
    domain::entities::content_item::ContentMetadata,
    routes::QueryVectorError,
    use_cases::query_content::{QueryContentRequest, QueryContentUseCase},
};

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub top_k: Option<usize>,
}

/// Fetches the results fragment once typing pauses for `__DEBOUNCE_MS__` ms.
/// An in-flight request is aborted when a newer search starts or the input is cleared, and a
/// response only replaces the results if it belongs to the latest search.
/// The spinner is shown while the latest search is in flight.
const SEARCH_SCRIPT: &str = r#"<script>
(() => {
  const input = document.getElementById("q");
  const results = document.getElementById("results");
  const spinner = document.getElementById("loading");
  const delay = __DEBOUNCE_MS__;
  let timer = null;
  let latest = 0;
  let controller = null;

  const setLoading = (loading) => {
    spinner.hidden = !loading;
    if (loading) results.setAttribute("aria-busy", "true");
    else results.removeAttribute("aria-busy");
  };

  input.addEventListener("input", () => {
    clearTimeout(timer);
    timer = setTimeout(async () => {
      const sequence = ++latest;
      if (controller) controller.abort();
      controller = null;

      const query = input.value.trim();
      if (!query) {
        setLoading(false);
        return;
      }

      controller = new AbortController();
      setLoading(true);
      try {
        const response = await fetch("/search/results?q=" + encodeURIComponent(query), { signal: controller.signal });
        const html = await response.text();
        if (sequence === latest) results.innerHTML = html;
      } catch (error) {
        if (error.name !== "AbortError") console.error("Error during search:", error);
      } finally {
        if (sequence === latest) setLoading(false);
      }
    }, delay);
  });
})();
</script>"#;

enum SearchOutcome {
    NotSearched,
    Found(Vec<ContentMetadata>),
    Failed(QueryVectorError),
}

async fn run_search(
    use_case: &QueryContentUseCase,
    settings: &SearchUiSettings,
    params: &SearchParams,
) -> SearchOutcome {
    let query = match &params.q {
        Some(q) if !q.trim().is_empty() => q.clone(),
        _ => return SearchOutcome::NotSearched,
    };

    let request = QueryContentRequest {
        text: Some(query),
        top_k: params.top_k.or(Some(settings.top_k)),
    };

    match use_case.execute(request).await {
        Ok(results) => SearchOutcome::Found(results),
        Err(error) => {
            let error = QueryVectorError::from(error);
            error!(?error, "Search failed");
            SearchOutcome::Failed(error)
        }
    }
}

fn render_outcome(outcome: &SearchOutcome) -> (StatusCode, String) {
    match outcome {
        SearchOutcome::NotSearched => (StatusCode::OK, render_result_cards(&[])),
        SearchOutcome::Found(results) => (StatusCode::OK, render_result_cards(results)),
        SearchOutcome::Failed(error) => (
            error.status_code(),
            Notice::Error(error.to_string()).render(),
        ),
    }
}

/// Search page. Results are rendered server-side when `q` is given.
#[tracing::instrument(name = "Search page", skip(use_case, settings))]
pub async fn search_page(
    use_case: web::Data<QueryContentUseCase>,
    settings: web::Data<SearchUiSettings>,
    params: web::Query<SearchParams>,
) -> HttpResponse {
    let outcome = run_search(&use_case, &settings, &params).await;
    let (status, results) = render_outcome(&outcome);

    html_response(
        status,
        render_search_page(
            params.q.as_deref().unwrap_or_default(),
            &results,
            settings.debounce_ms,
        ),
    )
}

/// Results only, fetched by the search page script
#[tracing::instrument(name = "Search results fragment", skip(use_case, settings))]
pub async fn search_results(
    use_case: web::Data<QueryContentUseCase>,
    settings: web::Data<SearchUiSettings>,
    params: web::Query<SearchParams>,
) -> HttpResponse {
    let outcome = run_search(&use_case, &settings, &params).await;
    let (status, results) = render_outcome(&outcome);

    HttpResponse::build(status)
        .insert_header(actix_web::http::header::ContentType::html())
        .body(results)
}

pub fn render_search_page(query: &str, results: &str, debounce_ms: u64) -> String {
    let body = format!(
        r#"<h1>Search</h1>
<form method="get" action="/search" role="search">
<textarea id="q" name="q" rows="1" placeholder="Search something..." autocomplete="off" required>{query}</textarea>
<p><button type="submit">Search</button></p>
</form>
<div id="loading" class="spinner" role="status" aria-label="Loading" hidden></div>
<section id="results" aria-live="polite">{results}</section>
{script}"#,
        query = escape_html(query),
        results = results,
        script = SEARCH_SCRIPT.replace("__DEBOUNCE_MS__", &debounce_ms.to_string()),
    );

    render_layout("Search", NavItem::Search, &body)
}

/// One card per result. Author, date, tags and categories only appear when set.
pub fn render_result_cards(results: &[ContentMetadata]) -> String {
    if results.is_empty() {
        return "<p>No results yet...</p>".to_string();
    }

    let cards: String = results.iter().map(render_result_card).collect();
    format!(r#"<ul class="cards">{}</ul>"#, cards)
}

fn render_result_card(result: &ContentMetadata) -> String {
    let title = result
        .title
        .as_deref()
        .filter(|title| !title.is_empty())
        .unwrap_or("Untitled");
    let content = if result.content.is_empty() {
        "No content available."
    } else {
        result.content.as_str()
    };

    let mut card = format!(
        r#"<li class="card"><h2>{}</h2><p>{}</p>"#,
        escape_html(title),
        escape_html(content)
    );

    let mut meta = |label: &str, value: &str| {
        card.push_str(&format!(
            r#"<p class="meta">{}: {}</p>"#,
            label,
            escape_html(value)
        ));
    };

    if let Some(author) = result.author.as_deref().filter(|a| !a.is_empty()) {
        meta("Author", author);
    }
    if let Some(date) = result.date.as_deref().filter(|d| !d.is_empty()) {
        meta("Date", date);
    }
    if !result.tags.is_empty() {
        meta("Tags", &result.tags.join(", "));
    }
    if !result.categories.is_empty() {
        meta("Categories", &result.categories.join(", "));
    }

    card.push_str("</li>");
    card
}
