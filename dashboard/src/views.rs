use std::sync::Arc;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::config::CHART_REFRESH_SECONDS;
use crate::state::AppState;
use crate::styles::{self, Chart as ChartClass};

/// Reports tab visibility so the session stops drawing while nobody looks.
const VISIBILITY_SCRIPT: &str = r#"
document.addEventListener("visibilitychange", () => {
  fetch("/visibility", {
    method: "POST",
    headers: { "Content-Type": "application/json" },
    body: JSON.stringify({ visible: document.visibilityState === "visible" }),
  });
});
"#;

fn page_shell(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                link rel="stylesheet" href="/styles.css";
                script src="https://unpkg.com/htmx.org@2.0.4" {}
            }
            body {
                (content)
                script { (PreEscaped(VISIBILITY_SCRIPT)) }
            }
        }
    }
}

pub async fn index(State(state): State<Arc<AppState>>) -> Markup {
    let content = html! {
        h1 { "> volume over time" }
        div.(ChartClass::CHART_CONTAINER)
            style=(format!("max-width: {}px", state.max_width))
            hx-get="/fragments/chart"
            hx-trigger=(format!("every {CHART_REFRESH_SECONDS}s"))
            hx-swap="innerHTML"
        {
            (render_chart_fragment(&state))
        }
    };
    page_shell("Volume | Dashboard", content)
}

pub async fn fragment_chart(State(state): State<Arc<AppState>>) -> Markup {
    render_chart_fragment(&state)
}

pub fn render_chart_fragment(state: &AppState) -> Markup {
    if let Some(message) = state.failure() {
        return html! { div.(ChartClass::CHART_ERROR) { (message) } };
    }
    match &state.chart().markup {
        Some(markup) => markup.clone(),
        None => html! { div.(ChartClass::CHART_PLACEHOLDER) { "loading" } },
    }
}

pub async fn chart_svg(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.chart().markup {
        Some(markup) => Ok((
            [(header::CONTENT_TYPE, "image/svg+xml")],
            markup.clone().into_string(),
        )),
        None => Err(StatusCode::NOT_FOUND),
    }
}

pub async fn styles() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css")], styles::ALL.as_str())
}
