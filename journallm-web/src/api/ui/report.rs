//! Report page handler

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};
use uuid::Uuid;

use super::page_header;
use crate::AppState;

/// URL schemes a rendered link or image may not point at
const BLOCKED_SCHEMES: &[&str] = &["javascript:", "vbscript:", "data:"];

/// GET /report/{job_id}
///
/// Shows a finished report. Unknown or unfinished jobs go back to `/`.
pub async fn report_page(State(state): State<AppState>, Path(job_id): Path<String>) -> Response {
    let job = match Uuid::parse_str(&job_id) {
        Ok(id) => state.jobs.get(id).await,
        Err(_) => None,
    };

    let Some((job, report)) = job.and_then(|job| {
        let report = job.report.clone()?;
        Some((job, report))
    }) else {
        tracing::debug!(job_id = %job_id, "Report not available, redirecting to upload page");
        return Redirect::to("/").into_response();
    };

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>JournalLM Advice</title>
    <link rel="stylesheet" href="/static/journallm.css">
</head>
<body>
    {header}
    <div class="container">
        <div class="card report">
{report}
        </div>
        <a class="button" href="/download/{id}">Download markdown</a>
        <a class="button" href="/">Analyze another journal</a>
    </div>
</body>
</html>"#,
        header = page_header(),
        report = render_markdown(&report),
        id = job.id,
    );

    Html(html).into_response()
}

/// Render report markdown to HTML
///
/// Tables and fenced code blocks are enabled. Raw HTML in the source is
/// emitted as escaped text and script-capable link targets are dropped.
pub fn render_markdown(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let events = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events);
    out
}

fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    let lowered = url.trim_start().to_ascii_lowercase();
    if BLOCKED_SCHEMES.iter().any(|scheme| lowered.starts_with(scheme)) {
        CowStr::Borrowed("#")
    } else {
        url
    }
}
