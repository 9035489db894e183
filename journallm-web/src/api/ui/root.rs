//! Root page handler - upload form

use axum::{
    extract::State,
    response::{Html, IntoResponse},
};
use journallm_common::format::{accepted_extensions_list, ACCEPTED_EXTENSIONS};

use super::page_header;
use crate::AppState;

/// GET /
///
/// Upload form. Extension and size are checked in the browser before
/// upload, then `/status/{id}` is polled every 2 s until the job ends.
pub async fn root_page(State(state): State<AppState>) -> impl IntoResponse {
    let max_mib = state.max_upload_bytes / (1024 * 1024);

    // Ask for a key only when the server has none configured
    let key_field = if state.runner.has_server_key() {
        String::new()
    } else {
        r#"<label for="api_key">Anthropic API key</label>
            <input type="password" id="api_key" name="api_key" autocomplete="off" required>
            <p class="hint">Used for this report only and never stored.</p>"#
            .to_string()
    };

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>JournalLM</title>
    <link rel="stylesheet" href="/static/journallm.css">
</head>
<body>
    {header}
    <div class="container">
        <div class="card">
            <h2>Upload your journal</h2>
            <p class="hint">Accepted: {accepted_list}. Maximum size: {max_mib} MB.</p>
            <form id="upload-form" data-accepted="{accepted}" data-max-bytes="{max_bytes}">
                <label for="file">Journal export</label>
                <input type="file" id="file" name="file" accept="{accept_attr}" required>
                {key_field}
                <button type="submit" id="submit">Get advice</button>
            </form>
            <div id="message" class="message"></div>
        </div>
    </div>
    <script src="/static/upload.js"></script>
</body>
</html>"#,
        header = page_header(),
        accepted_list = accepted_extensions_list(),
        accepted = ACCEPTED_EXTENSIONS.join(","),
        accept_attr = accepted_extensions_list().replace(' ', ""),
        max_bytes = state.max_upload_bytes,
        max_mib = max_mib,
        key_field = key_field,
    );

    Html(html)
}
