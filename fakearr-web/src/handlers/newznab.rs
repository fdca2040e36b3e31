//! Newznab `/api` handler

use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use fakearr_core::newznab::NEWZNAB_CONTENT_TYPE;
use fakearr_core::{NewznabFunction, SearchQuery};
use serde::Deserialize;

use crate::error::WebError;
use crate::server::AppState;

/// Query parameters of a Newznab API call. Unknown parameters such as
/// `apikey`, `cat` or `limit` are accepted and ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ApiQuery {
    /// API function: `caps`, `search`, `movie` or `tvsearch`
    pub t: Option<String>,
    pub q: Option<String>,
    pub imdbid: Option<String>,
    pub season: Option<String>,
    pub ep: Option<String>,
}

impl From<ApiQuery> for SearchQuery {
    fn from(query: ApiQuery) -> Self {
        // Clients send empty values for parameters they do not use
        let present = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        SearchQuery {
            q: present(query.q),
            imdbid: present(query.imdbid),
            season: present(query.season),
            episode: present(query.ep),
        }
    }
}

/// Answers `GET /api?t=...`.
///
/// # Errors
/// - `WebError` - Unknown function (400) or document rendering failed (500)
pub async fn newznab_api(
    State(state): State<AppState>,
    Query(query): Query<ApiQuery>,
) -> Result<Response, WebError> {
    let function = NewznabFunction::parse(query.t.as_deref())?;
    tracing::debug!("Newznab call {:?}: {:?}", function, query);

    let body = state.newznab.respond(function, &SearchQuery::from(query))?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, NEWZNAB_CONTENT_TYPE)],
        body,
    )
        .into_response())
}
