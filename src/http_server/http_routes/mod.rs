use axum::{Json, http::StatusCode, response::Html};
use minijinja::context;
use serde::Serialize;

use crate::http_server::{error::Report, forms::Notice, state::AppState};
use crate::services::error::WriteError;

pub mod artists;
pub mod pages;
pub mod shows;
pub mod venues;

/// Body of every `DELETE` response.
#[derive(Debug, Serialize)]
pub struct DeleteOutcome {
    pub success: bool,
    pub message: String,
}

/// Home page with the outcome of a create or failed edit.
pub fn home_with_notice(state: &AppState, notice: Notice) -> Result<Html<String>, Report> {
    Ok(state
        .templates
        .render("pages/home.html", context! { notice })?)
}

pub fn delete_outcome(
    kind: &str,
    result: Result<u64, WriteError>,
) -> (StatusCode, Json<DeleteOutcome>) {
    match result {
        Ok(removed_shows) => {
            let message = match removed_shows {
                0 => format!("{kind} deleted successfully!"),
                1 => format!("{kind} and 1 show deleted successfully!"),
                n => format!("{kind} and {n} shows deleted successfully!"),
            };
            (
                StatusCode::OK,
                Json(DeleteOutcome {
                    success: true,
                    message,
                }),
            )
        }
        Err(err) => {
            let status = if err.is_not_found() {
                StatusCode::NOT_FOUND
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (
                status,
                Json(DeleteOutcome {
                    success: false,
                    message: format!("An error occurred. {kind} could not be deleted."),
                }),
            )
        }
    }
}
