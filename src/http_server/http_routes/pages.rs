use std::sync::Arc;

use axum::{extract::State, response::Html};
use minijinja::context;

use crate::http_server::{error::Report, state::AppState};

pub async fn home(State(state): State<Arc<AppState>>) -> Result<Html<String>, Report> {
    Ok(state.templates.render("pages/home.html", context! {})?)
}
