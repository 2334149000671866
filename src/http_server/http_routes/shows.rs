use std::sync::Arc;

use axum::{extract::State, response::Html};
use axum_extra::extract::Form;
use minijinja::context;

use super::home_with_notice;
use crate::http_server::{
    error::Report,
    forms::{Notice, ShowForm},
    state::AppState,
};

pub async fn list(State(state): State<Arc<AppState>>) -> Result<Html<String>, Report> {
    let shows = state.shows().list().await?;
    Ok(state
        .templates
        .render("pages/shows.html", context! { shows })?)
}

/// The form offers every artist and venue as a choice.
pub async fn create_form(State(state): State<Arc<AppState>>) -> Result<Html<String>, Report> {
    let artists = state.artists().list().await?;
    let areas = state.venues().list_grouped().await?;
    Ok(state
        .templates
        .render("forms/new_show.html", context! { artists, areas })?)
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ShowForm>,
) -> Result<Html<String>, Report> {
    let notice = match state.shows().create(form.into()).await {
        Ok(_) => Notice::success("Show was successfully listed!"),
        Err(_) => Notice::error("An error occurred. Show could not be listed."),
    };
    home_with_notice(&state, notice)
}
