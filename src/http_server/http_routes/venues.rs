use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::Form;
use minijinja::context;

use super::{DeleteOutcome, delete_outcome, home_with_notice};
use crate::http_server::{
    error::{Report, not_found},
    forms::{Notice, SearchForm, VenueForm},
    state::AppState,
};
use crate::services::venue::VenueInput;

pub async fn list(State(state): State<Arc<AppState>>) -> Result<Html<String>, Report> {
    let areas = state.venues().list_grouped().await?;
    Ok(state
        .templates
        .render("pages/venues.html", context! { areas })?)
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SearchForm>,
) -> Result<Html<String>, Report> {
    let results = state.venues().search(&form.search_term).await?;
    Ok(state.templates.render(
        "pages/search_venues.html",
        context! { results, search_term => form.search_term },
    )?)
}

pub async fn detail(
    State(state): State<Arc<AppState>>,
    Path(venue_id): Path<i64>,
) -> Result<Response, Report> {
    let Some(venue) = state.venues().detail(venue_id).await? else {
        return Ok(not_found());
    };
    Ok(state
        .templates
        .render("pages/show_venue.html", context! { venue })?
        .into_response())
}

pub async fn create_form(State(state): State<Arc<AppState>>) -> Result<Html<String>, Report> {
    Ok(state.templates.render(
        "forms/new_venue.html",
        context! { form => VenueForm::default() },
    )?)
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Form(form): Form<VenueForm>,
) -> Result<Html<String>, Report> {
    let input = VenueInput::from(form);
    let name = input.name.clone();

    let notice = match state.venues().create(input).await {
        Ok(_) => Notice::success(format!("Venue {name} was successfully listed!")),
        Err(_) => Notice::error(format!(
            "An error occurred. Venue {name} could not be listed."
        )),
    };
    home_with_notice(&state, notice)
}

pub async fn edit_form(
    State(state): State<Arc<AppState>>,
    Path(venue_id): Path<i64>,
) -> Result<Response, Report> {
    let Some(venue) = state.venues().get(venue_id).await? else {
        return Ok(not_found());
    };
    Ok(state
        .templates
        .render(
            "forms/edit_venue.html",
            context! { venue_id, form => VenueForm::from(venue) },
        )?
        .into_response())
}

pub async fn edit(
    State(state): State<Arc<AppState>>,
    Path(venue_id): Path<i64>,
    Form(form): Form<VenueForm>,
) -> Result<Response, Report> {
    let input = VenueInput::from(form);
    let name = input.name.clone();

    match state.venues().update(venue_id, input).await {
        Ok(_) => Ok(Redirect::to(&format!("/venues/{venue_id}")).into_response()),
        Err(err) if err.is_not_found() => Ok(not_found()),
        Err(_) => Ok(home_with_notice(
            &state,
            Notice::error(format!(
                "An error occurred. Venue {name} could not be updated."
            )),
        )?
        .into_response()),
    }
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(venue_id): Path<i64>,
) -> (StatusCode, Json<DeleteOutcome>) {
    delete_outcome("Venue", state.venues().delete(venue_id).await)
}
