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
    forms::{ArtistForm, Notice, SearchForm},
    state::AppState,
};
use crate::services::artist::ArtistInput;

pub async fn list(State(state): State<Arc<AppState>>) -> Result<Html<String>, Report> {
    let artists = state.artists().list().await?;
    Ok(state
        .templates
        .render("pages/artists.html", context! { artists })?)
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SearchForm>,
) -> Result<Html<String>, Report> {
    let results = state.artists().search(&form.search_term).await?;
    Ok(state.templates.render(
        "pages/search_artists.html",
        context! { results, search_term => form.search_term },
    )?)
}

pub async fn detail(
    State(state): State<Arc<AppState>>,
    Path(artist_id): Path<i64>,
) -> Result<Response, Report> {
    let Some(artist) = state.artists().detail(artist_id).await? else {
        return Ok(not_found());
    };
    Ok(state
        .templates
        .render("pages/show_artist.html", context! { artist })?
        .into_response())
}

pub async fn create_form(State(state): State<Arc<AppState>>) -> Result<Html<String>, Report> {
    Ok(state.templates.render(
        "forms/new_artist.html",
        context! { form => ArtistForm::default() },
    )?)
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ArtistForm>,
) -> Result<Html<String>, Report> {
    let input = ArtistInput::from(form);
    let name = input.name.clone();

    let notice = match state.artists().create(input).await {
        Ok(_) => Notice::success(format!("Artist {name} was successfully listed!")),
        Err(_) => Notice::error(format!(
            "An error occurred. Artist {name} could not be listed."
        )),
    };
    home_with_notice(&state, notice)
}

pub async fn edit_form(
    State(state): State<Arc<AppState>>,
    Path(artist_id): Path<i64>,
) -> Result<Response, Report> {
    let Some(artist) = state.artists().get(artist_id).await? else {
        return Ok(not_found());
    };
    Ok(state
        .templates
        .render(
            "forms/edit_artist.html",
            context! { artist_id, form => ArtistForm::from(artist) },
        )?
        .into_response())
}

pub async fn edit(
    State(state): State<Arc<AppState>>,
    Path(artist_id): Path<i64>,
    Form(form): Form<ArtistForm>,
) -> Result<Response, Report> {
    let input = ArtistInput::from(form);
    let name = input.name.clone();

    match state.artists().update(artist_id, input).await {
        Ok(_) => Ok(Redirect::to(&format!("/artists/{artist_id}")).into_response()),
        Err(err) if err.is_not_found() => Ok(not_found()),
        Err(_) => Ok(home_with_notice(
            &state,
            Notice::error(format!(
                "An error occurred. Artist {name} could not be updated."
            )),
        )?
        .into_response()),
    }
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(artist_id): Path<i64>,
) -> (StatusCode, Json<DeleteOutcome>) {
    delete_outcome("Artist", state.artists().delete(artist_id).await)
}
