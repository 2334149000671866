use axum::response::Html;
use color_eyre::eyre::{Result, WrapErr};
use minijinja::{Environment, Error, ErrorKind};
use serde::Serialize;

use crate::services::show::parse_start_time;

macro_rules! embedded {
    ($($name:literal),+ $(,)?) => {
        &[$(($name, include_str!(concat!("../../templates/", $name)))),+]
    };
}

const TEMPLATES: &[(&str, &str)] = embedded![
    "layouts/main.html",
    "pages/home.html",
    "pages/venues.html",
    "pages/artists.html",
    "pages/shows.html",
    "pages/search_venues.html",
    "pages/search_artists.html",
    "pages/show_venue.html",
    "pages/show_artist.html",
    "forms/new_venue.html",
    "forms/edit_venue.html",
    "forms/new_artist.html",
    "forms/edit_artist.html",
    "forms/new_show.html",
    "forms/venue_fields.html",
    "forms/artist_fields.html",
];

/// Compiled page templates. Names ending in `.html` are auto-escaped.
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_filter("datetime", format_datetime);

        for &(name, source) in TEMPLATES {
            env.add_template(name, source)
                .wrap_err_with(|| format!("Failed to compile template {name}"))?;
        }

        Ok(Self { env })
    }

    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<Html<String>> {
        let template = self
            .env
            .get_template(name)
            .wrap_err_with(|| format!("Unknown template {name}"))?;
        let body = template
            .render(ctx)
            .wrap_err_with(|| format!("Failed to render template {name}"))?;
        Ok(Html(body))
    }
}

/// `{{ show.start_time | datetime("full") }}`; the format defaults to `medium`.
fn format_datetime(value: String, format: Option<String>) -> Result<String, Error> {
    let start_time = parse_start_time(&value).ok_or_else(|| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("not a date-time: {value}"),
        )
    })?;

    let pattern = match format.as_deref().unwrap_or("medium") {
        "full" => "%A %B, %-d, %Y at %-I:%M%p",
        "medium" => "%a %m, %d, %Y %-I:%M%p",
        other => {
            return Err(Error::new(
                ErrorKind::InvalidOperation,
                format!("unknown date-time format: {other}"),
            ));
        }
    };

    Ok(start_time.format(pattern).to_string())
}
