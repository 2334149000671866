//! Form bodies as browsers post them. Every field is optional on the wire and
//! defaults to empty; `genres` may repeat.

use serde::{Deserialize, Serialize};

use crate::entities::{self, genres::Genres};
use crate::services::artist::ArtistInput;
use crate::services::show::ShowInput;
use crate::services::venue::VenueInput;

/// Checkbox values browsers and the form helpers send for "on".
pub fn is_checked(value: Option<&str>) -> bool {
    matches!(
        value.map(|value| value.trim().to_ascii_lowercase()).as_deref(),
        Some("y" | "on" | "true" | "1")
    )
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchForm {
    pub search_term: String,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct VenueForm {
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: String,
    pub image_link: String,
    pub facebook_link: String,
    pub genres: Vec<String>,
    pub website_link: String,
    pub seeking_talent: Option<String>,
    pub seeking_description: String,
}

impl From<VenueForm> for VenueInput {
    fn from(form: VenueForm) -> Self {
        Self {
            seeking_talent: is_checked(form.seeking_talent.as_deref()),
            name: form.name,
            city: form.city,
            state: form.state,
            address: form.address,
            phone: form.phone,
            image_link: form.image_link,
            facebook_link: form.facebook_link,
            genres: Genres::from_form(form.genres),
            website: form.website_link,
            seeking_description: form.seeking_description,
        }
    }
}

/// Pre-fills the edit form with the stored values.
impl From<entities::venue::Model> for VenueForm {
    fn from(venue: entities::venue::Model) -> Self {
        Self {
            name: venue.name,
            city: venue.city,
            state: venue.state,
            address: venue.address,
            phone: venue.phone,
            image_link: venue.image_link,
            facebook_link: venue.facebook_link,
            genres: venue.genres.into_vec(),
            website_link: venue.website,
            seeking_talent: venue.seeking_talent.then(|| "y".to_string()),
            seeking_description: venue.seeking_description,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ArtistForm {
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub image_link: String,
    pub facebook_link: String,
    pub genres: Vec<String>,
    pub website_link: String,
    pub seeking_venue: Option<String>,
    pub seeking_description: String,
}

impl From<ArtistForm> for ArtistInput {
    fn from(form: ArtistForm) -> Self {
        Self {
            seeking_venue: is_checked(form.seeking_venue.as_deref()),
            name: form.name,
            city: form.city,
            state: form.state,
            phone: form.phone,
            genres: Genres::from_form(form.genres),
            image_link: form.image_link,
            facebook_link: form.facebook_link,
            website: form.website_link,
            seeking_description: form.seeking_description,
        }
    }
}

impl From<entities::artist::Model> for ArtistForm {
    fn from(artist: entities::artist::Model) -> Self {
        Self {
            name: artist.name,
            city: artist.city,
            state: artist.state,
            phone: artist.phone,
            image_link: artist.image_link,
            facebook_link: artist.facebook_link,
            genres: artist.genres.into_vec(),
            website_link: artist.website,
            seeking_venue: artist.seeking_venue.then(|| "y".to_string()),
            seeking_description: artist.seeking_description,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ShowForm {
    pub artist_id: String,
    pub venue_id: String,
    pub start_time: String,
    pub image_link: String,
}

impl From<ShowForm> for ShowInput {
    fn from(form: ShowForm) -> Self {
        Self {
            artist_id: form.artist_id,
            venue_id: form.venue_id,
            start_time: form.start_time,
            image_link: form.image_link,
        }
    }
}

/// Transient message shown on the home page after a write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}
