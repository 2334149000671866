use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use sea_orm::{ActiveModelTrait, Set};

use crate::database::Database;
use crate::entities::{self, genres::Genres};
use crate::ports::clock::{Clock, MockClock};

pub async fn test_db() -> Arc<Database> {
    Arc::new(Database::in_memory().await.unwrap())
}

/// The instant every test treats as "now".
pub fn reference_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 15)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

pub fn fixed_clock(now: NaiveDateTime) -> Arc<dyn Clock> {
    let mut clock = MockClock::new();
    clock.expect_now().return_const(now);
    Arc::new(clock)
}

pub fn days_from_now(days: i64) -> NaiveDateTime {
    reference_now() + chrono::Duration::days(days)
}

pub async fn insert_venue(
    db: &Database,
    name: &str,
    city: &str,
    state: &str,
) -> entities::venue::Model {
    let venue = entities::venue::ActiveModel {
        name: Set(name.into()),
        city: Set(city.into()),
        state: Set(state.into()),
        address: Set("1015 Folsom Street".into()),
        phone: Set("123-123-1234".into()),
        image_link: Set(entities::DEFAULT_IMAGE_LINK.into()),
        facebook_link: Set(String::new()),
        genres: Set(Genres(vec!["Jazz".into(), "Folk".into()])),
        website: Set(String::new()),
        seeking_talent: Set(false),
        seeking_description: Set(String::new()),
        ..Default::default()
    };
    venue.insert(&db.conn).await.unwrap()
}

pub async fn insert_artist(db: &Database, name: &str) -> entities::artist::Model {
    let artist = entities::artist::ActiveModel {
        name: Set(name.into()),
        city: Set("San Francisco".into()),
        state: Set("CA".into()),
        phone: Set("326-123-5000".into()),
        genres: Set(Genres(vec!["Rock n Roll".into()])),
        image_link: Set(format!("https://img.example/{}.jpg", name.to_lowercase())),
        facebook_link: Set(String::new()),
        website: Set(String::new()),
        seeking_venue: Set(false),
        seeking_description: Set(String::new()),
        ..Default::default()
    };
    artist.insert(&db.conn).await.unwrap()
}

pub async fn insert_show(
    db: &Database,
    artist_id: i64,
    venue_id: i64,
    start_time: NaiveDateTime,
) -> entities::show::Model {
    let show = entities::show::ActiveModel {
        artist_id: Set(artist_id),
        venue_id: Set(venue_id),
        start_time: Set(start_time),
        image_link: Set(entities::DEFAULT_IMAGE_LINK.into()),
        ..Default::default()
    };
    show.insert(&db.conn).await.unwrap()
}
