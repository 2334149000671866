use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDateTime;
use color_eyre::eyre::{Result, WrapErr};
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set, TransactionTrait};
use serde::Serialize;

use crate::database::Database;
use crate::entities;
use crate::services::error::{WriteError, WriteFailure, WriteOp};
use crate::services::image_link_or_default;

const ENTITY: &str = "show";

/// Formats accepted for a show's start time, tried in order.
const START_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

pub fn parse_start_time(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    START_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

/// Raw show form values. Ids and time are parsed by [`ShowService::create`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShowInput {
    pub artist_id: String,
    pub venue_id: String,
    pub start_time: String,
    pub image_link: String,
}

struct NewShow {
    artist_id: i64,
    venue_id: i64,
    start_time: NaiveDateTime,
    image_link: String,
}

impl TryFrom<ShowInput> for NewShow {
    type Error = WriteFailure;

    fn try_from(input: ShowInput) -> Result<Self, Self::Error> {
        let artist_id = parse_id("artist_id", &input.artist_id)?;
        let venue_id = parse_id("venue_id", &input.venue_id)?;
        let start_time =
            parse_start_time(&input.start_time).ok_or_else(|| WriteFailure::Invalid {
                field: "start_time",
                value: input.start_time.clone(),
            })?;

        Ok(Self {
            artist_id,
            venue_id,
            start_time,
            image_link: image_link_or_default(input.image_link),
        })
    }
}

fn parse_id(field: &'static str, value: &str) -> Result<i64, WriteFailure> {
    value
        .trim()
        .parse()
        .map_err(|_| WriteFailure::Invalid {
            field,
            value: value.to_string(),
        })
}

/// One row of the show listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShowListing {
    pub venue_id: i64,
    pub venue_name: String,
    pub artist_id: i64,
    pub artist_name: String,
    pub artist_image_link: String,
    pub start_time: NaiveDateTime,
}

pub struct ShowService {
    db: Arc<Database>,
}

impl ShowService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Every show with its venue and artist, earliest first.
    pub async fn list(&self) -> Result<Vec<ShowListing>> {
        let txn = self
            .db
            .conn
            .begin()
            .await
            .wrap_err("Failed to begin read transaction")?;

        let shows = entities::show::Entity::find()
            .order_by_asc(entities::show::Column::StartTime)
            .order_by_asc(entities::show::Column::Id)
            .find_also_related(entities::artist::Entity)
            .all(&txn)
            .await
            .wrap_err("Failed to fetch shows")?;

        let venues: HashMap<i64, entities::venue::Model> = entities::venue::Entity::find()
            .all(&txn)
            .await
            .wrap_err("Failed to fetch venues")?
            .into_iter()
            .map(|venue| (venue.id, venue))
            .collect();

        txn.commit()
            .await
            .wrap_err("Failed to commit read transaction")?;

        Ok(shows
            .into_iter()
            .filter_map(|(show, artist)| {
                let (Some(artist), Some(venue)) = (artist, venues.get(&show.venue_id)) else {
                    tracing::warn!("Show {} has a dangling artist or venue reference", show.id);
                    return None;
                };
                Some(ShowListing {
                    venue_id: venue.id,
                    venue_name: venue.name.clone(),
                    artist_id: artist.id,
                    artist_name: artist.name,
                    artist_image_link: artist.image_link,
                    start_time: show.start_time,
                })
            })
            .collect())
    }

    /// Lists a new show. Both referenced rows must exist when the transaction runs.
    pub async fn create(&self, input: ShowInput) -> Result<entities::show::Model, WriteError> {
        let new_show = NewShow::try_from(input).map_err(|failure| {
            let err = WriteError::new(WriteOp::Create, ENTITY, failure);
            tracing::warn!("{err}");
            err
        })?;

        let show = self
            .db
            .conn
            .transaction::<_, entities::show::Model, WriteFailure>(move |txn| {
                Box::pin(async move {
                    entities::artist::Entity::find_by_id(new_show.artist_id)
                        .one(txn)
                        .await?
                        .ok_or(WriteFailure::NotFound {
                            entity: "artist",
                            id: new_show.artist_id,
                        })?;

                    entities::venue::Entity::find_by_id(new_show.venue_id)
                        .one(txn)
                        .await?
                        .ok_or(WriteFailure::NotFound {
                            entity: "venue",
                            id: new_show.venue_id,
                        })?;

                    let model = entities::show::ActiveModel {
                        artist_id: Set(new_show.artist_id),
                        venue_id: Set(new_show.venue_id),
                        start_time: Set(new_show.start_time),
                        image_link: Set(new_show.image_link),
                        ..Default::default()
                    };
                    Ok(model.insert(txn).await?)
                })
            })
            .await
            .map_err(|err| {
                let err = WriteError::from_transaction(WriteOp::Create, ENTITY, err);
                tracing::warn!("{err}");
                err
            })?;

        tracing::info!(
            "Show created: artist {} at venue {} on {} (ID: {})",
            show.artist_id,
            show.venue_id,
            show.start_time,
            show.id
        );
        Ok(show)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::clock::Clock;
    use crate::services::venue::VenueService;
    use crate::test_utils::{
        days_from_now, fixed_clock, insert_artist, insert_show, insert_venue, reference_now,
        test_db,
    };
    use chrono::NaiveDate;
    use sea_orm::PaginatorTrait;

    fn input(artist_id: i64, venue_id: i64, start_time: &str) -> ShowInput {
        ShowInput {
            artist_id: artist_id.to_string(),
            venue_id: venue_id.to_string(),
            start_time: start_time.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn parses_form_and_datetime_local_formats() {
        let expected = NaiveDate::from_ymd_opt(2035, 4, 1)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap();

        assert_eq!(parse_start_time("2035-04-01 20:00:00"), Some(expected));
        assert_eq!(parse_start_time("2035-04-01 20:00"), Some(expected));
        assert_eq!(parse_start_time("2035-04-01T20:00"), Some(expected));
        assert_eq!(parse_start_time(" 2035-04-01T20:00:00 "), Some(expected));
        assert_eq!(parse_start_time("next friday"), None);
        assert_eq!(parse_start_time(""), None);
    }

    #[tokio::test]
    async fn test_created_past_show_lands_in_past_bucket() {
        let db = test_db().await;
        let venue = insert_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        let artist = insert_artist(&db, "Guns N Petals").await;

        let service = ShowService::new(db.clone());
        let show = service
            .create(input(artist.id, venue.id, "2019-05-21 21:30:00"))
            .await
            .unwrap();
        assert_eq!(show.image_link, entities::DEFAULT_IMAGE_LINK);

        let clock: Arc<dyn Clock> = fixed_clock(reference_now());
        let detail = VenueService::new(db, clock)
            .detail(venue.id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(detail.past_shows_count, 1);
        assert_eq!(detail.upcoming_shows_count, 0);
        assert_eq!(detail.past_shows[0].artist_id, artist.id);
    }

    #[tokio::test]
    async fn test_create_with_missing_artist_stores_nothing() {
        let db = test_db().await;
        let venue = insert_venue(&db, "The Musical Hop", "San Francisco", "CA").await;

        let err = ShowService::new(db.clone())
            .create(input(404, venue.id, "2035-04-01 20:00:00"))
            .await
            .unwrap_err();

        assert_eq!(err.op, WriteOp::Create);
        assert!(matches!(
            err.failure,
            WriteFailure::NotFound {
                entity: "artist",
                id: 404
            }
        ));
        let count = entities::show::Entity::find().count(&db.conn).await.unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_create_with_unparseable_fields_is_invalid() {
        let db = test_db().await;
        let service = ShowService::new(db.clone());

        let err = service
            .create(ShowInput {
                artist_id: String::new(),
                venue_id: "1".into(),
                start_time: "2035-04-01 20:00:00".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.failure,
            WriteFailure::Invalid {
                field: "artist_id",
                ..
            }
        ));

        let err = service.create(input(1, 1, "soon")).await.unwrap_err();
        assert!(matches!(
            err.failure,
            WriteFailure::Invalid {
                field: "start_time",
                ..
            }
        ));

        let count = entities::show::Entity::find().count(&db.conn).await.unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_list_flattens_names_in_start_order() {
        let db = test_db().await;
        let hop = insert_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        let park = insert_venue(&db, "Park Square Live", "San Francisco", "CA").await;
        let petals = insert_artist(&db, "Guns N Petals").await;
        let quevedo = insert_artist(&db, "Matt Quevedo").await;

        insert_show(&db, quevedo.id, park.id, days_from_now(9)).await;
        insert_show(&db, petals.id, hop.id, days_from_now(-9)).await;

        let shows = ShowService::new(db).list().await.unwrap();

        assert_eq!(shows.len(), 2);
        assert_eq!(shows[0].venue_name, "The Musical Hop");
        assert_eq!(shows[0].artist_name, "Guns N Petals");
        assert_eq!(shows[0].artist_image_link, petals.image_link);
        assert_eq!(shows[1].venue_id, park.id);
        assert_eq!(shows[1].artist_id, quevedo.id);
        assert_eq!(shows[1].start_time, days_from_now(9));
    }
}
