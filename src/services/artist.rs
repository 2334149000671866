use std::sync::Arc;

use chrono::NaiveDateTime;
use color_eyre::eyre::{Result, WrapErr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use serde::Serialize;

use crate::database::Database;
use crate::entities::{self, genres::Genres};
use crate::ports::clock::Clock;
use crate::services::aggregation::{
    SearchResults, ShowPartition, VenueAppearance, summarize, upcoming_counts,
};
use crate::services::error::{WriteError, WriteFailure, WriteOp};
use crate::services::image_link_or_default;
use crate::services::search::{apply_text_search, name_matches};

const ENTITY: &str = "artist";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtistInput {
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub genres: Genres,
    pub image_link: String,
    pub facebook_link: String,
    pub website: String,
    pub seeking_venue: bool,
    pub seeking_description: String,
}

impl ArtistInput {
    fn apply_to(self, model: &mut entities::artist::ActiveModel) {
        model.name = Set(self.name);
        model.city = Set(self.city);
        model.state = Set(self.state);
        model.phone = Set(self.phone);
        model.genres = Set(self.genres);
        model.image_link = Set(image_link_or_default(self.image_link));
        model.facebook_link = Set(self.facebook_link);
        model.website = Set(self.website);
        model.seeking_venue = Set(self.seeking_venue);
        model.seeking_description = Set(self.seeking_description);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistListItem {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistDetail {
    pub id: i64,
    pub name: String,
    pub genres: Vec<String>,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub website: String,
    pub facebook_link: String,
    pub seeking_venue: bool,
    pub seeking_description: String,
    pub image_link: String,
    pub past_shows: Vec<VenueAppearance>,
    pub upcoming_shows: Vec<VenueAppearance>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

impl ArtistDetail {
    fn new(artist: entities::artist::Model, shows: ShowPartition<VenueAppearance>) -> Self {
        Self {
            id: artist.id,
            name: artist.name,
            genres: artist.genres.into_vec(),
            city: artist.city,
            state: artist.state,
            phone: artist.phone,
            website: artist.website,
            facebook_link: artist.facebook_link,
            seeking_venue: artist.seeking_venue,
            seeking_description: artist.seeking_description,
            image_link: artist.image_link,
            past_shows_count: shows.past_count(),
            upcoming_shows_count: shows.upcoming_count(),
            past_shows: shows.past,
            upcoming_shows: shows.upcoming,
        }
    }
}

pub struct ArtistService {
    db: Arc<Database>,
    clock: Arc<dyn Clock>,
}

impl ArtistService {
    pub fn new(db: Arc<Database>, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    pub async fn list(&self) -> Result<Vec<ArtistListItem>> {
        let artists = entities::artist::Entity::find()
            .order_by_asc(entities::artist::Column::Id)
            .all(&self.db.conn)
            .await
            .wrap_err("Failed to fetch artists")?;

        Ok(artists
            .into_iter()
            .map(|artist| ArtistListItem {
                id: artist.id,
                name: artist.name,
            })
            .collect())
    }

    /// Artists whose name contains `term`, ignoring case, with their own upcoming show counts.
    pub async fn search(&self, term: &str) -> Result<SearchResults> {
        let now = self.clock.now();
        let txn = self
            .db
            .conn
            .begin()
            .await
            .wrap_err("Failed to begin read transaction")?;

        let mut artists = apply_text_search(
            entities::artist::Entity::find(),
            entities::artist::Column::Name,
            term,
        )
        .order_by_asc(entities::artist::Column::Id)
        .all(&txn)
        .await
        .wrap_err("Failed to search artists")?;
        artists.retain(|artist| name_matches(&artist.name, term));

        let ids: Vec<i64> = artists.iter().map(|artist| artist.id).collect();
        let show_times: Vec<(i64, NaiveDateTime)> = entities::show::Entity::find()
            .select_only()
            .columns([
                entities::show::Column::ArtistId,
                entities::show::Column::StartTime,
            ])
            .filter(entities::show::Column::ArtistId.is_in(ids))
            .into_tuple()
            .all(&txn)
            .await
            .wrap_err("Failed to fetch show times for matched artists")?;

        txn.commit()
            .await
            .wrap_err("Failed to commit read transaction")?;

        let counts = upcoming_counts(show_times, now);
        let data: Vec<_> = artists
            .into_iter()
            .map(|artist| summarize(artist.id, artist.name, &counts))
            .collect();

        tracing::debug!("Artist search {:?} matched {} artists", term, data.len());
        Ok(SearchResults::from(data))
    }

    pub async fn get(&self, id: i64) -> Result<Option<entities::artist::Model>> {
        entities::artist::Entity::find_by_id(id)
            .one(&self.db.conn)
            .await
            .wrap_err_with(|| format!("Failed to fetch artist {id}"))
    }

    pub async fn detail(&self, id: i64) -> Result<Option<ArtistDetail>> {
        let now = self.clock.now();
        let txn = self
            .db
            .conn
            .begin()
            .await
            .wrap_err("Failed to begin read transaction")?;

        let Some(artist) = entities::artist::Entity::find_by_id(id)
            .one(&txn)
            .await
            .wrap_err_with(|| format!("Failed to fetch artist {id}"))?
        else {
            return Ok(None);
        };

        let shows = entities::show::Entity::find()
            .filter(entities::show::Column::ArtistId.eq(id))
            .order_by_asc(entities::show::Column::StartTime)
            .find_also_related(entities::venue::Entity)
            .all(&txn)
            .await
            .wrap_err_with(|| format!("Failed to fetch shows for artist {id}"))?;

        txn.commit()
            .await
            .wrap_err("Failed to commit read transaction")?;

        let appearances = shows.into_iter().filter_map(|(show, venue)| {
            let Some(venue) = venue else {
                tracing::warn!("Show {} references missing venue {}", show.id, show.venue_id);
                return None;
            };
            Some((
                show.start_time,
                VenueAppearance {
                    venue_id: venue.id,
                    venue_name: venue.name,
                    venue_image_link: venue.image_link,
                    start_time: show.start_time,
                },
            ))
        });

        Ok(Some(ArtistDetail::new(
            artist,
            ShowPartition::split(appearances, now),
        )))
    }

    pub async fn create(
        &self,
        input: ArtistInput,
    ) -> Result<entities::artist::Model, WriteError> {
        let mut model = <entities::artist::ActiveModel as ActiveModelTrait>::default();
        input.apply_to(&mut model);

        let artist = self
            .db
            .conn
            .transaction::<_, entities::artist::Model, WriteFailure>(move |txn| {
                Box::pin(async move { Ok(model.insert(txn).await?) })
            })
            .await
            .map_err(|err| {
                let err = WriteError::from_transaction(WriteOp::Create, ENTITY, err);
                tracing::warn!("{err}");
                err
            })?;

        tracing::info!("Artist created: '{}' (ID: {})", artist.name, artist.id);
        Ok(artist)
    }

    pub async fn update(
        &self,
        id: i64,
        input: ArtistInput,
    ) -> Result<entities::artist::Model, WriteError> {
        let artist = self
            .db
            .conn
            .transaction::<_, entities::artist::Model, WriteFailure>(move |txn| {
                Box::pin(async move {
                    let existing = entities::artist::Entity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or(WriteFailure::NotFound { entity: ENTITY, id })?;

                    let mut model: entities::artist::ActiveModel = existing.into();
                    input.apply_to(&mut model);
                    Ok(model.update(txn).await?)
                })
            })
            .await
            .map_err(|err| {
                let err = WriteError::from_transaction(WriteOp::Update, ENTITY, err);
                tracing::warn!("{err}");
                err
            })?;

        tracing::info!("Artist updated: '{}' (ID: {})", artist.name, artist.id);
        Ok(artist)
    }

    /// Deletes the artist and every show they play. Returns the number of shows removed.
    pub async fn delete(&self, id: i64) -> Result<u64, WriteError> {
        let removed_shows = self
            .db
            .conn
            .transaction::<_, u64, WriteFailure>(move |txn| {
                Box::pin(async move {
                    entities::artist::Entity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or(WriteFailure::NotFound { entity: ENTITY, id })?;

                    let shows = entities::show::Entity::delete_many()
                        .filter(entities::show::Column::ArtistId.eq(id))
                        .exec(txn)
                        .await?;

                    entities::artist_venue::Entity::delete_many()
                        .filter(entities::artist_venue::Column::ArtistId.eq(id))
                        .exec(txn)
                        .await?;

                    entities::artist::Entity::delete_by_id(id).exec(txn).await?;

                    Ok(shows.rows_affected)
                })
            })
            .await
            .map_err(|err| {
                let err = WriteError::from_transaction(WriteOp::Delete, ENTITY, err);
                tracing::warn!("{err}");
                err
            })?;

        tracing::info!("Artist {} deleted along with {} shows", id, removed_shows);
        Ok(removed_shows)
    }
}
