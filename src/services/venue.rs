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
    ArtistAppearance, LocalityGroup, SearchResults, ShowPartition, group_by_locality, summarize,
    upcoming_counts,
};
use crate::services::error::{WriteError, WriteFailure, WriteOp};
use crate::services::image_link_or_default;
use crate::services::search::{apply_text_search, name_matches};

const ENTITY: &str = "venue";

/// Venue fields accepted by the create and edit forms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VenueInput {
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: String,
    pub image_link: String,
    pub facebook_link: String,
    pub genres: Genres,
    pub website: String,
    pub seeking_talent: bool,
    pub seeking_description: String,
}

impl VenueInput {
    fn apply_to(self, model: &mut entities::venue::ActiveModel) {
        model.name = Set(self.name);
        model.city = Set(self.city);
        model.state = Set(self.state);
        model.address = Set(self.address);
        model.phone = Set(self.phone);
        model.image_link = Set(image_link_or_default(self.image_link));
        model.facebook_link = Set(self.facebook_link);
        model.genres = Set(self.genres);
        model.website = Set(self.website);
        model.seeking_talent = Set(self.seeking_talent);
        model.seeking_description = Set(self.seeking_description);
    }
}

/// Everything the venue page renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VenueDetail {
    pub id: i64,
    pub name: String,
    pub genres: Vec<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub website: String,
    pub facebook_link: String,
    pub seeking_talent: bool,
    pub seeking_description: String,
    pub image_link: String,
    pub past_shows: Vec<ArtistAppearance>,
    pub upcoming_shows: Vec<ArtistAppearance>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

impl VenueDetail {
    fn new(venue: entities::venue::Model, shows: ShowPartition<ArtistAppearance>) -> Self {
        Self {
            id: venue.id,
            name: venue.name,
            genres: venue.genres.into_vec(),
            address: venue.address,
            city: venue.city,
            state: venue.state,
            phone: venue.phone,
            website: venue.website,
            facebook_link: venue.facebook_link,
            seeking_talent: venue.seeking_talent,
            seeking_description: venue.seeking_description,
            image_link: venue.image_link,
            past_shows_count: shows.past_count(),
            upcoming_shows_count: shows.upcoming_count(),
            past_shows: shows.past,
            upcoming_shows: shows.upcoming,
        }
    }
}

pub struct VenueService {
    db: Arc<Database>,
    clock: Arc<dyn Clock>,
}

impl VenueService {
    pub fn new(db: Arc<Database>, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// All venues grouped by `(city, state)`, each with its upcoming show count.
    pub async fn list_grouped(&self) -> Result<Vec<LocalityGroup>> {
        let now = self.clock.now();
        let txn = self
            .db
            .conn
            .begin()
            .await
            .wrap_err("Failed to begin read transaction")?;

        let venues = entities::venue::Entity::find()
            .order_by_asc(entities::venue::Column::Id)
            .all(&txn)
            .await
            .wrap_err("Failed to fetch venues")?;

        let show_times: Vec<(i64, NaiveDateTime)> = entities::show::Entity::find()
            .select_only()
            .columns([
                entities::show::Column::VenueId,
                entities::show::Column::StartTime,
            ])
            .into_tuple()
            .all(&txn)
            .await
            .wrap_err("Failed to fetch show times")?;

        txn.commit()
            .await
            .wrap_err("Failed to commit read transaction")?;

        let counts = upcoming_counts(show_times, now);
        Ok(group_by_locality(venues, &counts))
    }

    /// Venues whose name contains `term`, ignoring case.
    pub async fn search(&self, term: &str) -> Result<SearchResults> {
        let now = self.clock.now();
        let txn = self
            .db
            .conn
            .begin()
            .await
            .wrap_err("Failed to begin read transaction")?;

        let mut venues = apply_text_search(
            entities::venue::Entity::find(),
            entities::venue::Column::Name,
            term,
        )
        .order_by_asc(entities::venue::Column::Id)
        .all(&txn)
        .await
        .wrap_err("Failed to search venues")?;
        venues.retain(|venue| name_matches(&venue.name, term));

        let ids: Vec<i64> = venues.iter().map(|venue| venue.id).collect();
        let show_times: Vec<(i64, NaiveDateTime)> = entities::show::Entity::find()
            .select_only()
            .columns([
                entities::show::Column::VenueId,
                entities::show::Column::StartTime,
            ])
            .filter(entities::show::Column::VenueId.is_in(ids))
            .into_tuple()
            .all(&txn)
            .await
            .wrap_err("Failed to fetch show times for matched venues")?;

        txn.commit()
            .await
            .wrap_err("Failed to commit read transaction")?;

        let counts = upcoming_counts(show_times, now);
        let data: Vec<_> = venues
            .into_iter()
            .map(|venue| summarize(venue.id, venue.name, &counts))
            .collect();

        tracing::debug!("Venue search {:?} matched {} venues", term, data.len());
        Ok(SearchResults::from(data))
    }

    pub async fn get(&self, id: i64) -> Result<Option<entities::venue::Model>> {
        entities::venue::Entity::find_by_id(id)
            .one(&self.db.conn)
            .await
            .wrap_err_with(|| format!("Failed to fetch venue {id}"))
    }

    /// The venue with its shows split into past and upcoming.
    ///
    /// Shows are selected by the venue foreign key and loaded together with their
    /// artists in one query, so both lists and both counts describe the same rows.
    pub async fn detail(&self, id: i64) -> Result<Option<VenueDetail>> {
        let now = self.clock.now();
        let txn = self
            .db
            .conn
            .begin()
            .await
            .wrap_err("Failed to begin read transaction")?;

        let Some(venue) = entities::venue::Entity::find_by_id(id)
            .one(&txn)
            .await
            .wrap_err_with(|| format!("Failed to fetch venue {id}"))?
        else {
            return Ok(None);
        };

        let shows = entities::show::Entity::find()
            .filter(entities::show::Column::VenueId.eq(id))
            .order_by_asc(entities::show::Column::StartTime)
            .find_also_related(entities::artist::Entity)
            .all(&txn)
            .await
            .wrap_err_with(|| format!("Failed to fetch shows for venue {id}"))?;

        txn.commit()
            .await
            .wrap_err("Failed to commit read transaction")?;

        let appearances = shows.into_iter().filter_map(|(show, artist)| {
            let Some(artist) = artist else {
                tracing::warn!("Show {} references missing artist {}", show.id, show.artist_id);
                return None;
            };
            Some((
                show.start_time,
                ArtistAppearance {
                    artist_id: artist.id,
                    artist_name: artist.name,
                    artist_image_link: artist.image_link,
                    start_time: show.start_time,
                },
            ))
        });

        Ok(Some(VenueDetail::new(
            venue,
            ShowPartition::split(appearances, now),
        )))
    }

    pub async fn create(
        &self,
        input: VenueInput,
    ) -> Result<entities::venue::Model, WriteError> {
        let mut model = <entities::venue::ActiveModel as ActiveModelTrait>::default();
        input.apply_to(&mut model);

        let venue = self
            .db
            .conn
            .transaction::<_, entities::venue::Model, WriteFailure>(move |txn| {
                Box::pin(async move { Ok(model.insert(txn).await?) })
            })
            .await
            .map_err(|err| {
                let err = WriteError::from_transaction(WriteOp::Create, ENTITY, err);
                tracing::warn!("{err}");
                err
            })?;

        tracing::info!("Venue created: '{}' (ID: {})", venue.name, venue.id);
        Ok(venue)
    }

    pub async fn update(
        &self,
        id: i64,
        input: VenueInput,
    ) -> Result<entities::venue::Model, WriteError> {
        let venue = self
            .db
            .conn
            .transaction::<_, entities::venue::Model, WriteFailure>(move |txn| {
                Box::pin(async move {
                    let existing = entities::venue::Entity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or(WriteFailure::NotFound { entity: ENTITY, id })?;

                    let mut model: entities::venue::ActiveModel = existing.into();
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

        tracing::info!("Venue updated: '{}' (ID: {})", venue.name, venue.id);
        Ok(venue)
    }

    /// Deletes the venue together with every show it hosts. Returns the number of shows removed.
    pub async fn delete(&self, id: i64) -> Result<u64, WriteError> {
        let removed_shows = self
            .db
            .conn
            .transaction::<_, u64, WriteFailure>(move |txn| {
                Box::pin(async move {
                    entities::venue::Entity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or(WriteFailure::NotFound { entity: ENTITY, id })?;

                    let shows = entities::show::Entity::delete_many()
                        .filter(entities::show::Column::VenueId.eq(id))
                        .exec(txn)
                        .await?;

                    entities::artist_venue::Entity::delete_many()
                        .filter(entities::artist_venue::Column::VenueId.eq(id))
                        .exec(txn)
                        .await?;

                    entities::venue::Entity::delete_by_id(id).exec(txn).await?;

                    Ok(shows.rows_affected)
                })
            })
            .await
            .map_err(|err| {
                let err = WriteError::from_transaction(WriteOp::Delete, ENTITY, err);
                tracing::warn!("{err}");
                err
            })?;

        tracing::info!("Venue {} deleted along with {} shows", id, removed_shows);
        Ok(removed_shows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{
        days_from_now, fixed_clock, insert_artist, insert_show, insert_venue, reference_now,
        test_db,
    };
    use sea_orm::{ConnectionTrait, PaginatorTrait};

    fn service(db: Arc<Database>) -> VenueService {
        VenueService::new(db, fixed_clock(reference_now()))
    }

    fn hall_a() -> VenueInput {
        VenueInput {
            name: "Hall A".into(),
            city: "Austin".into(),
            state: "TX".into(),
            genres: Genres(vec!["Jazz".into(), "Rock".into()]),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_venue_round_trips_genres_and_groups() {
        let db = test_db().await;
        let service = service(db.clone());

        let venue = service.create(hall_a()).await.unwrap();
        let stored = service.get(venue.id).await.unwrap().unwrap();
        assert_eq!(stored.genres.0, ["Jazz", "Rock"]);
        assert_eq!(stored.image_link, entities::DEFAULT_IMAGE_LINK);

        let groups = service.list_grouped().await.unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].city, "Austin");
        assert_eq!(groups[0].state, "TX");
        assert_eq!(groups[0].venues[0].name, "Hall A");
    }

    #[tokio::test]
    async fn test_list_grouped_counts_upcoming_shows_per_venue() {
        let db = test_db().await;
        let hop = insert_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        let pianos = insert_venue(&db, "The Dueling Pianos Bar", "New York", "NY").await;
        let park = insert_venue(&db, "Park Square Live", "San Francisco", "CA").await;
        let artist = insert_artist(&db, "Guns N Petals").await;

        insert_show(&db, artist.id, hop.id, days_from_now(3)).await;
        insert_show(&db, artist.id, hop.id, days_from_now(10)).await;
        insert_show(&db, artist.id, hop.id, days_from_now(-3)).await;
        insert_show(&db, artist.id, park.id, days_from_now(-30)).await;

        let groups = service(db).list_grouped().await.unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].city, "San Francisco");
        let sf: Vec<(i64, u64)> = groups[0]
            .venues
            .iter()
            .map(|v| (v.id, v.num_upcoming_shows))
            .collect();
        assert_eq!(sf, vec![(hop.id, 2), (park.id, 0)]);
        assert_eq!(groups[1].venues[0].id, pianos.id);
        assert_eq!(groups[1].venues[0].num_upcoming_shows, 0);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_substring() {
        let db = test_db().await;
        let room = insert_venue(&db, "The Green Room", "Austin", "TX").await;
        insert_venue(&db, "Park Square", "Austin", "TX").await;
        let artist = insert_artist(&db, "Quevedo").await;
        insert_show(&db, artist.id, room.id, days_from_now(1)).await;

        let service = service(db);

        let results = service.search("ROOM").await.unwrap();
        assert_eq!(results.count, 1);
        assert_eq!(results.data[0].id, room.id);
        assert_eq!(results.data[0].num_upcoming_shows, 1);

        let everything = service.search("").await.unwrap();
        assert_eq!(everything.count, 2);

        let nothing = service.search("warehouse").await.unwrap();
        assert_eq!(nothing.count, 0);
        assert!(nothing.data.is_empty());
    }

    #[tokio::test]
    async fn test_search_treats_percent_literally() {
        let db = test_db().await;
        insert_venue(&db, "100% Live", "Austin", "TX").await;
        insert_venue(&db, "1000 Oaks", "Austin", "TX").await;

        let results = service(db).search("100%").await.unwrap();
        assert_eq!(results.count, 1);
        assert_eq!(results.data[0].name, "100% Live");
    }

    #[tokio::test]
    async fn test_search_folds_accented_letters() {
        let db = test_db().await;
        let cafe = insert_venue(&db, "Café Élan", "Austin", "TX").await;
        insert_venue(&db, "Cafe Plain", "Austin", "TX").await;

        let service = service(db);

        let results = service.search("CAFÉ").await.unwrap();
        assert_eq!(results.count, 1);
        assert_eq!(results.data[0].id, cafe.id);

        let results = service.search("élan").await.unwrap();
        assert_eq!(results.count, 1);
        assert_eq!(results.data[0].name, "Café Élan");
    }

    #[tokio::test]
    async fn test_detail_partitions_shows_around_now() {
        let db = test_db().await;
        let venue = insert_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        let petals = insert_artist(&db, "Guns N Petals").await;
        let matt = insert_artist(&db, "Matt Quevedo").await;

        insert_show(&db, petals.id, venue.id, days_from_now(-7)).await;
        insert_show(&db, matt.id, venue.id, days_from_now(7)).await;
        insert_show(&db, matt.id, venue.id, days_from_now(14)).await;
        // Starts exactly now: neither past nor upcoming.
        insert_show(&db, petals.id, venue.id, reference_now()).await;

        let detail = service(db).detail(venue.id).await.unwrap().unwrap();

        assert_eq!(detail.genres, vec!["Jazz", "Folk"]);
        assert_eq!(detail.past_shows_count, 1);
        assert_eq!(detail.upcoming_shows_count, 2);
        assert_eq!(detail.past_shows.len(), detail.past_shows_count);
        assert_eq!(detail.upcoming_shows.len(), detail.upcoming_shows_count);
        assert_eq!(detail.past_shows[0].artist_name, "Guns N Petals");
        assert_eq!(detail.upcoming_shows[0].artist_id, matt.id);
        assert_eq!(detail.upcoming_shows[0].start_time, days_from_now(7));
    }

    #[tokio::test]
    async fn test_past_shows_filter_by_venue_not_show_id() {
        // Regression: past shows must be selected by the venue foreign key. A lookup
        // keyed on show id would return the other venue's show here.
        let db = test_db().await;
        let other = insert_venue(&db, "Other Venue", "Austin", "TX").await;
        let venue = insert_venue(&db, "Target Venue", "Austin", "TX").await;
        let artist = insert_artist(&db, "Guns N Petals").await;

        let at_target = insert_show(&db, artist.id, venue.id, days_from_now(-1)).await;
        let at_other = insert_show(&db, artist.id, other.id, days_from_now(-2)).await;
        // Show ids are crossed with venue ids.
        assert_eq!(at_target.id, other.id);
        assert_eq!(at_other.id, venue.id);

        let detail = service(db.clone()).detail(venue.id).await.unwrap().unwrap();
        assert_eq!(detail.past_shows_count, 1);
        assert_eq!(detail.past_shows[0].start_time, days_from_now(-1));

        let other_detail = service(db).detail(other.id).await.unwrap().unwrap();
        assert_eq!(other_detail.past_shows_count, 1);
        assert_eq!(other_detail.past_shows[0].start_time, days_from_now(-2));
    }

    #[tokio::test]
    async fn test_detail_missing_venue() {
        let db = test_db().await;
        assert!(service(db).detail(9999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_venue_keeps_shows() {
        let db = test_db().await;
        let venue = insert_venue(&db, "Old Name", "Austin", "TX").await;
        let untouched = insert_venue(&db, "Neighbour", "Austin", "TX").await;
        let artist = insert_artist(&db, "Guns N Petals").await;
        insert_show(&db, artist.id, venue.id, days_from_now(5)).await;

        let service = service(db);
        let updated = service
            .update(
                venue.id,
                VenueInput {
                    name: "New Name".into(),
                    city: "Dallas".into(),
                    state: "TX".into(),
                    seeking_talent: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "New Name");
        assert_eq!(updated.city, "Dallas");
        assert!(updated.seeking_talent);

        let detail = service.detail(venue.id).await.unwrap().unwrap();
        assert_eq!(detail.upcoming_shows_count, 1);

        let neighbour = service.get(untouched.id).await.unwrap().unwrap();
        assert_eq!(neighbour.name, "Neighbour");
    }

    #[tokio::test]
    async fn test_update_missing_venue_is_not_found() {
        let db = test_db().await;
        let err = service(db).update(42, hall_a()).await.unwrap_err();

        assert_eq!(err.op, WriteOp::Update);
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_venue_cascades_to_its_shows_only() {
        let db = test_db().await;
        let venue = insert_venue(&db, "Doomed", "Austin", "TX").await;
        let survivor = insert_venue(&db, "Survivor", "Austin", "TX").await;
        let artist = insert_artist(&db, "Guns N Petals").await;
        insert_show(&db, artist.id, venue.id, days_from_now(-5)).await;
        insert_show(&db, artist.id, venue.id, days_from_now(5)).await;
        insert_show(&db, artist.id, survivor.id, days_from_now(5)).await;

        let removed = service(db.clone()).delete(venue.id).await.unwrap();
        assert_eq!(removed, 2);

        let remaining_for_venue = entities::show::Entity::find()
            .filter(entities::show::Column::VenueId.eq(venue.id))
            .count(&db.conn)
            .await
            .unwrap();
        assert_eq!(remaining_for_venue, 0);

        let total = entities::show::Entity::find().count(&db.conn).await.unwrap();
        assert_eq!(total, 1);
        assert!(service(db).get(venue.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_venue_is_not_found() {
        let db = test_db().await;
        let err = service(db).delete(7).await.unwrap_err();

        assert_eq!(err.op, WriteOp::Delete);
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_failed_delete_rolls_back_removed_shows() {
        let db = test_db().await;
        let venue = insert_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        let artist = insert_artist(&db, "Guns N Petals").await;
        insert_show(&db, artist.id, venue.id, days_from_now(-5)).await;
        insert_show(&db, artist.id, venue.id, days_from_now(5)).await;

        // Shows are deleted first; the venue row then refuses to go.
        db.conn
            .execute_unprepared(
                "CREATE TRIGGER keep_venues BEFORE DELETE ON venues \
                 BEGIN SELECT RAISE(ABORT, 'venue is locked'); END",
            )
            .await
            .unwrap();

        let err = service(db.clone()).delete(venue.id).await.unwrap_err();
        assert_eq!(err.op, WriteOp::Delete);
        assert!(matches!(err.failure, WriteFailure::Database(_)));

        assert!(service(db.clone()).get(venue.id).await.unwrap().is_some());
        let shows = entities::show::Entity::find()
            .filter(entities::show::Column::VenueId.eq(venue.id))
            .count(&db.conn)
            .await
            .unwrap();
        assert_eq!(shows, 2);
    }
}
