//! Shapes flat query results into the nested views the listing and detail
//! pages render: locality groups, past/upcoming partitions and the
//! counterpart entries attached to each show.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::entities;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowBucket {
    Past,
    Upcoming,
}

impl ShowBucket {
    /// Places a show relative to `now`. A show starting exactly at `now` is in neither bucket.
    pub fn classify(start_time: NaiveDateTime, now: NaiveDateTime) -> Option<Self> {
        match start_time.cmp(&now) {
            Ordering::Greater => Some(ShowBucket::Upcoming),
            Ordering::Less => Some(ShowBucket::Past),
            Ordering::Equal => None,
        }
    }
}

/// A venue or artist as listed in groups and search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntitySummary {
    pub id: i64,
    pub name: String,
    pub num_upcoming_shows: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    pub count: usize,
    pub data: Vec<EntitySummary>,
}

impl From<Vec<EntitySummary>> for SearchResults {
    fn from(data: Vec<EntitySummary>) -> Self {
        Self {
            count: data.len(),
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalityGroup {
    pub city: String,
    pub state: String,
    pub venues: Vec<EntitySummary>,
}

/// The artist side of a show, as shown on a venue page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistAppearance {
    pub artist_id: i64,
    pub artist_name: String,
    pub artist_image_link: String,
    pub start_time: NaiveDateTime,
}

/// The venue side of a show, as shown on an artist page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VenueAppearance {
    pub venue_id: i64,
    pub venue_name: String,
    pub venue_image_link: String,
    pub start_time: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowPartition<T> {
    pub past: Vec<T>,
    pub upcoming: Vec<T>,
}

impl<T> ShowPartition<T> {
    /// Splits `(start_time, entry)` pairs around `now`, keeping input order within each bucket.
    pub fn split<I>(shows: I, now: NaiveDateTime) -> Self
    where
        I: IntoIterator<Item = (NaiveDateTime, T)>,
    {
        let mut past = Vec::new();
        let mut upcoming = Vec::new();

        for (start_time, entry) in shows {
            match ShowBucket::classify(start_time, now) {
                Some(ShowBucket::Past) => past.push(entry),
                Some(ShowBucket::Upcoming) => upcoming.push(entry),
                None => {}
            }
        }

        Self { past, upcoming }
    }

    pub fn past_count(&self) -> usize {
        self.past.len()
    }

    pub fn upcoming_count(&self) -> usize {
        self.upcoming.len()
    }
}

/// Counts upcoming shows per owner id in a single pass over `(owner_id, start_time)` pairs.
pub fn upcoming_counts<I>(shows: I, now: NaiveDateTime) -> HashMap<i64, u64>
where
    I: IntoIterator<Item = (i64, NaiveDateTime)>,
{
    let mut counts = HashMap::new();
    for (owner_id, start_time) in shows {
        if ShowBucket::classify(start_time, now) == Some(ShowBucket::Upcoming) {
            *counts.entry(owner_id).or_insert(0) += 1;
        }
    }
    counts
}

pub fn summarize(id: i64, name: String, upcoming: &HashMap<i64, u64>) -> EntitySummary {
    EntitySummary {
        id,
        name,
        num_upcoming_shows: upcoming.get(&id).copied().unwrap_or(0),
    }
}

/// Groups venues by their exact `(city, state)` pair.
///
/// Groups appear in the order their first venue was encountered, and venues keep
/// their input order inside a group.
pub fn group_by_locality(
    venues: Vec<entities::venue::Model>,
    upcoming: &HashMap<i64, u64>,
) -> Vec<LocalityGroup> {
    let mut groups: Vec<LocalityGroup> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for venue in venues {
        let summary = summarize(venue.id, venue.name, upcoming);

        match index.entry((venue.city.clone(), venue.state.clone())) {
            Entry::Occupied(slot) => groups[*slot.get()].venues.push(summary),
            Entry::Vacant(slot) => {
                slot.insert(groups.len());
                groups.push(LocalityGroup {
                    city: venue.city,
                    state: venue.state,
                    venues: vec![summary],
                });
            }
        }
    }

    groups
}
