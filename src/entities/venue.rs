use sea_orm::entity::prelude::*;
use serde::Serialize;

use super::genres::Genres;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize)]
#[sea_orm(table_name = "venues")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
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

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::show::Entity")]
    Show,
}

impl Related<super::show::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Show.def()
    }
}

impl Related<super::artist::Entity> for Entity {
    fn to() -> RelationDef {
        super::artist_venue::Relation::Artist.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::artist_venue::Relation::Venue.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
