//! `SeaORM` entity for the `connected_accounts` table.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "connected_accounts")]
/// Database row model for a user's connected social account.
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub platform: String,
    pub username: String,
    /// Lowercased username used for duplicate lookups
    pub username_key: String,
    pub is_active: bool,
    pub follower_count: i64,
    pub following_count: i64,
    pub post_count: i64,
    pub profile_picture_url: Option<String>,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
