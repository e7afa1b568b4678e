use crate::aggregator::BlogRecord;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "blogs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub author: String,
    pub url: String,
    pub likes: i64,
    /// Creator of the blog; `None` once the user has been removed
    pub user_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_delete = "SetNull"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_owned_by(&self, user_id: i32) -> bool {
        self.user_id == Some(user_id)
    }
}

impl From<&Model> for BlogRecord {
    fn from(blog: &Model) -> Self {
        BlogRecord {
            title: blog.title.clone(),
            author: blog.author.clone(),
            url: blog.url.clone(),
            likes: u64::try_from(blog.likes).unwrap_or(0),
        }
    }
}
