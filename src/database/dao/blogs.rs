use crate::aggregator::BlogRecord;
use crate::database::entities::{BlogEntry, UserRecord, blogs, users};
use crate::database::{DatabaseResult, map_db_error};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, DatabaseConnection, EntityTrait, QueryOrder, Set,
};

/// Fields of a blog about to be stored
#[derive(Debug, Clone)]
pub struct NewBlog {
    pub title: String,
    pub author: String,
    pub url: String,
    pub likes: i64,
    pub user_id: Option<i32>,
}

/// Replacement values for an existing blog. The creator never changes.
#[derive(Debug, Clone)]
pub struct BlogChanges {
    pub title: String,
    pub author: String,
    pub url: String,
    pub likes: i64,
}

/// Blogs DAO for database operations
#[derive(Clone)]
pub struct BlogsDao {
    db: DatabaseConnection,
}

impl BlogsDao {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, blog: NewBlog) -> DatabaseResult<BlogEntry> {
        let now = Utc::now();
        let active_model = blogs::ActiveModel {
            id: ActiveValue::NotSet,
            title: Set(blog.title),
            author: Set(blog.author),
            url: Set(blog.url),
            likes: Set(blog.likes),
            user_id: Set(blog.user_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        active_model.insert(&self.db).await.map_err(map_db_error)
    }

    pub async fn find_by_id(&self, blog_id: i32) -> DatabaseResult<Option<BlogEntry>> {
        blogs::Entity::find_by_id(blog_id)
            .one(&self.db)
            .await
            .map_err(map_db_error)
    }

    /// Find a blog together with its creator
    pub async fn find_with_user(
        &self,
        blog_id: i32,
    ) -> DatabaseResult<Option<(BlogEntry, Option<UserRecord>)>> {
        blogs::Entity::find_by_id(blog_id)
            .find_also_related(users::Entity)
            .one(&self.db)
            .await
            .map_err(map_db_error)
    }

    /// All blogs in insertion order, each with its creator
    pub async fn find_all_with_users(&self) -> DatabaseResult<Vec<(BlogEntry, Option<UserRecord>)>> {
        blogs::Entity::find()
            .find_also_related(users::Entity)
            .order_by_asc(blogs::Column::Id)
            .all(&self.db)
            .await
            .map_err(map_db_error)
    }

    /// All blogs in insertion order, in the shape the statistics functions consume
    pub async fn all_records(&self) -> DatabaseResult<Vec<BlogRecord>> {
        let blogs = blogs::Entity::find()
            .order_by_asc(blogs::Column::Id)
            .all(&self.db)
            .await
            .map_err(map_db_error)?;

        Ok(blogs.iter().map(BlogRecord::from).collect())
    }

    /// Overwrite a blog's content. Returns `None` when no blog has this ID.
    pub async fn update(
        &self,
        blog_id: i32,
        changes: BlogChanges,
    ) -> DatabaseResult<Option<BlogEntry>> {
        if self.find_by_id(blog_id).await?.is_none() {
            return Ok(None);
        }

        let active_model = blogs::ActiveModel {
            id: Set(blog_id),
            title: Set(changes.title),
            author: Set(changes.author),
            url: Set(changes.url),
            likes: Set(changes.likes),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };

        let updated = active_model.update(&self.db).await.map_err(map_db_error)?;
        Ok(Some(updated))
    }

    /// Delete one blog, returning whether it existed
    pub async fn delete(&self, blog_id: i32) -> DatabaseResult<bool> {
        let result = blogs::Entity::delete_by_id(blog_id)
            .exec(&self.db)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected > 0)
    }

    pub async fn delete_all(&self) -> DatabaseResult<u64> {
        let result = blogs::Entity::delete_many()
            .exec(&self.db)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected)
    }
}
