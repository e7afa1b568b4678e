use crate::database::entities::{UserRecord, blogs, users};
use crate::database::{DatabaseResult, map_db_error};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait, sea_query::Expr,
};

/// Users DAO for database operations
#[derive(Clone)]
pub struct UsersDao {
    db: DatabaseConnection,
}

impl UsersDao {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Insert a new user. A taken username surfaces as `DatabaseError::Constraint`.
    pub async fn create(&self, user: &UserRecord) -> DatabaseResult<UserRecord> {
        let active_model = users::ActiveModel {
            id: ActiveValue::NotSet,
            username: Set(user.username.clone()),
            name: Set(user.name.clone()),
            password_hash: Set(user.password_hash.clone()),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        };

        active_model.insert(&self.db).await.map_err(map_db_error)
    }

    /// Find user by ID
    pub async fn find_by_id(&self, user_id: i32) -> DatabaseResult<Option<UserRecord>> {
        users::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(map_db_error)
    }

    /// Find user by username
    pub async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<UserRecord>> {
        users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_db_error)
    }

    /// All users in creation order, each with the blogs they created
    pub async fn find_all_with_blogs(&self) -> DatabaseResult<Vec<(UserRecord, Vec<blogs::Model>)>> {
        users::Entity::find()
            .find_with_related(blogs::Entity)
            .order_by_asc(users::Column::Id)
            .order_by_asc(blogs::Column::Id)
            .all(&self.db)
            .await
            .map_err(map_db_error)
    }

    /// Remove every user. Blogs they created are kept but lose their owner.
    /// Both steps commit together or not at all.
    pub async fn delete_all(&self) -> DatabaseResult<u64> {
        let txn = self.db.begin().await.map_err(map_db_error)?;

        blogs::Entity::update_many()
            .col_expr(blogs::Column::UserId, Expr::value(Option::<i32>::None))
            .exec(&txn)
            .await
            .map_err(map_db_error)?;

        let result = users::Entity::delete_many()
            .exec(&txn)
            .await
            .map_err(map_db_error)?;

        txn.commit().await.map_err(map_db_error)?;
        Ok(result.rows_affected)
    }
}
