use sea_orm_migration::prelude::*;

pub use sea_orm_migration::MigratorTrait;

mod m20250301_000001_create_users_table;
mod m20250301_000002_create_blogs_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_users_table::Migration),
            Box::new(m20250301_000002_create_blogs_table::Migration),
        ]
    }
}

/// Common table and column identifiers
#[derive(Iden)]
pub enum Users {
    Table,
    Id,
    Username,
    Name,
    PasswordHash,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum Blogs {
    Table,
    Id,
    Title,
    Author,
    Url,
    Likes,
    UserId,
    CreatedAt,
    UpdatedAt,
}
