//! Database migrations.
//!
//! Schema migrations for the database. Applied in order at startup and
//! tracked in the `seaql_migrations` table.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20260201_000001_create_users_table;
mod m20260201_000002_create_posts_table;
mod m20260201_000003_create_post_likes_table;
mod m20260201_000004_create_bookmarks_table;
mod m20260201_000005_create_messages_table;
mod m20260201_000006_add_moderation_columns;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260201_000001_create_users_table::Migration),
            Box::new(m20260201_000002_create_posts_table::Migration),
            Box::new(m20260201_000003_create_post_likes_table::Migration),
            Box::new(m20260201_000004_create_bookmarks_table::Migration),
            Box::new(m20260201_000005_create_messages_table::Migration),
            Box::new(m20260201_000006_add_moderation_columns::Migration),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_ordered() {
        let names: Vec<String> = Migrator::migrations()
            .iter()
            .map(|m| m.name().to_string())
            .collect();

        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names.len(), 6);
    }
}
