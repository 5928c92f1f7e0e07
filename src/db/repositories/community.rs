use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};

use crate::db::Page;
use crate::entities::{communities, prelude::*};

/// Outcome of an optimistic community insert: the slug unique index is the
/// final arbiter under concurrency, so a collision is a normal result here,
/// not an error.
pub enum CommunityInsert {
    Created(communities::Model),
    SlugTaken,
}

pub struct CommunityRepository {
    conn: DatabaseConnection,
}

impl CommunityRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(
        &self,
        id: i64,
        name: &str,
        slug: &str,
        owner_id: i64,
        now: &str,
    ) -> Result<CommunityInsert> {
        let active = communities::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            slug: Set(slug.to_string()),
            owner_id: Set(owner_id),
            created_at: Set(now.to_string()),
            updated_at: Set(now.to_string()),
        };

        match active.insert(&self.conn).await {
            Ok(model) => Ok(CommunityInsert::Created(model)),
            Err(err) => match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(detail)) if detail.contains("slug") => {
                    Ok(CommunityInsert::SlugTaken)
                }
                _ => Err(err).context("Failed to insert community"),
            },
        }
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        Communities::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete community")?;
        Ok(())
    }

    pub async fn get(&self, id: i64) -> Result<Option<communities::Model>> {
        Communities::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query community by ID")
    }

    pub async fn list(&self, page: u64, page_size: u64) -> Result<Page<communities::Model>> {
        let paginator = Communities::find()
            .order_by_asc(communities::Column::Id)
            .paginate(&self.conn, page_size);

        Page::fetch(paginator, page).await
    }

    pub async fn list_by_owner(
        &self,
        owner_id: i64,
        page: u64,
        page_size: u64,
    ) -> Result<Page<communities::Model>> {
        let paginator = Communities::find()
            .filter(communities::Column::OwnerId.eq(owner_id))
            .order_by_asc(communities::Column::Id)
            .paginate(&self.conn, page_size);

        Page::fetch(paginator, page).await
    }

    pub async fn get_by_ids(&self, ids: &[i64]) -> Result<Vec<communities::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        Communities::find()
            .filter(communities::Column::Id.is_in(ids.iter().copied()))
            .all(&self.conn)
            .await
            .context("Failed to query communities by IDs")
    }
}
