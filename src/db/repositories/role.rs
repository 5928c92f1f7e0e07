use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::db::Page;
use crate::entities::{prelude::*, roles};

pub struct RoleRepository {
    conn: DatabaseConnection,
}

impl RoleRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, id: i64, name: &str, now: &str) -> Result<roles::Model> {
        let active = roles::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            created_at: Set(now.to_string()),
            updated_at: Set(now.to_string()),
        };

        active.insert(&self.conn).await.context("Failed to insert role")
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<roles::Model>> {
        Roles::find()
            .filter(roles::Column::Name.eq(name))
            .one(&self.conn)
            .await
            .context("Failed to query role by name")
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<roles::Model>> {
        Roles::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query role by ID")
    }

    pub async fn get_by_ids(&self, ids: &[i64]) -> Result<Vec<roles::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        Roles::find()
            .filter(roles::Column::Id.is_in(ids.iter().copied()))
            .all(&self.conn)
            .await
            .context("Failed to query roles by IDs")
    }

    pub async fn list(&self, page: u64, page_size: u64) -> Result<Page<roles::Model>> {
        let paginator = Roles::find()
            .order_by_asc(roles::Column::Id)
            .paginate(&self.conn, page_size);

        Page::fetch(paginator, page).await
    }
}
