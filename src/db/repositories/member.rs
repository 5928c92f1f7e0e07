use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::db::Page;
use crate::entities::{members, prelude::*};

pub struct MemberRepository {
    conn: DatabaseConnection,
}

impl MemberRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        &self,
        id: i64,
        community_id: i64,
        user_id: i64,
        role_id: i64,
        added_by: i64,
        now: &str,
    ) -> Result<members::Model> {
        let active = members::ActiveModel {
            id: Set(id),
            community_id: Set(community_id),
            user_id: Set(user_id),
            role_id: Set(role_id),
            added_by: Set(added_by),
            created_at: Set(now.to_string()),
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert membership")
    }

    pub async fn get(&self, id: i64) -> Result<Option<members::Model>> {
        Members::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query membership by ID")
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        Members::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete membership")?;
        Ok(())
    }

    /// The acting user's own membership in a community, if any.
    pub async fn find_by_community_and_user(
        &self,
        community_id: i64,
        user_id: i64,
    ) -> Result<Option<members::Model>> {
        Members::find()
            .filter(members::Column::CommunityId.eq(community_id))
            .filter(members::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query membership by community and user")
    }

    pub async fn list_by_community(
        &self,
        community_id: i64,
        page: u64,
        page_size: u64,
    ) -> Result<Page<members::Model>> {
        let paginator = Members::find()
            .filter(members::Column::CommunityId.eq(community_id))
            .order_by_asc(members::Column::Id)
            .paginate(&self.conn, page_size);

        Page::fetch(paginator, page).await
    }

    pub async fn list_by_user(
        &self,
        user_id: i64,
        page: u64,
        page_size: u64,
    ) -> Result<Page<members::Model>> {
        let paginator = Members::find()
            .filter(members::Column::UserId.eq(user_id))
            .order_by_asc(members::Column::Id)
            .paginate(&self.conn, page_size);

        Page::fetch(paginator, page).await
    }
}
