//! Community creation and listing.
//!
//! Creation is best-effort atomic: the community row goes in first under an
//! optimistic slug insert-and-retry loop, then the owner's admin membership.
//! A failure after the community insert triggers a compensating delete so no
//! orphaned community is left behind.

use std::collections::HashMap;
use std::sync::Arc;

use crate::authz::ADMIN_ROLE;
use crate::db::{CommunityInsert, Page, Store};
use crate::entities::{communities, members, roles, users};
use crate::id::SnowflakeGenerator;
use crate::services::{ServiceError, now_rfc3339};
use crate::slug::{MAX_SLUG_ATTEMPTS, candidate, slugify};

/// A community together with its (possibly missing) owner record.
pub struct CommunityWithOwner {
    pub community: communities::Model,
    pub owner: Option<users::Model>,
}

/// A membership with its referenced user and role resolved.
pub struct MemberDetail {
    pub member: members::Model,
    pub user: Option<users::Model>,
    pub role: Option<roles::Model>,
}

pub struct CommunityService {
    store: Store,
    ids: Arc<SnowflakeGenerator>,
}

impl CommunityService {
    #[must_use]
    pub const fn new(store: Store, ids: Arc<SnowflakeGenerator>) -> Self {
        Self { store, ids }
    }

    /// Creates a community owned by `owner_id` with an automatically
    /// assigned unique slug, plus the owner's "Community Admin" membership.
    pub async fn create(
        &self,
        owner_id: i64,
        name: &str,
    ) -> Result<communities::Model, ServiceError> {
        if name.trim().is_empty() {
            return Err(ServiceError::Validation("Name is required".to_string()));
        }

        let base = slugify(name);

        for attempt in 0..MAX_SLUG_ATTEMPTS {
            let slug = candidate(&base, attempt);
            let id = self.ids.generate();
            let now = now_rfc3339();

            match self
                .store
                .insert_community(id, name, &slug, owner_id, &now)
                .await?
            {
                CommunityInsert::Created(community) => {
                    return self.attach_owner_membership(community, owner_id).await;
                }
                CommunityInsert::SlugTaken => {
                    tracing::debug!(slug, attempt, "Slug taken, retrying");
                }
            }
        }

        Err(ServiceError::SlugAllocationExhausted)
    }

    async fn attach_owner_membership(
        &self,
        community: communities::Model,
        owner_id: i64,
    ) -> Result<communities::Model, ServiceError> {
        let admin_role = match self.store.get_role_by_name(ADMIN_ROLE).await {
            Ok(Some(role)) => role,
            Ok(None) => {
                self.compensate(community.id).await;
                return Err(ServiceError::Configuration(format!(
                    "Role catalog is not seeded: \"{ADMIN_ROLE}\" role not found"
                )));
            }
            Err(e) => {
                self.compensate(community.id).await;
                return Err(e.into());
            }
        };

        let member_id = self.ids.generate();
        let now = now_rfc3339();
        if let Err(e) = self
            .store
            .insert_member(
                member_id,
                community.id,
                owner_id,
                admin_role.id,
                owner_id,
                &now,
            )
            .await
        {
            self.compensate(community.id).await;
            return Err(e.into());
        }

        tracing::info!(
            community_id = community.id,
            owner_id,
            slug = %community.slug,
            "Community created"
        );

        Ok(community)
    }

    /// Deletes a community whose owner membership could not be created.
    async fn compensate(&self, community_id: i64) {
        if let Err(e) = self.store.delete_community(community_id).await {
            tracing::error!(
                community_id,
                "Failed to clean up orphaned community: {e}"
            );
        }
    }

    pub async fn list(
        &self,
        page: u64,
        page_size: u64,
    ) -> Result<Page<CommunityWithOwner>, ServiceError> {
        let communities = self.store.list_communities(page, page_size).await?;
        self.attach_owners(communities).await
    }

    pub async fn list_owned(
        &self,
        owner_id: i64,
        page: u64,
        page_size: u64,
    ) -> Result<Page<communities::Model>, ServiceError> {
        Ok(self
            .store
            .list_communities_by_owner(owner_id, page, page_size)
            .await?)
    }

    /// Communities the user has joined, with their owners resolved.
    pub async fn list_joined(
        &self,
        user_id: i64,
        page: u64,
        page_size: u64,
    ) -> Result<Page<CommunityWithOwner>, ServiceError> {
        let memberships = self
            .store
            .list_memberships_by_user(user_id, page, page_size)
            .await?;

        let community_ids: Vec<i64> = memberships.items.iter().map(|m| m.community_id).collect();
        let mut by_id: HashMap<i64, communities::Model> = self
            .store
            .get_communities_by_ids(&community_ids)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let page = memberships.map(|m| by_id.remove(&m.community_id));
        let communities = Page {
            items: page.items.into_iter().flatten().collect(),
            total: page.total,
            pages: page.pages,
            page: page.page,
        };

        self.attach_owners(communities).await
    }

    pub async fn list_members(
        &self,
        community_id: i64,
        page: u64,
        page_size: u64,
    ) -> Result<Page<MemberDetail>, ServiceError> {
        let members = self
            .store
            .list_members_by_community(community_id, page, page_size)
            .await?;

        let user_ids: Vec<i64> = members.items.iter().map(|m| m.user_id).collect();
        let role_ids: Vec<i64> = members.items.iter().map(|m| m.role_id).collect();

        let users: HashMap<i64, users::Model> = self
            .store
            .get_users_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();
        let roles: HashMap<i64, roles::Model> = self
            .store
            .get_roles_by_ids(&role_ids)
            .await?
            .into_iter()
            .map(|r| (r.id, r))
            .collect();

        Ok(members.map(|member| MemberDetail {
            user: users.get(&member.user_id).cloned(),
            role: roles.get(&member.role_id).cloned(),
            member,
        }))
    }

    async fn attach_owners(
        &self,
        communities: Page<communities::Model>,
    ) -> Result<Page<CommunityWithOwner>, ServiceError> {
        let owner_ids: Vec<i64> = communities.items.iter().map(|c| c.owner_id).collect();
        let owners: HashMap<i64, users::Model> = self
            .store
            .get_users_by_ids(&owner_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        Ok(communities.map(|community| CommunityWithOwner {
            owner: owners.get(&community.owner_id).cloned(),
            community,
        }))
    }
}
