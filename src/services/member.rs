//! Membership mutations: role-gated add and remove.

use std::sync::Arc;

use crate::authz::{Action, Policy};
use crate::db::Store;
use crate::entities::members;
use crate::id::SnowflakeGenerator;
use crate::services::{ServiceError, now_rfc3339};

pub struct MemberService {
    store: Store,
    ids: Arc<SnowflakeGenerator>,
    policy: Policy,
}

impl MemberService {
    #[must_use]
    pub const fn new(store: Store, ids: Arc<SnowflakeGenerator>, policy: Policy) -> Self {
        Self { store, ids, policy }
    }

    /// Adds a user to a community with a role. All three referenced entities
    /// must exist, and the (community, user) pair must not already hold a
    /// membership.
    pub async fn add(
        &self,
        acting_user_id: i64,
        community_id: i64,
        user_id: i64,
        role_id: i64,
    ) -> Result<members::Model, ServiceError> {
        if self.store.get_community(community_id).await?.is_none() {
            return Err(ServiceError::Validation("Community not found".to_string()));
        }
        if self.store.get_user_by_id(user_id).await?.is_none() {
            return Err(ServiceError::Validation("User not found".to_string()));
        }
        if self.store.get_role_by_id(role_id).await?.is_none() {
            return Err(ServiceError::Validation("Role not found".to_string()));
        }

        if self
            .store
            .find_membership(community_id, user_id)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(
                "User is already a member of this community".to_string(),
            ));
        }

        let id = self.ids.generate();
        let now = now_rfc3339();
        let member = self
            .store
            .insert_member(id, community_id, user_id, role_id, acting_user_id, &now)
            .await?;

        tracing::info!(
            member_id = member.id,
            community_id,
            user_id,
            added_by = acting_user_id,
            "Member added"
        );

        Ok(member)
    }

    /// Removes a membership. The acting user must hold a role in the target's
    /// community that the policy table grants [`Action::RemoveMember`].
    pub async fn remove(
        &self,
        acting_user_id: i64,
        member_id: i64,
    ) -> Result<(), ServiceError> {
        if self.store.get_user_by_id(acting_user_id).await?.is_none() {
            return Err(ServiceError::UnknownUser);
        }

        let member = self
            .store
            .get_member(member_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Member not found".to_string()))?;

        let acting_membership = self
            .store
            .find_membership(member.community_id, acting_user_id)
            .await?
            .ok_or(ServiceError::Forbidden)?;

        let acting_role = self
            .store
            .get_role_by_id(acting_membership.role_id)
            .await?
            .ok_or(ServiceError::Forbidden)?;

        if !self.policy.allows(&acting_role.name, Action::RemoveMember) {
            return Err(ServiceError::Forbidden);
        }

        self.store.delete_member(member_id).await?;

        tracing::info!(
            member_id,
            community_id = member.community_id,
            removed_by = acting_user_id,
            "Member removed"
        );

        Ok(())
    }
}
