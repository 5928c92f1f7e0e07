//! Role-based authorization over community memberships.
//!
//! Permissions derive from a data-driven `{role name -> permission set}`
//! table so new roles can be granted abilities without touching call sites.
//! The decision point for member removal checks the acting user's own role
//! in the target community, never the target member's role.

use std::collections::{HashMap, HashSet};

pub const ADMIN_ROLE: &str = "Community Admin";
pub const MODERATOR_ROLE: &str = "Community Moderator";
pub const MEMBER_ROLE: &str = "Community Member";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    AddMember,
    RemoveMember,
}

#[derive(Debug, Clone)]
pub struct Policy {
    rules: HashMap<String, HashSet<Action>>,
}

impl Default for Policy {
    fn default() -> Self {
        let mut rules: HashMap<String, HashSet<Action>> = HashMap::new();
        rules.insert(
            ADMIN_ROLE.to_string(),
            HashSet::from([Action::AddMember, Action::RemoveMember]),
        );
        rules.insert(
            MODERATOR_ROLE.to_string(),
            HashSet::from([Action::RemoveMember]),
        );
        rules.insert(MEMBER_ROLE.to_string(), HashSet::new());
        Self { rules }
    }
}

impl Policy {
    /// Grants `action` to `role_name`, creating the role entry if needed.
    pub fn grant(&mut self, role_name: &str, action: Action) {
        self.rules
            .entry(role_name.to_string())
            .or_default()
            .insert(action);
    }

    /// Whether a holder of `role_name` may perform `action`.
    /// Unknown roles have no permissions.
    #[must_use]
    pub fn allows(&self, role_name: &str, action: Action) -> bool {
        self.rules
            .get(role_name)
            .is_some_and(|granted| granted.contains(&action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_and_moderator_can_remove_members() {
        let policy = Policy::default();
        assert!(policy.allows(ADMIN_ROLE, Action::RemoveMember));
        assert!(policy.allows(MODERATOR_ROLE, Action::RemoveMember));
    }

    #[test]
    fn plain_members_cannot_remove() {
        let policy = Policy::default();
        assert!(!policy.allows(MEMBER_ROLE, Action::RemoveMember));
    }

    #[test]
    fn unknown_roles_have_no_permissions() {
        let policy = Policy::default();
        assert!(!policy.allows("Community Lurker", Action::RemoveMember));
    }

    #[test]
    fn grants_extend_the_table() {
        let mut policy = Policy::default();
        policy.grant(MEMBER_ROLE, Action::AddMember);
        assert!(policy.allows(MEMBER_ROLE, Action::AddMember));
        assert!(!policy.allows(MEMBER_ROLE, Action::RemoveMember));
    }
}
