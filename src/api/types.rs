use serde::{Deserialize, Serialize};

use crate::db::Page;
use crate::entities::{communities, members, roles, users};
use crate::services::community::{CommunityWithOwner, MemberDetail};

/// Response envelope: `{"status": bool, "content": ..., "error": ...}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(content: T) -> Self {
        Self {
            status: true,
            content: Some(content),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: false,
            content: None,
            error: Some(message.into()),
        }
    }
}

/// Content wrapper for single-record responses.
#[derive(Debug, Serialize)]
pub struct DataContent<T> {
    pub data: T,
}

/// Content wrapper for paginated responses.
#[derive(Debug, Serialize)]
pub struct PagedContent<T> {
    pub meta: PageMeta,
    pub data: Vec<T>,
}

#[derive(Debug, Serialize)]
pub struct PageMeta {
    pub total: u64,
    pub pages: u64,
    pub page: u64,
}

impl<T> PagedContent<T> {
    pub fn from_page<S>(page: Page<S>, f: impl FnMut(S) -> T) -> Self {
        Self {
            meta: PageMeta {
                total: page.total,
                pages: page.pages,
                page: page.page,
            },
            data: page.items.into_iter().map(f).collect(),
        }
    }
}

/// Content wrapper for signup/signin responses carrying a bearer token.
#[derive(Debug, Serialize)]
pub struct AuthContent {
    pub data: UserDto,
    pub meta: AccessTokenMeta,
}

#[derive(Debug, Serialize)]
pub struct AccessTokenMeta {
    pub access_token: String,
}

/// 1-based pagination query. `pageSize` is honored where the surface allows
/// a caller-supplied size; top-level lists pin it to the default.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<u64>,
}

pub const DEFAULT_PAGE_SIZE: u64 = 10;

impl PageQuery {
    #[must_use]
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    #[must_use]
    pub fn page_size(&self) -> u64 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1)
    }
}

// Snowflake IDs serialize as strings: they exceed the integer range JSON
// consumers can round-trip safely.

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
    pub created_at: String,
}

impl From<users::Model> for UserDto {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id.to_string(),
            name: model.name,
            email: model.email,
            created_at: model.created_at,
        }
    }
}

/// Abbreviated user, embedded as `owner`/`user` in list responses.
#[derive(Debug, Serialize)]
pub struct UserSummaryDto {
    pub id: String,
    pub name: Option<String>,
}

impl From<users::Model> for UserSummaryDto {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id.to_string(),
            name: model.name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommunityDto {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub owner: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<communities::Model> for CommunityDto {
    fn from(model: communities::Model) -> Self {
        Self {
            id: model.id.to_string(),
            name: model.name,
            slug: model.slug,
            owner: model.owner_id.to_string(),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommunityWithOwnerDto {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub owner: Option<UserSummaryDto>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<CommunityWithOwner> for CommunityWithOwnerDto {
    fn from(entry: CommunityWithOwner) -> Self {
        Self {
            id: entry.community.id.to_string(),
            name: entry.community.name,
            slug: entry.community.slug,
            owner: entry.owner.map(UserSummaryDto::from),
            created_at: entry.community.created_at,
            updated_at: entry.community.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RoleDto {
    pub id: String,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<roles::Model> for RoleDto {
    fn from(model: roles::Model) -> Self {
        Self {
            id: model.id.to_string(),
            name: model.name,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RoleSummaryDto {
    pub id: String,
    pub name: String,
}

impl From<roles::Model> for RoleSummaryDto {
    fn from(model: roles::Model) -> Self {
        Self {
            id: model.id.to_string(),
            name: model.name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MemberDto {
    pub id: String,
    pub community: String,
    pub user: String,
    pub role: String,
    pub created_at: String,
}

impl From<members::Model> for MemberDto {
    fn from(model: members::Model) -> Self {
        Self {
            id: model.id.to_string(),
            community: model.community_id.to_string(),
            user: model.user_id.to_string(),
            role: model.role_id.to_string(),
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MemberDetailDto {
    pub id: String,
    pub community: String,
    pub user: Option<UserSummaryDto>,
    pub role: Option<RoleSummaryDto>,
    pub created_at: String,
}

impl From<MemberDetail> for MemberDetailDto {
    fn from(entry: MemberDetail) -> Self {
        Self {
            id: entry.member.id.to_string(),
            community: entry.member.community_id.to_string(),
            user: entry.user.map(UserSummaryDto::from),
            role: entry.role.map(RoleSummaryDto::from),
            created_at: entry.member.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageDto {
    pub message: String,
}
