use anyhow::Result;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Paginator, SelectorTrait,
    Statement,
};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::{communities, members, roles, users};

pub mod migrator;
pub mod repositories;

pub use repositories::community::CommunityInsert;

/// One page of query results plus the pagination meta the API envelope needs.
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub pages: u64,
    pub page: u64,
}

impl<T> Page<T> {
    /// Fetches 1-based `page` from a paginator. Pages past the end yield an
    /// empty item list with the correct totals.
    pub async fn fetch<'db, C, S>(paginator: Paginator<'db, C, S>, page: u64) -> Result<Self>
    where
        C: ConnectionTrait,
        S: SelectorTrait<Item = T> + 'db,
    {
        let page = page.max(1);
        let counts = paginator.num_items_and_pages().await?;
        let items = paginator.fetch_page(page - 1).await?;

        Ok(Self {
            items,
            total: counts.number_of_items,
            pages: counts.number_of_pages,
            page,
        })
    }

    /// Maps the page's items, keeping the meta intact.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            pages: self.pages,
            page: self.page,
        }
    }
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn community_repo(&self) -> repositories::community::CommunityRepository {
        repositories::community::CommunityRepository::new(self.conn.clone())
    }

    fn role_repo(&self) -> repositories::role::RoleRepository {
        repositories::role::RoleRepository::new(self.conn.clone())
    }

    fn member_repo(&self) -> repositories::member::MemberRepository {
        repositories::member::MemberRepository::new(self.conn.clone())
    }

    pub async fn create_user(
        &self,
        id: i64,
        name: Option<String>,
        email: &str,
        password_hash: &str,
        now: &str,
    ) -> Result<users::Model> {
        self.user_repo()
            .create(id, name, email, password_hash, now)
            .await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<users::Model>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_user_by_id(&self, id: i64) -> Result<Option<users::Model>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<users::Model>> {
        self.user_repo().get_by_ids(ids).await
    }

    pub async fn insert_community(
        &self,
        id: i64,
        name: &str,
        slug: &str,
        owner_id: i64,
        now: &str,
    ) -> Result<CommunityInsert> {
        self.community_repo()
            .insert(id, name, slug, owner_id, now)
            .await
    }

    pub async fn delete_community(&self, id: i64) -> Result<()> {
        self.community_repo().delete(id).await
    }

    pub async fn get_community(&self, id: i64) -> Result<Option<communities::Model>> {
        self.community_repo().get(id).await
    }

    pub async fn get_communities_by_ids(&self, ids: &[i64]) -> Result<Vec<communities::Model>> {
        self.community_repo().get_by_ids(ids).await
    }

    pub async fn list_communities(
        &self,
        page: u64,
        page_size: u64,
    ) -> Result<Page<communities::Model>> {
        self.community_repo().list(page, page_size).await
    }

    pub async fn list_communities_by_owner(
        &self,
        owner_id: i64,
        page: u64,
        page_size: u64,
    ) -> Result<Page<communities::Model>> {
        self.community_repo()
            .list_by_owner(owner_id, page, page_size)
            .await
    }

    pub async fn create_role(&self, id: i64, name: &str, now: &str) -> Result<roles::Model> {
        self.role_repo().create(id, name, now).await
    }

    pub async fn get_role_by_name(&self, name: &str) -> Result<Option<roles::Model>> {
        self.role_repo().get_by_name(name).await
    }

    pub async fn get_role_by_id(&self, id: i64) -> Result<Option<roles::Model>> {
        self.role_repo().get_by_id(id).await
    }

    pub async fn get_roles_by_ids(&self, ids: &[i64]) -> Result<Vec<roles::Model>> {
        self.role_repo().get_by_ids(ids).await
    }

    pub async fn list_roles(&self, page: u64, page_size: u64) -> Result<Page<roles::Model>> {
        self.role_repo().list(page, page_size).await
    }

    pub async fn insert_member(
        &self,
        id: i64,
        community_id: i64,
        user_id: i64,
        role_id: i64,
        added_by: i64,
        now: &str,
    ) -> Result<members::Model> {
        self.member_repo()
            .insert(id, community_id, user_id, role_id, added_by, now)
            .await
    }

    pub async fn get_member(&self, id: i64) -> Result<Option<members::Model>> {
        self.member_repo().get(id).await
    }

    pub async fn delete_member(&self, id: i64) -> Result<()> {
        self.member_repo().delete(id).await
    }

    pub async fn find_membership(
        &self,
        community_id: i64,
        user_id: i64,
    ) -> Result<Option<members::Model>> {
        self.member_repo()
            .find_by_community_and_user(community_id, user_id)
            .await
    }

    pub async fn list_members_by_community(
        &self,
        community_id: i64,
        page: u64,
        page_size: u64,
    ) -> Result<Page<members::Model>> {
        self.member_repo()
            .list_by_community(community_id, page, page_size)
            .await
    }

    pub async fn list_memberships_by_user(
        &self,
        user_id: i64,
        page: u64,
        page_size: u64,
    ) -> Result<Page<members::Model>> {
        self.member_repo()
            .list_by_user(user_id, page, page_size)
            .await
    }
}
