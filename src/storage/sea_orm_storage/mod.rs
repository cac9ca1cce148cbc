//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

pub(crate) mod assignments;
pub(crate) mod courses;
pub(crate) mod oauth;
pub(crate) mod submissions;
pub(crate) mod users;
pub(crate) mod videos;

use crate::config::AppConfig;
use crate::errors::{CourseHubError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| CourseHubError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| CourseHubError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("mmap_size", "536870912")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| CourseHubError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| CourseHubError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(CourseHubError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }

    /// 内存 SQLite，仅用于测试
    #[cfg(test)]
    pub(crate) async fn in_memory() -> Result<Self> {
        // 内存库按连接隔离，必须只保留一条连接
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);
        let db = Database::connect(opt)
            .await
            .map_err(|e| CourseHubError::database_connection(format!("无法连接到数据库: {e}")))?;
        Migrator::up(&db, None)
            .await
            .map_err(|e| CourseHubError::database_operation(format!("数据库迁移失败: {e}")))?;
        Ok(Self { db })
    }
}

// Storage trait 实现
use crate::models::{
    PaginationInfo,
    assignments::{
        entities::Assignment,
        requests::{AssignmentListQuery, CreateAssignmentRequest, UpdateAssignmentRequest},
    },
    courses::{
        entities::Course,
        requests::{CourseListQuery, CreateCourseRequest, UpdateCourseRequest},
        responses::CourseListResponse,
    },
    oauth::{
        entities::{OAuthConfig, OAuthUser},
        requests::{
            CreateOAuthConfigRequest, OAuthUserListParams, UpdateOAuthConfigRequest,
            UpsertOAuthUser,
        },
        responses::OAuthUserListResponse,
    },
    submissions::{entities::Submission, requests::UpsertSubmission},
    users::{
        entities::User,
        requests::{CreateUserRequest, UpdateUserRequest},
    },
    videos::{entities::VideoMaterial, requests::CreateVideoInput},
};
use crate::storage::Storage;
use async_trait::async_trait;
use std::collections::HashMap;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>> {
        self.get_user_by_username_or_email_impl(identifier).await
    }

    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>> {
        self.update_user_impl(id, update).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    // 课程模块
    async fn create_course(&self, course: CreateCourseRequest) -> Result<Course> {
        self.create_course_impl(course).await
    }

    async fn get_course_by_id(&self, id: i64) -> Result<Option<Course>> {
        self.get_course_by_id_impl(id).await
    }

    async fn list_courses_with_pagination(
        &self,
        query: CourseListQuery,
    ) -> Result<CourseListResponse> {
        self.list_courses_with_pagination_impl(query).await
    }

    async fn update_course(
        &self,
        id: i64,
        update: UpdateCourseRequest,
    ) -> Result<Option<Course>> {
        self.update_course_impl(id, update).await
    }

    async fn delete_course(&self, id: i64) -> Result<bool> {
        self.delete_course_impl(id).await
    }

    // 作业模块
    async fn create_assignment(&self, assignment: CreateAssignmentRequest) -> Result<Assignment> {
        self.create_assignment_impl(assignment).await
    }

    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>> {
        self.get_assignment_by_id_impl(id).await
    }

    async fn list_assignments_with_pagination(
        &self,
        query: AssignmentListQuery,
    ) -> Result<(Vec<Assignment>, PaginationInfo)> {
        self.list_assignments_with_pagination_impl(query).await
    }

    async fn list_course_assignments(&self, course_id: i64) -> Result<Vec<Assignment>> {
        self.list_course_assignments_impl(course_id).await
    }

    async fn update_assignment(
        &self,
        id: i64,
        update: UpdateAssignmentRequest,
    ) -> Result<Option<Assignment>> {
        self.update_assignment_impl(id, update).await
    }

    async fn delete_assignment(&self, id: i64) -> Result<bool> {
        self.delete_assignment_impl(id).await
    }

    // 提交模块
    async fn get_submission(
        &self,
        student_id: &str,
        assignment_id: i64,
    ) -> Result<Option<Submission>> {
        self.get_submission_impl(student_id, assignment_id).await
    }

    async fn upsert_submission(&self, input: UpsertSubmission) -> Result<Submission> {
        self.upsert_submission_impl(input).await
    }

    async fn update_submission(&self, input: UpsertSubmission) -> Result<Option<Submission>> {
        self.update_submission_impl(input).await
    }

    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>> {
        self.get_submission_by_id_impl(id).await
    }

    async fn delete_submission(
        &self,
        student_id: &str,
        assignment_id: i64,
    ) -> Result<Option<Submission>> {
        self.delete_submission_impl(student_id, assignment_id).await
    }

    async fn delete_submission_by_id(&self, id: i64) -> Result<Option<Submission>> {
        self.delete_submission_by_id_impl(id).await
    }

    async fn list_submissions_by_assignment(
        &self,
        assignment_id: i64,
        page: Option<i64>,
        size: Option<i64>,
    ) -> Result<(Vec<Submission>, PaginationInfo)> {
        self.list_submissions_by_assignment_impl(assignment_id, page, size)
            .await
    }

    async fn list_submitted_assignment_ids(
        &self,
        student_id: &str,
        assignment_ids: &[i64],
    ) -> Result<Vec<i64>> {
        self.list_submitted_assignment_ids_impl(student_id, assignment_ids)
            .await
    }

    async fn count_submissions_by_assignment(
        &self,
        assignment_ids: &[i64],
    ) -> Result<HashMap<i64, u64>> {
        self.count_submissions_by_assignment_impl(assignment_ids)
            .await
    }

    // 影片模块
    async fn create_video(&self, video: CreateVideoInput) -> Result<VideoMaterial> {
        self.create_video_impl(video).await
    }

    async fn get_video_by_id(&self, id: i64) -> Result<Option<VideoMaterial>> {
        self.get_video_by_id_impl(id).await
    }

    async fn list_videos(&self) -> Result<Vec<VideoMaterial>> {
        self.list_videos_impl().await
    }

    async fn delete_video(&self, id: i64) -> Result<Option<VideoMaterial>> {
        self.delete_video_impl(id).await
    }

    // 第三方登录模块
    async fn list_oauth_configs(&self) -> Result<Vec<OAuthConfig>> {
        self.list_oauth_configs_impl(false).await
    }

    async fn list_enabled_oauth_configs(&self) -> Result<Vec<OAuthConfig>> {
        self.list_oauth_configs_impl(true).await
    }

    async fn get_oauth_config_by_id(&self, id: i64) -> Result<Option<OAuthConfig>> {
        self.get_oauth_config_by_id_impl(id).await
    }

    async fn create_oauth_config(&self, req: CreateOAuthConfigRequest) -> Result<OAuthConfig> {
        self.create_oauth_config_impl(req).await
    }

    async fn update_oauth_config(
        &self,
        id: i64,
        update: UpdateOAuthConfigRequest,
    ) -> Result<Option<OAuthConfig>> {
        self.update_oauth_config_impl(id, update).await
    }

    async fn delete_oauth_config(&self, id: i64) -> Result<bool> {
        self.delete_oauth_config_impl(id).await
    }

    async fn upsert_oauth_user(&self, input: UpsertOAuthUser) -> Result<OAuthUser> {
        self.upsert_oauth_user_impl(input).await
    }

    async fn link_oauth_user(&self, id: i64, user_id: i64) -> Result<bool> {
        self.link_oauth_user_impl(id, user_id).await
    }

    async fn list_oauth_users(
        &self,
        params: OAuthUserListParams,
    ) -> Result<OAuthUserListResponse> {
        self.list_oauth_users_impl(params).await
    }
}
