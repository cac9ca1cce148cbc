use std::collections::HashMap;
use std::sync::Arc;

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

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过用户名或邮箱获取用户信息
    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>>;
    // 更新用户信息
    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>>;
    // 更新用户最后登录时间
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    // 统计用户数量
    async fn count_users(&self) -> Result<u64>;

    /// 课程管理方法
    async fn create_course(&self, course: CreateCourseRequest) -> Result<Course>;
    async fn get_course_by_id(&self, id: i64) -> Result<Option<Course>>;
    async fn list_courses_with_pagination(
        &self,
        query: CourseListQuery,
    ) -> Result<CourseListResponse>;
    async fn update_course(&self, id: i64, update: UpdateCourseRequest)
    -> Result<Option<Course>>;
    // 删除课程，其下作业与提交级联删除
    async fn delete_course(&self, id: i64) -> Result<bool>;

    /// 作业管理方法
    async fn create_assignment(&self, assignment: CreateAssignmentRequest) -> Result<Assignment>;
    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>>;
    async fn list_assignments_with_pagination(
        &self,
        query: AssignmentListQuery,
    ) -> Result<(Vec<Assignment>, PaginationInfo)>;
    // 列出课程下的全部作业
    async fn list_course_assignments(&self, course_id: i64) -> Result<Vec<Assignment>>;
    async fn update_assignment(
        &self,
        id: i64,
        update: UpdateAssignmentRequest,
    ) -> Result<Option<Assignment>>;
    async fn delete_assignment(&self, id: i64) -> Result<bool>;

    /// 提交管理方法
    // 按 (学号, 作业) 获取唯一的提交
    async fn get_submission(
        &self,
        student_id: &str,
        assignment_id: i64,
    ) -> Result<Option<Submission>>;
    // 原子写入：不存在则插入，存在则覆盖
    async fn upsert_submission(&self, input: UpsertSubmission) -> Result<Submission>;
    // 只修改已有的提交，不存在时返回 None，不会新建
    async fn update_submission(&self, input: UpsertSubmission) -> Result<Option<Submission>>;
    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>>;
    // 删除并返回被删除的提交
    async fn delete_submission(
        &self,
        student_id: &str,
        assignment_id: i64,
    ) -> Result<Option<Submission>>;
    async fn delete_submission_by_id(&self, id: i64) -> Result<Option<Submission>>;
    async fn list_submissions_by_assignment(
        &self,
        assignment_id: i64,
        page: Option<i64>,
        size: Option<i64>,
    ) -> Result<(Vec<Submission>, PaginationInfo)>;
    // 给定作业中该学生已提交的作业 ID
    async fn list_submitted_assignment_ids(
        &self,
        student_id: &str,
        assignment_ids: &[i64],
    ) -> Result<Vec<i64>>;
    // 每个作业的提交数
    async fn count_submissions_by_assignment(
        &self,
        assignment_ids: &[i64],
    ) -> Result<HashMap<i64, u64>>;

    /// 影片教材管理方法
    async fn create_video(&self, video: CreateVideoInput) -> Result<VideoMaterial>;
    async fn get_video_by_id(&self, id: i64) -> Result<Option<VideoMaterial>>;
    async fn list_videos(&self) -> Result<Vec<VideoMaterial>>;
    async fn delete_video(&self, id: i64) -> Result<Option<VideoMaterial>>;

    /// 第三方登录配置
    async fn list_oauth_configs(&self) -> Result<Vec<OAuthConfig>>;
    async fn list_enabled_oauth_configs(&self) -> Result<Vec<OAuthConfig>>;
    async fn get_oauth_config_by_id(&self, id: i64) -> Result<Option<OAuthConfig>>;
    async fn create_oauth_config(&self, req: CreateOAuthConfigRequest) -> Result<OAuthConfig>;
    async fn update_oauth_config(
        &self,
        id: i64,
        update: UpdateOAuthConfigRequest,
    ) -> Result<Option<OAuthConfig>>;
    async fn delete_oauth_config(&self, id: i64) -> Result<bool>;

    /// 第三方用户
    // 按 (provider_type, open_id) 写入或刷新
    async fn upsert_oauth_user(&self, input: UpsertOAuthUser) -> Result<OAuthUser>;
    async fn link_oauth_user(&self, id: i64, user_id: i64) -> Result<bool>;
    async fn list_oauth_users(&self, params: OAuthUserListParams)
    -> Result<OAuthUserListResponse>;
}

/// 按配置创建存储后端并完成迁移
pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
