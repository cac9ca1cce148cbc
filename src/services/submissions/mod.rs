pub mod delete;
pub mod detail;
pub mod download;
pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::{CourseHubError, Result};
use crate::models::submissions::{entities::Submission, requests::SubmissionListParams};
use crate::models::users::entities::User;
use crate::storage::Storage;
use crate::utils::identity::resolve_student_id;

pub struct SubmissionService {
    storage: Option<Arc<dyn Storage>>,
}

impl SubmissionService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    /// 获取提交详情
    pub async fn get_submission(
        &self,
        request: &HttpRequest,
        submission_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::get_submission(self, request, submission_id).await
    }

    /// 删除提交
    pub async fn delete_submission(
        &self,
        request: &HttpRequest,
        submission_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_submission(self, request, submission_id).await
    }

    /// 下载提交附件
    pub async fn download_attachment(
        &self,
        request: &HttpRequest,
        submission_id: i64,
    ) -> ActixResult<HttpResponse> {
        download::download_attachment(self, request, submission_id).await
    }

    /// 某作业下的全部提交（管理端）
    pub async fn list_submissions(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
        params: SubmissionListParams,
    ) -> ActixResult<HttpResponse> {
        list::list_submissions(self, request, assignment_id, params).await
    }
}

/// 提交归属检查：管理员可访问任意提交，学生只能访问自己学号下的提交
pub(crate) fn ensure_owner(user: &User, submission: &Submission) -> Result<()> {
    if user.is_admin() {
        return Ok(());
    }
    let student_id = resolve_student_id(&user.username)?;
    if submission.student_id != student_id {
        return Err(CourseHubError::authorization("无权访问他人的提交"));
    }
    Ok(())
}

/// 按 ID 加载提交并检查归属；不存在为 NotFound，他人所有为 Authorization
pub(crate) async fn load_owned(
    storage: &Arc<dyn Storage>,
    user: &User,
    submission_id: i64,
) -> Result<Submission> {
    let submission = storage
        .get_submission_by_id(submission_id)
        .await?
        .ok_or_else(|| CourseHubError::not_found("提交不存在"))?;
    ensure_owner(user, &submission)?;
    Ok(submission)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::{UserRole, UserStatus};

    fn user(username: &str, role: UserRole) -> User {
        let now = chrono::Utc::now();
        User {
            id: 1,
            username: username.to_string(),
            email: username.to_string(),
            password_hash: String::new(),
            role,
            status: UserStatus::Active,
            display_name: None,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn submission(student_id: &str) -> Submission {
        let now = chrono::Utc::now();
        Submission {
            id: 7,
            student_id: student_id.to_string(),
            assignment_id: 1,
            content: "answer".to_string(),
            file_path: None,
            file_name: None,
            submitted_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_owner_may_access() {
        let alice = user("alice@school.edu", UserRole::User);
        assert!(ensure_owner(&alice, &submission("alice")).is_ok());
    }

    #[test]
    fn test_other_student_is_forbidden() {
        let bob = user("bob@school.edu", UserRole::User);
        let err = ensure_owner(&bob, &submission("alice")).unwrap_err();
        assert_eq!(err.code(), "E012");
    }

    #[test]
    fn test_admin_may_access_any() {
        let admin = user("admin@coursehub.local", UserRole::Admin);
        assert!(ensure_owner(&admin, &submission("alice")).is_ok());
    }
}
