use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::header};

use super::{AssignmentService, current_student, find_assignment};
use crate::config::AppConfig;
use crate::middlewares::wants_html;
use crate::models::submissions::{
    requests::{StoredAttachment, SubmissionContentRequest, UpsertSubmission},
    responses::SubmissionResponse,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;
use crate::services::files::{UploadRules, read_multipart_form, remove_stored_file};
use crate::utils::deadline;
use crate::utils::validate::validate_length;

/// 提交内容的最大字符数
pub const MAX_CONTENT_CHARS: usize = 20_000;

/// 提交成功后浏览器跳转的作业列表页
pub const SUBMITTED_REDIRECT: &str = "/assignment";

fn submission_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::SubmissionNotFound,
        "Submission not found",
    ))
}

/// 提交请求体：表单（可带附件）或纯 JSON
pub enum SubmissionPayload {
    Form(Multipart),
    Json(SubmissionContentRequest),
}

pub async fn submit(
    service: &AssignmentService,
    request: &HttpRequest,
    assignment_id: i64,
    payload: SubmissionPayload,
    require_existing: bool,
) -> ActixResult<HttpResponse> {
    let (_, student_id) = match current_student(request) {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let assignment = match find_assignment(&storage, assignment_id).await {
        Ok(assignment) => assignment,
        Err(resp) => return Ok(resp),
    };

    // 截止后不再接受任何写入
    if let Err(e) = deadline::ensure_open(assignment.deadline, chrono::Utc::now()) {
        return Ok(error_response(&e));
    }

    let previous = match storage.get_submission(&student_id, assignment.id).await {
        Ok(previous) => previous,
        Err(e) => return Ok(error_response(&e)),
    };
    if require_existing && previous.is_none() {
        return Ok(submission_not_found());
    }

    let (content, attachment) = match payload {
        SubmissionPayload::Json(body) => (body.content, None),
        SubmissionPayload::Form(multipart) => {
            let upload = &AppConfig::get().upload;
            let rules = UploadRules {
                allowed_types: &upload.allowed_types,
                max_size: upload.max_size,
                subdir: format!("assignment/{}", assignment.id),
            };
            let mut form = match read_multipart_form(multipart, &rules).await {
                Ok(form) => form,
                Err(resp) => return Ok(resp),
            };
            let content = form.fields.remove("content").unwrap_or_default();
            let attachment = form.file.map(|saved| StoredAttachment {
                path: saved.path,
                file_name: saved.file_name,
            });
            (content, attachment)
        }
    };

    if let Err(msg) = validate_length("content", &content, 1, MAX_CONTENT_CHARS) {
        if let Some(attachment) = &attachment {
            remove_stored_file(&attachment.path).await;
        }
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::SubmissionInvalid, msg)));
    }

    let replaces_file = attachment.is_some();
    let input = UpsertSubmission {
        student_id: student_id.clone(),
        assignment_id: assignment.id,
        content,
        attachment: attachment.clone(),
    };

    // 修改只作用于已有的行，期间被删除的提交不会被重新创建
    let written = if require_existing {
        storage.update_submission(input).await
    } else {
        storage.upsert_submission(input).await.map(Some)
    };
    let submission = match written {
        Ok(Some(submission)) => submission,
        Ok(None) => {
            if let Some(attachment) = &attachment {
                remove_stored_file(&attachment.path).await;
            }
            return Ok(submission_not_found());
        }
        Err(e) => {
            if let Some(attachment) = &attachment {
                remove_stored_file(&attachment.path).await;
            }
            return Ok(error_response(&e));
        }
    };

    // 新附件替换了旧附件，旧文件不再被引用
    if replaces_file
        && let Some(old_path) = previous.and_then(|p| p.file_path)
        && submission.file_path.as_deref() != Some(old_path.as_str())
    {
        remove_stored_file(&old_path).await;
    }

    tracing::info!(
        "Student {} submitted assignment {}",
        student_id,
        assignment.id
    );

    if wants_html(request) {
        return Ok(HttpResponse::SeeOther()
            .insert_header((header::LOCATION, SUBMITTED_REDIRECT))
            .finish());
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        SubmissionResponse::from(submission),
        "提交成功",
    )))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::assignments::requests::UpdateAssignmentRequest;
    use crate::models::users::entities::User;
    use crate::services::files::upload::tests::{multipart_body, multipart_content_type};
    use crate::storage::Storage;
    use crate::storage::sea_orm_storage::{
        SeaOrmStorage, assignments::tests::new_assignment, courses::tests::new_course,
        users::tests::new_user,
    };
    use actix_service::Service;
    use actix_web::{App, HttpMessage, http::StatusCode, test, web};
    use std::sync::Arc;

    async fn submit_form(req: HttpRequest, path: web::Path<i64>, payload: Multipart) -> ActixResult<HttpResponse> {
        AssignmentService::new_lazy()
            .submit(&req, path.into_inner(), SubmissionPayload::Form(payload))
            .await
    }

    async fn submit_json(
        req: HttpRequest,
        path: web::Path<i64>,
        body: web::Json<SubmissionContentRequest>,
    ) -> ActixResult<HttpResponse> {
        AssignmentService::new_lazy()
            .submit(&req, path.into_inner(), SubmissionPayload::Json(body.into_inner()))
            .await
    }

    /// 一个学生与一份明天截止的作业
    pub(crate) async fn fixture() -> (Arc<dyn Storage>, User, i64) {
        let storage: Arc<dyn Storage> =
            Arc::new(SeaOrmStorage::in_memory().await.expect("storage"));
        let user = storage
            .create_user(new_user("b0912345@school.edu"))
            .await
            .expect("user");
        let course = storage.create_course(new_course("Rust")).await.expect("course");
        let mut assignment = new_assignment(Some(course.id), "HW1");
        assignment.deadline = Some(chrono::Utc::now() + chrono::Duration::days(1));
        let assignment = storage
            .create_assignment(assignment)
            .await
            .expect("assignment");
        (storage, user, assignment.id)
    }

    macro_rules! app {
        ($storage:expr, $user:expr) => {{
            let user = $user.clone();
            test::init_service(
                App::new()
                    .app_data(web::Data::new($storage.clone()))
                    .wrap_fn(move |req, srv| {
                        req.extensions_mut().insert(user.clone());
                        srv.call(req)
                    })
                    .route("/submit/{id}", web::post().to(submit_form))
                    .route("/submit-json/{id}", web::post().to(submit_json))
                    .route(
                        "/update-json/{id}",
                        web::put().to(crate::routes::assignments::update_json),
                    ),
            )
            .await
        }};
    }

    #[actix_web::test]
    async fn test_json_submission_then_overwrite() {
        let (storage, user, assignment_id) = fixture().await;
        let app = app!(storage, user);

        for content in ["first", "second"] {
            let req = test::TestRequest::post()
                .uri(&format!("/submit-json/{assignment_id}"))
                .set_json(serde_json::json!({ "content": content }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
        }

        let submission = storage
            .get_submission("b0912345", assignment_id)
            .await
            .expect("query")
            .expect("exists");
        assert_eq!(submission.content, "second");
        let (rows, _) = storage
            .list_submissions_by_assignment(assignment_id, None, None)
            .await
            .expect("list");
        assert_eq!(rows.len(), 1);
    }

    #[actix_web::test]
    async fn test_browser_form_redirects_to_listing() {
        let (storage, user, assignment_id) = fixture().await;
        let app = app!(storage, user);

        let req = test::TestRequest::post()
            .uri(&format!("/submit/{assignment_id}"))
            .insert_header((header::ACCEPT, "text/html"))
            .insert_header((header::CONTENT_TYPE, multipart_content_type()))
            .set_payload(multipart_body(&[("content", None, b"my answer")]))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            resp.headers().get(header::LOCATION).and_then(|h| h.to_str().ok()),
            Some(SUBMITTED_REDIRECT)
        );
    }

    #[actix_web::test]
    async fn test_missing_content_is_rejected() {
        let (storage, user, assignment_id) = fixture().await;
        let app = app!(storage, user);

        let req = test::TestRequest::post()
            .uri(&format!("/submit-json/{assignment_id}"))
            .set_json(serde_json::json!({ "content": "   " }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(
            storage
                .get_submission("b0912345", assignment_id)
                .await
                .expect("query")
                .is_none()
        );
    }

    #[actix_web::test]
    async fn test_past_deadline_is_rejected() {
        let (storage, user, assignment_id) = fixture().await;
        storage
            .update_assignment(
                assignment_id,
                UpdateAssignmentRequest {
                    deadline: Some(chrono::Utc::now() - chrono::Duration::minutes(1)),
                    ..Default::default()
                },
            )
            .await
            .expect("update");
        let app = app!(storage, user);

        let req = test::TestRequest::post()
            .uri(&format!("/submit-json/{assignment_id}"))
            .set_json(serde_json::json!({ "content": "late" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], ErrorCode::AssignmentDeadlinePassed as i32);
    }

    #[actix_web::test]
    async fn test_unknown_assignment_is_not_found() {
        let (storage, user, _) = fixture().await;
        let app = app!(storage, user);

        let req = test::TestRequest::post()
            .uri("/submit-json/9999")
            .set_json(serde_json::json!({ "content": "x" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_update_without_submission_is_not_found() {
        let (storage, user, assignment_id) = fixture().await;
        let app = app!(storage, user);

        let req = test::TestRequest::put()
            .uri(&format!("/update-json/{assignment_id}"))
            .set_json(serde_json::json!({ "content": "edit" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], ErrorCode::SubmissionNotFound as i32);

        // 修改不会顺带创建提交
        assert!(
            storage
                .get_submission("b0912345", assignment_id)
                .await
                .expect("query")
                .is_none()
        );
    }

    #[actix_web::test]
    async fn test_update_edits_existing_submission() {
        let (storage, user, assignment_id) = fixture().await;
        let app = app!(storage, user);

        let req = test::TestRequest::post()
            .uri(&format!("/submit-json/{assignment_id}"))
            .set_json(serde_json::json!({ "content": "draft" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::put()
            .uri(&format!("/update-json/{assignment_id}"))
            .set_json(serde_json::json!({ "content": "final" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["content"], "final");
    }
}
