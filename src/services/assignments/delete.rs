use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::header};

use super::submit::SUBMITTED_REDIRECT;
use super::{AssignmentService, current_student, find_assignment};
use crate::middlewares::wants_html;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;
use crate::services::files::remove_stored_file;
use crate::utils::deadline;

/// 删除当前学生在该作业下的提交
pub async fn delete_submission(
    service: &AssignmentService,
    request: &HttpRequest,
    assignment_id: i64,
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

    if let Err(e) = deadline::ensure_open(assignment.deadline, chrono::Utc::now()) {
        return Ok(error_response(&e));
    }

    // 删除条件同时包含学号，无法删到他人的提交
    let deleted = match storage.delete_submission(&student_id, assignment.id).await {
        Ok(Some(deleted)) => deleted,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::SubmissionNotFound,
                "Submission not found",
            )));
        }
        Err(e) => return Ok(error_response(&e)),
    };

    if let Some(path) = &deleted.file_path {
        remove_stored_file(path).await;
    }

    tracing::info!(
        "Student {} withdrew submission for assignment {}",
        student_id,
        assignment.id
    );

    if wants_html(request) {
        return Ok(HttpResponse::SeeOther()
            .insert_header((header::LOCATION, SUBMITTED_REDIRECT))
            .finish());
    }

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_empty("提交已删除")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assignments::requests::UpdateAssignmentRequest;
    use crate::models::submissions::requests::UpsertSubmission;
    use crate::routes::assignments::delete_submission;
    use crate::services::assignments::submit::tests::fixture;
    use crate::storage::Storage;
    use actix_service::Service;
    use actix_web::{App, HttpMessage, http::StatusCode, test, web};
    use std::sync::Arc;

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
                    .route("/assignment/delete/{id}", web::post().to(delete_submission)),
            )
            .await
        }};
    }

    async fn submit(storage: &Arc<dyn Storage>, student_id: &str, assignment_id: i64) {
        storage
            .upsert_submission(UpsertSubmission {
                student_id: student_id.to_string(),
                assignment_id,
                content: "answer".to_string(),
                attachment: None,
            })
            .await
            .expect("submit");
    }

    #[actix_web::test]
    async fn test_delete_own_submission_only() {
        let (storage, user, assignment_id) = fixture().await;
        submit(&storage, "b0912345", assignment_id).await;
        submit(&storage, "b0954321", assignment_id).await;
        let app = app!(storage, user);

        let req = test::TestRequest::post()
            .uri(&format!("/assignment/delete/{assignment_id}"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        assert!(
            storage
                .get_submission("b0912345", assignment_id)
                .await
                .expect("query")
                .is_none()
        );
        // 同作业下其他学生的提交不受影响
        assert!(
            storage
                .get_submission("b0954321", assignment_id)
                .await
                .expect("query")
                .is_some()
        );

        let req = test::TestRequest::post()
            .uri(&format!("/assignment/delete/{assignment_id}"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_browser_delete_redirects_to_listing() {
        let (storage, user, assignment_id) = fixture().await;
        submit(&storage, "b0912345", assignment_id).await;
        let app = app!(storage, user);

        let req = test::TestRequest::post()
            .uri(&format!("/assignment/delete/{assignment_id}"))
            .insert_header((header::ACCEPT, "text/html"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            resp.headers().get(header::LOCATION).and_then(|h| h.to_str().ok()),
            Some(SUBMITTED_REDIRECT)
        );
    }

    #[actix_web::test]
    async fn test_delete_after_deadline_is_forbidden() {
        let (storage, user, assignment_id) = fixture().await;
        submit(&storage, "b0912345", assignment_id).await;
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
            .uri(&format!("/assignment/delete/{assignment_id}"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], ErrorCode::AssignmentDeadlinePassed as i32);
        assert!(
            storage
                .get_submission("b0912345", assignment_id)
                .await
                .expect("query")
                .is_some()
        );
    }
}
