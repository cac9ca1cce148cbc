use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AssignmentService, current_student, find_assignment};
use crate::models::assignments::responses::AssignmentDetailResponse;
use crate::models::submissions::responses::SubmissionResponse;
use crate::models::{ApiResponse, ContentEntity, ErrorCode};
use crate::services::error_response;

pub async fn get_assignment(
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

    // 查询失败不能当作“尚未提交”
    let submission = match storage.get_submission(&student_id, assignment.id).await {
        Ok(submission) => submission,
        Err(e) => return Ok(error_response(&e)),
    };

    let response = AssignmentDetailResponse {
        url: assignment.absolute_url(),
        is_deadline: assignment.is_deadline(chrono::Utc::now()),
        is_uploaded: submission.is_some(),
        student_id,
        assignment,
        submission,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        response,
        "Assignment retrieved successfully",
    )))
}

pub async fn get_own_submission(
    service: &AssignmentService,
    request: &HttpRequest,
    assignment_id: i64,
) -> ActixResult<HttpResponse> {
    let (_, student_id) = match current_student(request) {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    if let Err(resp) = find_assignment(&storage, assignment_id).await {
        return Ok(resp);
    }

    match storage.get_submission(&student_id, assignment_id).await {
        Ok(Some(submission)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            SubmissionResponse::from(submission),
            "Submission retrieved successfully",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::SubmissionNotFound,
            "Submission not found",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}

#[cfg(test)]
mod tests {
    use crate::models::assignments::requests::UpdateAssignmentRequest;
    use crate::models::submissions::requests::UpsertSubmission;
    use crate::routes::assignments::{get_assignment, get_own_submission};
    use crate::services::assignments::submit::tests::fixture;
    use crate::storage::Storage;
    use actix_service::Service;
    use actix_web::{App, HttpMessage, http::StatusCode, test, web};

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
                    .route("/assignment/{id}", web::get().to(get_assignment))
                    .route("/assignment/update/{id}", web::get().to(get_own_submission)),
            )
            .await
        }};
    }

    #[actix_web::test]
    async fn test_detail_reports_upload_and_deadline_state() {
        let (storage, user, assignment_id) = fixture().await;
        let app = app!(storage, user);

        let req = test::TestRequest::get()
            .uri(&format!("/assignment/{assignment_id}"))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["student_id"], "b0912345");
        assert_eq!(body["data"]["is_uploaded"], false);
        assert_eq!(body["data"]["is_deadline"], false);
        assert!(body["data"]["submission"].is_null());

        storage
            .upsert_submission(UpsertSubmission {
                student_id: "b0912345".to_string(),
                assignment_id,
                content: "my answer".to_string(),
                attachment: None,
            })
            .await
            .expect("submit");
        storage
            .update_assignment(
                assignment_id,
                UpdateAssignmentRequest {
                    deadline: Some(chrono::Utc::now() - chrono::Duration::hours(1)),
                    ..Default::default()
                },
            )
            .await
            .expect("update");

        let req = test::TestRequest::get()
            .uri(&format!("/assignment/{assignment_id}"))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["is_uploaded"], true);
        assert_eq!(body["data"]["is_deadline"], true);
        assert_eq!(body["data"]["submission"]["content"], "my answer");
    }

    #[actix_web::test]
    async fn test_own_submission_view_is_not_found_before_submitting() {
        let (storage, user, assignment_id) = fixture().await;
        let app = app!(storage, user);

        let req = test::TestRequest::get()
            .uri(&format!("/assignment/update/{assignment_id}"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
