use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CourseService;
use crate::models::courses::responses::CourseDetailResponse;
use crate::models::{ApiResponse, ContentEntity, ErrorCode};

pub async fn get_course(
    service: &CourseService,
    request: &HttpRequest,
    course_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let course = match storage.get_course_by_id(course_id).await {
        Ok(Some(course)) => course,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::CourseNotFound,
                "Course not found",
            )));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to retrieve course: {e}"),
                )),
            );
        }
    };

    match storage.list_course_assignments(course.id).await {
        Ok(assignments) => {
            let url = course.absolute_url();
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                CourseDetailResponse {
                    course,
                    url,
                    assignments,
                },
                "Course retrieved successfully",
            )))
        }
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to retrieve assignments: {e}"),
            )),
        ),
    }
}

#[cfg(test)]
mod tests {
    use crate::models::ErrorCode;
    use crate::routes::courses::get_course;
    use crate::storage::Storage;
    use crate::storage::sea_orm_storage::{
        SeaOrmStorage, assignments::tests::new_assignment, courses::tests::new_course,
    };
    use actix_web::{App, http::StatusCode, test, web};
    use std::sync::Arc;

    #[actix_web::test]
    async fn test_course_detail_lists_only_its_assignments() {
        let storage: Arc<dyn Storage> =
            Arc::new(SeaOrmStorage::in_memory().await.expect("storage"));
        let rust = storage.create_course(new_course("Rust")).await.expect("course");
        let go = storage.create_course(new_course("Go")).await.expect("course");
        for name in ["HW1", "HW2"] {
            storage
                .create_assignment(new_assignment(Some(rust.id), name))
                .await
                .expect("assignment");
        }
        storage
            .create_assignment(new_assignment(Some(go.id), "HW1"))
            .await
            .expect("assignment");

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage.clone()))
                .route("/courses/{id}", web::get().to(get_course)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri(&format!("/courses/{}", rust.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        let assignments = body["data"]["assignments"].as_array().expect("assignments");
        assert_eq!(assignments.len(), 2);
        assert!(assignments.iter().all(|a| a["course_id"] == rust.id));

        let req = test::TestRequest::get().uri("/courses/9999").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], ErrorCode::CourseNotFound as i32);
    }
}
