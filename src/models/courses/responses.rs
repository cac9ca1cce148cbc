use super::entities::Course;
use crate::models::PaginationInfo;
use crate::models::assignments::entities::Assignment;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CourseListResponse {
    pub items: Vec<Course>,
    pub pagination: PaginationInfo,
}

// 课程详情：课程本身及其作业
#[derive(Debug, Serialize)]
pub struct CourseDetailResponse {
    pub course: Course,
    pub url: String,
    pub assignments: Vec<Assignment>,
}
