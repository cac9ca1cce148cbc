use super::entities::Assignment;
use crate::models::PaginationInfo;
use crate::models::submissions::entities::Submission;
use serde::Serialize;

// 学生视角的作业列表项
#[derive(Debug, Serialize)]
pub struct AssignmentListItem {
    #[serde(flatten)]
    pub assignment: Assignment,
    pub is_deadline: bool,
    /// 当前学生是否已提交
    pub submitted: bool,
}

#[derive(Debug, Serialize)]
pub struct AssignmentListResponse {
    pub items: Vec<AssignmentListItem>,
    pub pagination: PaginationInfo,
}

// 作业详情：作业、截止状态与当前学生的提交
#[derive(Debug, Serialize)]
pub struct AssignmentDetailResponse {
    pub assignment: Assignment,
    pub url: String,
    pub student_id: String,
    pub is_deadline: bool,
    pub is_uploaded: bool,
    pub submission: Option<Submission>,
}

// 管理端作业列表项，附带提交数
#[derive(Debug, Serialize)]
pub struct AdminAssignmentListItem {
    #[serde(flatten)]
    pub assignment: Assignment,
    pub submission_count: u64,
}

#[derive(Debug, Serialize)]
pub struct AdminAssignmentListResponse {
    pub items: Vec<AdminAssignmentListItem>,
    pub pagination: PaginationInfo,
}
