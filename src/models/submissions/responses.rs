use super::entities::Submission;
use crate::models::PaginationInfo;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    #[serde(flatten)]
    pub submission: Submission,
    /// 附件下载地址，没有附件时为空
    pub file_url: Option<String>,
}

impl From<Submission> for SubmissionResponse {
    fn from(submission: Submission) -> Self {
        let file_url = submission
            .has_attachment()
            .then(|| format!("/api/v1/submissions/{}/file", submission.id));
        Self {
            submission,
            file_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubmissionListResponse {
    pub assignment_id: i64,
    pub items: Vec<SubmissionResponse>,
    pub pagination: PaginationInfo,
}
