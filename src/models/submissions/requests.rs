use serde::Deserialize;

/// 已落盘的附件
#[derive(Debug, Clone)]
pub struct StoredAttachment {
    pub path: String,
    pub file_name: String,
}

/// 写入（新建或覆盖）一条提交
#[derive(Debug, Clone)]
pub struct UpsertSubmission {
    pub student_id: String,
    pub assignment_id: i64,
    pub content: String,
    /// None 表示保留原附件
    pub attachment: Option<StoredAttachment>,
}

/// 纯 JSON 方式提交（无附件）
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionContentRequest {
    pub content: String,
}

// 某作业下的提交列表查询参数
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionListParams {
    #[serde(flatten)]
    pub pagination: crate::models::PaginationQuery,
}
