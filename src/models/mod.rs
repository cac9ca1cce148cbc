pub mod assignments;
pub mod auth;
pub mod common;
pub mod courses;
pub mod oauth;
pub mod submissions;
pub mod users;
pub mod videos;

pub use common::{ApiResponse, ContentEntity, PaginationInfo, PaginationQuery, full_url};

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// 业务错误码
///
/// 以千位分段：1xxx 通用，2xxx 认证与用户，3xxx 文件，4xxx 课程与作业，5xxx OAuth。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    Conflict = 1009,
    RateLimitExceeded = 1029,
    InternalServerError = 1500,

    AuthFailed = 2000,
    RegisterFailed = 2001,
    UserNameInvalid = 2002,
    UserEmailInvalid = 2003,
    UserPasswordInvalid = 2004,
    UserNameAlreadyExists = 2005,
    UserEmailAlreadyExists = 2006,
    UserNotFound = 2007,
    UserInactive = 2008,

    FileNotFound = 3000,
    FileUploadFailed = 3001,
    FileTypeNotAllowed = 3002,
    FileSizeExceeded = 3003,
    MultifileUploadNotAllowed = 3004,

    CourseNotFound = 4000,
    CourseInvalid = 4001,
    AssignmentNotFound = 4100,
    AssignmentInvalid = 4101,
    AssignmentDeadlinePassed = 4102,
    SubmissionNotFound = 4200,
    SubmissionInvalid = 4201,
    SubmissionConflict = 4202,
    StudentIdInvalid = 4203,
    VideoNotFound = 4300,
    VideoInvalid = 4301,

    OAuthProviderNotFound = 5000,
    OAuthConfigInvalid = 5001,
    OAuthConfigNotFound = 5002,
    OAuthLoginFailed = 5003,
    OAuthTimeout = 5004,
    OAuthIdentityUnavailable = 5005,
    OAuthStateInvalid = 5006,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success as i32, 0);
        assert_eq!(ErrorCode::AssignmentDeadlinePassed as i32, 4102);
        assert_eq!(ErrorCode::OAuthTimeout as i32, 5004);
    }
}
