pub mod content;
pub mod pagination;
pub mod response;

pub use content::{ContentEntity, full_url};
pub use pagination::{PaginationInfo, PaginationQuery};
pub use response::ApiResponse;
