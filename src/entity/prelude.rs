//! 预导入模块，方便使用

pub use super::assignments::{
    ActiveModel as AssignmentActiveModel, Entity as Assignments, Model as AssignmentModel,
};
pub use super::courses::{ActiveModel as CourseActiveModel, Entity as Courses, Model as CourseModel};
pub use super::oauth_configs::{
    ActiveModel as OAuthConfigActiveModel, Entity as OAuthConfigs, Model as OAuthConfigModel,
};
pub use super::oauth_users::{
    ActiveModel as OAuthUserActiveModel, Entity as OAuthUsers, Model as OAuthUserModel,
};
pub use super::student_assignments::{
    ActiveModel as StudentAssignmentActiveModel, Entity as StudentAssignments,
    Model as StudentAssignmentModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
pub use super::video_materials::{
    ActiveModel as VideoMaterialActiveModel, Entity as VideoMaterials,
    Model as VideoMaterialModel,
};
