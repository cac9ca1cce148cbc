//! 影片教材实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "video_materials")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub deadline: i64,
    pub video_path: String,
    pub file_name: String,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_video(self) -> crate::models::videos::entities::VideoMaterial {
        crate::models::videos::entities::VideoMaterial {
            id: self.id,
            title: self.title,
            description: self.description,
            deadline: super::from_timestamp(self.deadline),
            video_path: self.video_path,
            file_name: self.file_name,
            created_at: super::from_timestamp(self.created_at),
        }
    }
}
