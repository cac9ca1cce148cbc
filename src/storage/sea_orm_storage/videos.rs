//! 影片教材存储操作

use super::SeaOrmStorage;
use crate::entity::video_materials::{ActiveModel, Column, Entity as VideoMaterials};
use crate::errors::{CourseHubError, Result};
use crate::models::videos::{entities::VideoMaterial, requests::CreateVideoInput};
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};

impl SeaOrmStorage {
    pub async fn create_video_impl(&self, input: CreateVideoInput) -> Result<VideoMaterial> {
        let model = ActiveModel {
            title: Set(input.title),
            description: Set(input.description),
            deadline: Set(input.deadline.timestamp()),
            video_path: Set(input.video_path),
            file_name: Set(input.file_name),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| CourseHubError::database_operation(format!("创建影片失败: {e}")))?;

        Ok(result.into_video())
    }

    pub async fn get_video_by_id_impl(&self, id: i64) -> Result<Option<VideoMaterial>> {
        let result = VideoMaterials::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| CourseHubError::database_operation(format!("查询影片失败: {e}")))?;

        Ok(result.map(|m| m.into_video()))
    }

    pub async fn list_videos_impl(&self) -> Result<Vec<VideoMaterial>> {
        let videos = VideoMaterials::find()
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| CourseHubError::database_operation(format!("查询影片列表失败: {e}")))?;

        Ok(videos.into_iter().map(|m| m.into_video()).collect())
    }

    /// 删除影片，返回被删除的记录以便清理文件
    pub async fn delete_video_impl(&self, id: i64) -> Result<Option<VideoMaterial>> {
        let Some(existing) = self.get_video_by_id_impl(id).await? else {
            return Ok(None);
        };

        VideoMaterials::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| CourseHubError::database_operation(format!("删除影片失败: {e}")))?;

        Ok(Some(existing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_video_lifecycle() {
        let storage = SeaOrmStorage::in_memory().await.expect("storage");
        let video = storage
            .create_video_impl(CreateVideoInput {
                title: "Lecture 1".to_string(),
                description: None,
                deadline: Utc::now() + Duration::days(7),
                video_path: "videos/abc-lecture1.mp4".to_string(),
                file_name: "lecture1.mp4".to_string(),
            })
            .await
            .expect("create");

        assert_eq!(storage.list_videos_impl().await.expect("list").len(), 1);
        assert!(!video.is_deadline(Utc::now()));

        let deleted = storage
            .delete_video_impl(video.id)
            .await
            .expect("delete")
            .expect("existed");
        assert_eq!(deleted.video_path, "videos/abc-lecture1.mp4");
        assert!(storage.get_video_by_id_impl(video.id).await.expect("get").is_none());
    }
}
