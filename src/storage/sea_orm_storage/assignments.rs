//! 作业存储操作

use super::SeaOrmStorage;
use crate::entity::assignments::{ActiveModel, Column, Entity as Assignments};
use crate::errors::{CourseHubError, Result};
use crate::models::{
    PaginationInfo,
    assignments::{
        entities::Assignment,
        requests::{AssignmentListQuery, CreateAssignmentRequest, UpdateAssignmentRequest},
    },
    common::pagination::normalize_page,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    /// 创建作业，未给出截止时间时取当前时间
    pub async fn create_assignment_impl(&self, req: CreateAssignmentRequest) -> Result<Assignment> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            course_id: Set(req.course_id),
            name: Set(req.name),
            description: Set(req.description),
            deadline: Set(req.deadline.map(|d| d.timestamp()).unwrap_or(now)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| CourseHubError::database_operation(format!("创建作业失败: {e}")))?;

        Ok(result.into_assignment())
    }

    /// 通过 ID 获取作业
    pub async fn get_assignment_by_id_impl(&self, id: i64) -> Result<Option<Assignment>> {
        let result = Assignments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| CourseHubError::database_operation(format!("查询作业失败: {e}")))?;

        Ok(result.map(|m| m.into_assignment()))
    }

    /// 分页列出作业，按截止时间倒序
    pub async fn list_assignments_with_pagination_impl(
        &self,
        query: AssignmentListQuery,
    ) -> Result<(Vec<Assignment>, PaginationInfo)> {
        let (page, size) = normalize_page(query.page, query.size, 10, 100);

        let mut select = Assignments::find();

        if let Some(course_id) = query.course_id {
            select = select.filter(Column::CourseId.eq(course_id));
        }

        select = select
            .order_by_desc(Column::Deadline)
            .order_by_desc(Column::Id);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| CourseHubError::database_operation(format!("查询作业总数失败: {e}")))?;

        let assignments = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| CourseHubError::database_operation(format!("查询作业列表失败: {e}")))?;

        Ok((
            assignments
                .into_iter()
                .map(|m| m.into_assignment())
                .collect(),
            PaginationInfo::new(page, size, total),
        ))
    }

    /// 列出课程下的作业
    pub async fn list_course_assignments_impl(&self, course_id: i64) -> Result<Vec<Assignment>> {
        let assignments = Assignments::find()
            .filter(Column::CourseId.eq(course_id))
            .order_by_asc(Column::Deadline)
            .all(&self.db)
            .await
            .map_err(|e| CourseHubError::database_operation(format!("查询课程作业失败: {e}")))?;

        Ok(assignments
            .into_iter()
            .map(|m| m.into_assignment())
            .collect())
    }

    /// 更新作业
    pub async fn update_assignment_impl(
        &self,
        id: i64,
        update: UpdateAssignmentRequest,
    ) -> Result<Option<Assignment>> {
        let existing = self.get_assignment_by_id_impl(id).await?;
        if existing.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(course_id) = update.course_id {
            model.course_id = Set(Some(course_id));
        }

        if let Some(name) = update.name {
            model.name = Set(name);
        }

        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }

        if let Some(deadline) = update.deadline {
            model.deadline = Set(deadline.timestamp());
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| CourseHubError::database_operation(format!("更新作业失败: {e}")))?;

        self.get_assignment_by_id_impl(id).await
    }

    /// 删除作业，提交记录级联删除
    pub async fn delete_assignment_impl(&self, id: i64) -> Result<bool> {
        let result = Assignments::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| CourseHubError::database_operation(format!("删除作业失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::courses::tests::new_course;
    use chrono::{TimeZone, Utc};

    pub(crate) fn new_assignment(course_id: Option<i64>, name: &str) -> CreateAssignmentRequest {
        CreateAssignmentRequest {
            course_id,
            name: name.to_string(),
            description: None,
            deadline: Some(Utc.with_ymd_and_hms(2030, 1, 10, 0, 0, 0).unwrap()),
        }
    }

    #[tokio::test]
    async fn test_deadline_defaults_to_creation_time() {
        let storage = SeaOrmStorage::in_memory().await.expect("storage");
        let before = Utc::now().timestamp();
        let assignment = storage
            .create_assignment_impl(CreateAssignmentRequest {
                deadline: None,
                ..new_assignment(None, "HW0")
            })
            .await
            .expect("create");
        assert!(assignment.deadline.timestamp() >= before);
        assert!(assignment.deadline.timestamp() <= Utc::now().timestamp());
    }

    #[tokio::test]
    async fn test_course_delete_cascades_to_assignments() {
        let storage = SeaOrmStorage::in_memory().await.expect("storage");
        let course = storage
            .create_course_impl(new_course("Systems"))
            .await
            .expect("course");
        let hw1 = storage
            .create_assignment_impl(new_assignment(Some(course.id), "HW1"))
            .await
            .expect("hw1");
        storage
            .create_assignment_impl(new_assignment(Some(course.id), "HW2"))
            .await
            .expect("hw2");

        let listed = storage
            .list_course_assignments_impl(course.id)
            .await
            .expect("list");
        assert_eq!(listed.len(), 2);

        storage.delete_course_impl(course.id).await.expect("delete");
        assert!(
            storage
                .get_assignment_by_id_impl(hw1.id)
                .await
                .expect("query")
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_list_filters_by_course() {
        let storage = SeaOrmStorage::in_memory().await.expect("storage");
        let course = storage
            .create_course_impl(new_course("Networks"))
            .await
            .expect("course");
        storage
            .create_assignment_impl(new_assignment(Some(course.id), "Lab 1"))
            .await
            .expect("lab");
        storage
            .create_assignment_impl(new_assignment(None, "Orphan"))
            .await
            .expect("orphan");

        let (items, pagination) = storage
            .list_assignments_with_pagination_impl(AssignmentListQuery {
                course_id: Some(course.id),
                ..Default::default()
            })
            .await
            .expect("list");
        assert_eq!(pagination.total, 1);
        assert_eq!(items[0].name, "Lab 1");
    }
}
