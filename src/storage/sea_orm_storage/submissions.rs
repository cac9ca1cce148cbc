//! 提交存储操作
//!
//! (学号, 作业) 上有唯一约束，写入走 INSERT .. ON CONFLICT DO UPDATE，
//! 并发提交不会产生重复行。

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::student_assignments::{ActiveModel, Column, Entity as StudentAssignments};
use crate::errors::{CourseHubError, Result};
use crate::models::{
    PaginationInfo,
    common::pagination::normalize_page,
    submissions::{entities::Submission, requests::UpsertSubmission},
};
use sea_orm::{
    ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
    sea_query::{Expr, OnConflict},
};

impl SeaOrmStorage {
    /// 获取某学生在某作业下的提交
    pub async fn get_submission_impl(
        &self,
        student_id: &str,
        assignment_id: i64,
    ) -> Result<Option<Submission>> {
        let result = StudentAssignments::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::AssignmentId.eq(assignment_id))
            .one(&self.db)
            .await
            .map_err(|e| CourseHubError::database_operation(format!("查询提交失败: {e}")))?;

        Ok(result.map(|m| m.into_submission()))
    }

    /// 新建或覆盖提交
    pub async fn upsert_submission_impl(&self, input: UpsertSubmission) -> Result<Submission> {
        let now = chrono::Utc::now().timestamp();

        let mut update_columns = vec![Column::Content, Column::UpdatedAt];
        let (file_path, file_name) = match input.attachment {
            Some(attachment) => {
                update_columns.push(Column::FilePath);
                update_columns.push(Column::FileName);
                (Some(attachment.path), Some(attachment.file_name))
            }
            None => (None, None),
        };

        let model = ActiveModel {
            student_id: Set(input.student_id.clone()),
            assignment_id: Set(input.assignment_id),
            content: Set(Some(input.content)),
            file_path: Set(file_path),
            file_name: Set(file_name),
            submitted_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        StudentAssignments::insert(model)
            .on_conflict(
                OnConflict::columns([Column::StudentId, Column::AssignmentId])
                    .update_columns(update_columns)
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(msg)) => {
                    CourseHubError::duplicate_submission(msg)
                }
                _ => CourseHubError::database_operation(format!("写入提交失败: {e}")),
            })?;

        self.get_submission_impl(&input.student_id, input.assignment_id)
            .await?
            .ok_or_else(|| CourseHubError::database_operation("写入提交后未能读回记录"))
    }

    /// 修改已有提交
    ///
    /// 单条 UPDATE 按 (学号, 作业) 过滤，影响 0 行说明提交已不存在。
    pub async fn update_submission_impl(
        &self,
        input: UpsertSubmission,
    ) -> Result<Option<Submission>> {
        let mut update = StudentAssignments::update_many()
            .col_expr(Column::Content, Expr::value(Some(input.content)))
            .col_expr(Column::UpdatedAt, Expr::value(chrono::Utc::now().timestamp()));
        if let Some(attachment) = input.attachment {
            update = update
                .col_expr(Column::FilePath, Expr::value(Some(attachment.path)))
                .col_expr(Column::FileName, Expr::value(Some(attachment.file_name)));
        }

        let result = update
            .filter(Column::StudentId.eq(input.student_id.as_str()))
            .filter(Column::AssignmentId.eq(input.assignment_id))
            .exec(&self.db)
            .await
            .map_err(|e| CourseHubError::database_operation(format!("修改提交失败: {e}")))?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.get_submission_impl(&input.student_id, input.assignment_id)
            .await
    }

    /// 通过 ID 获取提交
    pub async fn get_submission_by_id_impl(&self, id: i64) -> Result<Option<Submission>> {
        let result = StudentAssignments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| CourseHubError::database_operation(format!("查询提交失败: {e}")))?;

        Ok(result.map(|m| m.into_submission()))
    }

    /// 删除某学生在某作业下的提交
    pub async fn delete_submission_impl(
        &self,
        student_id: &str,
        assignment_id: i64,
    ) -> Result<Option<Submission>> {
        match self.get_submission_impl(student_id, assignment_id).await? {
            Some(submission) => self.delete_submission_by_id_impl(submission.id).await,
            None => Ok(None),
        }
    }

    /// 通过 ID 删除提交
    pub async fn delete_submission_by_id_impl(&self, id: i64) -> Result<Option<Submission>> {
        let Some(existing) = self.get_submission_by_id_impl(id).await? else {
            return Ok(None);
        };

        let result = StudentAssignments::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| CourseHubError::database_operation(format!("删除提交失败: {e}")))?;

        Ok((result.rows_affected > 0).then_some(existing))
    }

    /// 分页列出作业下的提交
    pub async fn list_submissions_by_assignment_impl(
        &self,
        assignment_id: i64,
        page: Option<i64>,
        size: Option<i64>,
    ) -> Result<(Vec<Submission>, PaginationInfo)> {
        let (page, size) = normalize_page(page, size, 20, 100);

        let paginator = StudentAssignments::find()
            .filter(Column::AssignmentId.eq(assignment_id))
            .order_by_asc(Column::StudentId)
            .paginate(&self.db, size);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| CourseHubError::database_operation(format!("查询提交总数失败: {e}")))?;

        let submissions = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| CourseHubError::database_operation(format!("查询提交列表失败: {e}")))?;

        Ok((
            submissions
                .into_iter()
                .map(|m| m.into_submission())
                .collect(),
            PaginationInfo::new(page, size, total),
        ))
    }

    /// 该学生在给定作业中已提交的作业 ID
    pub async fn list_submitted_assignment_ids_impl(
        &self,
        student_id: &str,
        assignment_ids: &[i64],
    ) -> Result<Vec<i64>> {
        if assignment_ids.is_empty() {
            return Ok(Vec::new());
        }

        StudentAssignments::find()
            .select_only()
            .column(Column::AssignmentId)
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::AssignmentId.is_in(assignment_ids.iter().copied()))
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(|e| CourseHubError::database_operation(format!("查询提交状态失败: {e}")))
    }

    /// 统计每个作业的提交数
    pub async fn count_submissions_by_assignment_impl(
        &self,
        assignment_ids: &[i64],
    ) -> Result<HashMap<i64, u64>> {
        if assignment_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = StudentAssignments::find()
            .select_only()
            .column(Column::AssignmentId)
            .column_as(Column::Id.count(), "submission_count")
            .filter(Column::AssignmentId.is_in(assignment_ids.iter().copied()))
            .group_by(Column::AssignmentId)
            .into_tuple::<(i64, i64)>()
            .all(&self.db)
            .await
            .map_err(|e| CourseHubError::database_operation(format!("统计提交数失败: {e}")))?;

        Ok(rows
            .into_iter()
            .map(|(assignment_id, count)| (assignment_id, count.max(0) as u64))
            .collect())
    }
}
