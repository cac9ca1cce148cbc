//! CourseHub - 课程作业与影片教材门户后端服务
//!
//! 基于 Actix Web 构建：学生按课程查看作业并提交（每人每题一份，可覆盖），
//! 观看有期限的影片教材，支持本地账号与第三方登录。
//!
//! # 架构
//! - `cache`: 缓存层（Moka）
//! - `config`: 配置管理
//! - `entity`: SeaORM 数据库实体
//! - `errors`: 统一错误处理
//! - `middlewares`: 认证授权中间件
//! - `models`: 数据模型定义
//! - `oauth`: 第三方登录提供方与注册表
//! - `routes`: API 路由层
//! - `runtime`: 运行时生命周期管理
//! - `services`: 业务逻辑层
//! - `storage`: 数据存储层（SeaORM）
//! - `utils`: 工具函数

pub mod cache;
pub mod config;
pub mod entity;
pub mod errors;
pub mod middlewares;
pub mod models;
pub mod oauth;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod utils;
