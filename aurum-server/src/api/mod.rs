//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查与服务信息
//! - [`auth`] - 账号设置、登录、营收解锁
//! - [`orders`] - 营业单
//! - [`expenses`] - 支出
//! - [`reports`] - KPI 与报表
//! - [`export`] - CSV 导出
//! - [`backup`] - ZIP 备份 / 恢复

pub mod auth;
pub mod backup;
pub mod expenses;
pub mod export;
pub mod health;
pub mod orders;
pub mod reports;
