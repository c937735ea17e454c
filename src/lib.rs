//! # 办公应用平台
//!
//! 多租户办公应用后台：团队下的应用、二维码与批量二维码、表单与表单设计、
//! 数据采集以及应用内权限，外加 JWT 认证和 RBAC。
//!
//! - `app`：各业务模块，按 model / service / handler 组织
//! - `auth`、`rbac`：认证与平台级权限
//! - `store`：存储 trait 及内存、Postgres 实现
//! - `core`、`infrastructure`：错误、响应、中间件、配置、日志等公共设施

pub mod app;
pub mod auth;
pub mod core;
pub mod infrastructure;
pub mod rbac;
pub mod router;
pub mod state;
pub mod store;

pub use router::build_router;
pub use state::AppState;
