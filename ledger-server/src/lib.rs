//! Ledger Server - 供应商账务与余额对账服务
//!
//! # 架构概述
//!
//! - **账务核心** (`ledger`): 余额引擎、账目修复例程、混合付款
//! - **数据库** (`db`): SQLite (sqlx) 存储与迁移
//! - **HTTP API** (`api`): RESTful API 接口
//! - **核心** (`core`): 配置、状态、后台任务
//!
//! # 模块结构
//!
//! ```text
//! ledger-server/src/
//! ├── core/          # 配置、状态、错误、后台任务
//! ├── ledger/        # 余额引擎、修复例程、付款处理
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 数据库层 (repository)
//! ├── utils/         # 错误、日志、校验
//! └── bin/           # ledger-admin 管理工具
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod ledger;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use db::DbService;
pub use ledger::LedgerService;
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_cli_logger, init_logger, init_logger_with_file};

/// 日志保留天数
const LOG_RETENTION_DAYS: u64 = 30;

/// 设置运行环境
///
/// 加载 `.env`，创建工作/日志目录，初始化日志并清理过期日志文件。
pub fn setup_environment() -> utils::CliResult<()> {
    // .env 可选
    let _ = dotenvy::dotenv();

    let config = Config::from_env();
    std::fs::create_dir_all(&config.work_dir)?;
    let log_dir = config.log_dir();
    std::fs::create_dir_all(&log_dir)?;

    let log_dir = log_dir.to_string_lossy().into_owned();
    init_logger_with_file(Some(&config.log_level), config.log_json, Some(&log_dir));

    match cleanup_old_logs(&log_dir, LOG_RETENTION_DAYS) {
        Ok(0) => {}
        Ok(removed) => tracing::info!(removed, "Old log files removed"),
        Err(e) => tracing::warn!(error = %e, "Failed to clean up old logs"),
    }
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    __             __
   / /   ___  ____/ /___ ____  _____
  / /   / _ \/ __  / __ `/ _ \/ ___/
 / /___/  __/ /_/ / /_/ /  __/ /
/_____/\___/\__,_/\__, /\___/_/
                 /____/
    "#
    );
}
