use sqlx::SqlitePool;

use crate::core::tasks::{BackgroundTasks, TaskKind, dirty_sweeper};
use crate::core::{Config, Result, ServerError};
use crate::db::DbService;
use crate::ledger::LedgerService;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 所有字段都是廉价克隆 (连接池和锁表内部为 Arc)。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | pool | SqlitePool | SQLite 连接池 |
/// | ledger | LedgerService | 账务服务 (余额引擎、修复例程、付款) |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub ledger: LedgerService,
}

impl ServerState {
    /// 使用已有连接池构造 (测试 / 管理工具)
    pub fn with_pool(config: Config, pool: SqlitePool) -> Self {
        let ledger =
            LedgerService::new(pool.clone()).with_reconcile_concurrency(config.reconcile_concurrency);
        Self {
            config,
            pool,
            ledger,
        }
    }

    /// 初始化服务器状态
    ///
    /// 创建工作目录，打开数据库并执行迁移。
    pub async fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;
        let db_path = config.database_path();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db_path = db_path
            .to_str()
            .ok_or_else(|| ServerError::Config(format!("Non UTF-8 database path: {db_path:?}")))?
            .to_string();

        let db = DbService::new(&db_path).await?;
        Ok(Self::with_pool(config.clone(), db.pool))
    }

    /// 启动后台任务
    pub fn start_background_tasks(&self) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();
        if self.config.dirty_sweep_interval_secs > 0 {
            let interval = std::time::Duration::from_secs(self.config.dirty_sweep_interval_secs);
            let token = tasks.shutdown_token();
            tasks.spawn(
                "dirty_balance_sweeper",
                TaskKind::Periodic,
                dirty_sweeper(self.ledger.clone(), interval, token),
            );
        }
        tasks.log_summary();
        tasks
    }

    pub fn ledger(&self) -> &LedgerService {
        &self.ledger
    }
}
