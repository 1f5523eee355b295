// ==========================================
// DIY 项目管理 - 仓储操作性能统计
// ==========================================
// 每个仓储操作: 耗时 + SQL 语句数 + 慢 SQL 数
// 开关按连接生效: 关闭即不安装 profile 回调
// 回调只能是函数指针,慢 SQL 阈值为进程级设置 (最后一次 install 生效)
// 计数按线程累计 (一次操作只在一个线程内执行)
// ==========================================

use rusqlite::Connection;
use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// 开关环境变量
pub const PERF_SQL_ENV: &str = "PROJECTS_DAO_PERF_SQL";
/// 慢 SQL 阈值环境变量 (毫秒)
pub const SLOW_SQL_MS_ENV: &str = "PROJECTS_DAO_SLOW_SQL_MS";

static SLOW_THRESHOLD_MS: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, Default)]
struct Counters {
    active_ops: u32,
    statements: u64,
    slow_statements: u64,
}

thread_local! {
    static COUNTERS: Cell<Counters> = const {
        Cell::new(Counters { active_ops: 0, statements: 0, slow_statements: 0 })
    };
}

fn update_counters(f: impl FnOnce(&mut Counters)) {
    COUNTERS.with(|cell| {
        let mut counters = cell.get();
        f(&mut counters);
        cell.set(counters);
    });
}

fn current_counters() -> Counters {
    COUNTERS.with(Cell::get)
}

// ==========================================
// SqlTraceSettings - 语句追踪开关
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqlTraceSettings {
    pub enabled: bool,
    pub slow_sql_ms: u64,
}

impl Default for SqlTraceSettings {
    /// Debug 构建默认开启 (阈值 50ms); Release 默认关闭 (阈值 200ms)
    fn default() -> Self {
        Self {
            enabled: cfg!(debug_assertions),
            slow_sql_ms: if cfg!(debug_assertions) { 50 } else { 200 },
        }
    }
}

impl SqlTraceSettings {
    /// 从环境变量读取,无法解析的值沿用默认
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        if let Some(raw) = lookup(PERF_SQL_ENV) {
            settings.enabled = is_truthy(&raw);
        }
        if let Some(ms) = lookup(SLOW_SQL_MS_ENV).and_then(|v| v.trim().parse().ok()) {
            settings.slow_sql_ms = ms;
        }
        settings
    }

    /// 在连接上安装 (或清除) profile 回调
    ///
    /// profile 在每条语句执行完成后触发一次,同时负责计数与慢 SQL 日志。
    /// 不安装 trace: sqlite3_profile 会清除 sqlite3_trace 的回调。
    pub fn install(&self, conn: &mut Connection) {
        if !self.enabled {
            conn.profile(None);
            return;
        }

        SLOW_THRESHOLD_MS.store(self.slow_sql_ms, Ordering::Relaxed);
        conn.profile(Some(on_statement_profiled));
    }
}

fn is_truthy(v: &str) -> bool {
    matches!(
        v.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn one_line(sql: &str, max_chars: usize) -> String {
    let flat = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let head: String = flat.chars().take(max_chars).collect();
    format!("{}…", head)
}

fn on_statement_profiled(sql: &str, duration: Duration) {
    update_counters(|c| {
        if c.active_ops > 0 {
            c.statements = c.statements.saturating_add(1);
        }
    });

    let threshold = SLOW_THRESHOLD_MS.load(Ordering::Relaxed);
    let duration_ms = duration.as_millis() as u64;
    if threshold == 0 || duration_ms < threshold {
        return;
    }

    tracing::warn!(
        target: "slow_sql",
        duration_ms,
        sql = %one_line(sql, 400),
        "慢 SQL"
    );
    update_counters(|c| {
        if c.active_ops > 0 {
            c.slow_statements = c.slow_statements.saturating_add(1);
        }
    });
}

// ==========================================
// PerfGuard - 单个操作的统计窗口
// ==========================================

/// 操作统计结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationStats {
    pub operation: &'static str,
    pub elapsed_ms: u64,
    pub statements: u64,
    pub slow_statements: u64,
}

/// 性能统计 Guard: drop 时以 `perf` target 输出一条 info 日志
///
/// ```ignore
/// let _perf = diy_projects::perf::PerfGuard::new("fetch_project_by_id");
/// ```
pub struct PerfGuard {
    operation: &'static str,
    started_at: Instant,
    baseline: Counters,
}

impl PerfGuard {
    pub fn new(operation: &'static str) -> Self {
        update_counters(|c| c.active_ops = c.active_ops.saturating_add(1));
        Self {
            operation,
            started_at: Instant::now(),
            baseline: current_counters(),
        }
    }

    /// 截至目前的统计 (BEGIN/COMMIT 也计入语句数)
    pub fn stats(&self) -> OperationStats {
        let now = current_counters();
        OperationStats {
            operation: self.operation,
            elapsed_ms: self.started_at.elapsed().as_millis() as u64,
            statements: now.statements.saturating_sub(self.baseline.statements),
            slow_statements: now
                .slow_statements
                .saturating_sub(self.baseline.slow_statements),
        }
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let stats = self.stats();
        tracing::info!(
            target: "perf",
            operation = stats.operation,
            elapsed_ms = stats.elapsed_ms,
            statements = stats.statements,
            slow_statements = stats.slow_statements,
            "操作完成"
        );
        update_counters(|c| c.active_ops = c.active_ops.saturating_sub(1));
    }
}
