//! ledger-admin - 账目修复与对账命令行工具
//!
//! 对服务器使用的同一个 SQLite 数据库直接执行修复例程。写操作前会先
//! 打印预览并要求确认 (`--yes` 跳过)。
//!
//! ```text
//! ledger-admin preview
//! ledger-admin normalize-signs
//! ledger-admin reconcile --dirty-only
//! ledger-admin --yes repair
//! ```

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use ledger_server::utils::CliResult;
use ledger_server::{Config, DbService, LedgerService, init_cli_logger};
use shared::models::{LedgerPreview, NormalizeReport, ReconcileReport};

#[derive(Parser)]
#[command(name = "ledger-admin")]
#[command(about = "Supplier ledger repair and reconciliation")]
#[command(version)]
struct Cli {
    /// SQLite database file (defaults to WORK_DIR/ledger.db)
    #[arg(long, env = "DATABASE_PATH", global = true)]
    database: Option<String>,

    /// Skip the interactive confirmation
    #[arg(long, short = 'y', global = true)]
    yes: bool,

    /// Print reports as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Suppliers recomputed in parallel
    #[arg(long, env = "RECONCILE_CONCURRENCY", global = true)]
    concurrency: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count what a repair would touch (read-only)
    Preview,
    /// Replace negative ledger amounts by their magnitude
    NormalizeSigns,
    /// Force supplier advances and payments to outflow
    NormalizeDirections,
    /// Recompute cached supplier balances
    Reconcile {
        /// Only suppliers flagged dirty
        #[arg(long)]
        dirty_only: bool,
    },
    /// normalize-signs, normalize-directions, then reconcile every supplier
    Repair,
}

impl Commands {
    fn writes(&self) -> bool {
        !matches!(self, Commands::Preview)
    }

    fn label(&self) -> &'static str {
        match self {
            Commands::Preview => "preview",
            Commands::NormalizeSigns => "normalize-signs",
            Commands::NormalizeDirections => "normalize-directions",
            Commands::Reconcile { .. } => "reconcile",
            Commands::Repair => "repair",
        }
    }
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut config = Config::from_env();
    init_cli_logger(Some(&config.log_level));
    if let Some(path) = cli.database.clone() {
        config.database_path = Some(path);
    }
    if let Some(n) = cli.concurrency {
        config.reconcile_concurrency = n;
    }

    let db_path = config.database_path();
    if !db_path.exists() {
        bail!("Database not found: {}", db_path.display());
    }
    let db = DbService::new(&db_path.to_string_lossy())
        .await
        .with_context(|| format!("Failed to open {}", db_path.display()))?;
    let ledger = LedgerService::new(db.pool.clone())
        .with_reconcile_concurrency(config.reconcile_concurrency);

    // --json 时 stdout 只输出 JSON，人类可读摘要写到 stderr
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    let summary: &mut dyn Write = if cli.json { &mut stderr } else { &mut stdout };

    let preview = ledger.preview().await?;
    print_preview(summary, &preview)?;
    if !cli.command.writes() {
        return emit(cli.json, &mut io::stdout(), &preview);
    }

    if !cli.yes && !confirm(cli.command.label())? {
        writeln!(summary, "Aborted, nothing written.")?;
        return Ok(());
    }

    let mut out = io::stdout();
    match cli.command {
        Commands::Preview => {}
        Commands::NormalizeSigns => {
            let report = ledger.normalize_signs().await?;
            print_normalize(summary, "normalize-signs", &report)?;
            emit(cli.json, &mut out, &report)?;
        }
        Commands::NormalizeDirections => {
            let report = ledger.normalize_directions().await?;
            print_normalize(summary, "normalize-directions", &report)?;
            emit(cli.json, &mut out, &report)?;
        }
        Commands::Reconcile { dirty_only } => {
            let report = if dirty_only {
                ledger.reconcile_dirty().await?
            } else {
                ledger.reconcile_all_suppliers().await?
            };
            print_reconcile(summary, &report)?;
            emit(cli.json, &mut out, &report)?;
        }
        Commands::Repair => {
            let report = ledger.repair().await?;
            print_normalize(summary, "normalize-signs", &report.signs)?;
            print_normalize(summary, "normalize-directions", &report.directions)?;
            print_reconcile(summary, &report.reconcile)?;
            emit(cli.json, &mut out, &report)?;
        }
    }

    db.pool.close().await;
    Ok(())
}

fn confirm(action: &str) -> CliResult<bool> {
    if !io::stdin().is_terminal() {
        bail!("Refusing to run {action} without confirmation: stdin is not a TTY (pass --yes)");
    }
    eprint!("Run {action} against this database? [y/N] ");
    io::stderr().flush().ok();
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn emit<T: serde::Serialize>(json: bool, out: &mut dyn Write, value: &T) -> CliResult<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    }
    Ok(())
}

fn print_preview(out: &mut dyn Write, p: &LedgerPreview) -> io::Result<()> {
    writeln!(out, "Suppliers:            {}", p.total_suppliers)?;
    writeln!(out, "  dirty balances:     {}", p.dirty_suppliers)?;
    writeln!(out, "Negative amounts:     {}", p.negative_amounts)?;
    writeln!(out, "Misdirected entries:  {}", p.misdirected_entries)
}

fn print_normalize(out: &mut dyn Write, label: &str, r: &NormalizeReport) -> io::Result<()> {
    writeln!(
        out,
        "{label}: {} records touched across {} suppliers",
        r.touched,
        r.affected_suppliers.len()
    )
}

fn print_reconcile(out: &mut dyn Write, r: &ReconcileReport) -> io::Result<()> {
    writeln!(
        out,
        "reconcile: {} processed, {} changed, {} failed",
        r.processed,
        r.changes.len(),
        r.failed
    )?;
    for c in &r.changes {
        writeln!(
            out,
            "  supplier {:>20}  debt {:>12.2} -> {:<12.2} credit {:>12.2} -> {:.2}",
            c.supplier_id, c.old_debt, c.new_debt, c.old_credit, c.new_credit
        )?;
    }
    for f in &r.failures {
        writeln!(out, "  supplier {:>20}  FAILED [{}] {}", f.supplier_id, f.code, f.message)?;
    }
    Ok(())
}
