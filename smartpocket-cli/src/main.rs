use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use smartpocket_core::{
    BudgetRecord, DashboardFilter, DashboardRecord, MonthKey, ProgressRecord, RecordStore,
};
use smartpocket_finance::{
    BetterMonth, DashboardComparison, ProcessedStatement, compare_stored,
    compare_with_previous_month, record_progress,
};
use std::path::PathBuf;

mod config;
mod export;
mod pdf;
mod state;

use config::Config;
use state::JsonFileStore;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("SMARTPOCKET_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(name = "smartpocket", version = VERSION, about = "Bank statement to spending dashboard")]
struct Cli {
    /// Config file (default: ~/.smartpocket/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Errors only
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process a statement and save it as a dashboard
    Upload {
        /// Statement PDF
        #[arg(long, conflicts_with = "text", required_unless_present = "text")]
        pdf: Option<PathBuf>,

        /// Pre-extracted statement text
        #[arg(long)]
        text: Option<PathBuf>,

        #[arg(long)]
        user: String,

        /// Statement format (default from config)
        #[arg(long)]
        format: Option<String>,

        /// Year for dates printed without one
        #[arg(long)]
        year: Option<i32>,

        #[arg(long)]
        json: bool,
    },

    /// Process a statement without saving anything
    Parse {
        #[arg(long, conflicts_with = "text", required_unless_present = "text")]
        pdf: Option<PathBuf>,

        #[arg(long)]
        text: Option<PathBuf>,

        #[arg(long)]
        format: Option<String>,

        #[arg(long)]
        year: Option<i32>,

        /// Print every transaction, not just totals
        #[arg(long)]
        all: bool,
    },

    /// List a user's dashboards, newest first
    History {
        #[arg(long)]
        user: String,

        /// Month number (1-12)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,

        #[arg(long)]
        year: Option<i32>,
    },

    /// Show one dashboard
    Show {
        id: String,

        #[arg(long)]
        json: bool,
    },

    /// Show the most recent dashboard for a month
    Latest {
        #[arg(long)]
        user: String,

        /// YYYY-MM
        #[arg(long)]
        month: MonthKey,
    },

    /// Budget commands
    Budget {
        #[command(subcommand)]
        command: BudgetCommand,
    },

    /// Compare a dashboard with its budget and save the result
    Progress {
        #[arg(long)]
        dashboard: String,
    },

    /// List saved progress reports
    ProgressHistory {
        #[arg(long)]
        user: String,
    },

    /// Compare a month with the month before, using the latest upload of each
    CompareMonths {
        #[arg(long)]
        user: String,

        /// YYYY-MM
        #[arg(long)]
        month: MonthKey,
    },

    /// Export a dashboard's transactions as CSV
    Export {
        id: String,

        /// Output file (default: stdout)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Compare two dashboards; the first is the period being judged
    Compare { current: String, previous: String },

    /// Write a default ~/.smartpocket/config.toml
    InitConfig,
}

#[derive(Subcommand, Debug)]
enum BudgetCommand {
    /// Create or replace the budget for a month
    Set {
        #[arg(long)]
        user: String,

        /// YYYY-MM
        #[arg(long)]
        month: MonthKey,

        #[arg(long)]
        total: Decimal,

        /// Per-category budget, NAME=AMOUNT (repeatable)
        #[arg(long = "category", value_parser = parse_category_budget)]
        categories: Vec<(String, Decimal)>,
    },

    /// Show the budget for a month
    Show {
        #[arg(long)]
        user: String,

        #[arg(long)]
        month: MonthKey,
    },

    /// List all budgets of a user
    List {
        #[arg(long)]
        user: String,
    },
}

fn parse_category_budget(s: &str) -> std::result::Result<(String, Decimal), String> {
    let (name, amount) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=AMOUNT, got {s:?}"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty category name in {s:?}"));
    }
    let amount: Decimal = amount
        .trim()
        .parse()
        .map_err(|e| format!("bad amount in {s:?}: {e}"))?;
    Ok((name.to_string(), amount))
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let cfg = match &cli.config {
        Some(p) => config::load_config_from(p)?,
        None => config::load_config()?,
    };

    match cli.command {
        Command::Upload {
            pdf,
            text,
            user,
            format,
            year,
            json,
        } => {
            let processed = process(&cfg, pdf, text, format.as_deref(), year).await?;
            let mut store = open_store(&cfg)?;
            let record = store.insert_dashboard(processed.into_dashboard(user, Utc::now()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                print_dashboard(&record);
            }
        }

        Command::Parse {
            pdf,
            text,
            format,
            year,
            all,
        } => {
            let processed = process(&cfg, pdf, text, format.as_deref(), year).await?;
            print_processed(&processed, all);
        }

        Command::History { user, month, year } => {
            let tz = cfg.timezone()?;
            let store = open_store(&cfg)?;
            let filter = DashboardFilter { month, year };
            let history = store.dashboard_history(&user, &filter)?;
            if history.is_empty() {
                println!("No dashboards for {user}");
            }
            for d in &history {
                println!(
                    "{} | {} | out {} | in {} | net {} | uploaded {}",
                    d.id.as_deref().unwrap_or("-"),
                    d.statement_month,
                    d.total_outcome,
                    d.total_income,
                    d.net_balance,
                    d.created_at.with_timezone(&tz).format("%Y-%m-%d %H:%M %Z")
                );
            }
        }

        Command::Show { id, json } => {
            let store = open_store(&cfg)?;
            let Some(record) = store.dashboard(&id)? else {
                bail!("No dashboard with id {id}");
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                print_dashboard(&record);
            }
        }

        Command::Latest { user, month } => {
            let store = open_store(&cfg)?;
            match store.latest_dashboard(&user, month)? {
                Some(record) => print_dashboard(&record),
                None => println!("No dashboard for {user} in {month}"),
            }
        }

        Command::Budget { command } => budget(&cfg, command)?,

        Command::Progress { dashboard } => {
            let mut store = open_store(&cfg)?;
            let report = record_progress(&mut store, &dashboard, Utc::now())
                .with_context(|| format!("progress for dashboard {dashboard}"))?;
            print_progress(&report);
        }

        Command::ProgressHistory { user } => {
            let tz = cfg.timezone()?;
            let store = open_store(&cfg)?;
            let reports = store.progress_records(&user)?;
            if reports.is_empty() {
                println!("No progress reports for {user}");
            }
            for p in &reports {
                println!(
                    "{} | {} vs budget {} | spent {} of {} | {} | {}",
                    p.id.as_deref().unwrap_or("-"),
                    p.statement_month,
                    p.budget_month,
                    p.current_total,
                    p.budget_total,
                    over_under_label(p.overall_over_under),
                    p.created_at.with_timezone(&tz).format("%Y-%m-%d %H:%M %Z")
                );
            }
        }

        Command::Export { id, out } => {
            let store = open_store(&cfg)?;
            let Some(record) = store.dashboard(&id)? else {
                bail!("No dashboard with id {id}");
            };
            match out {
                Some(path) => {
                    let file = std::fs::File::create(&path)
                        .with_context(|| format!("create {}", path.display()))?;
                    export::write_transactions_csv(&record, file)?;
                    println!("Wrote {}", path.display());
                }
                None => export::write_transactions_csv(&record, std::io::stdout().lock())?,
            }
        }

        Command::Compare { current, previous } => {
            let store = open_store(&cfg)?;
            print_comparison(&compare_stored(&store, &current, &previous)?);
        }

        Command::CompareMonths { user, month } => {
            let store = open_store(&cfg)?;
            print_comparison(&compare_with_previous_month(&store, &user, month)?);
        }

        Command::InitConfig => config::init_config()?,
    }

    Ok(())
}

fn open_store(cfg: &Config) -> Result<JsonFileStore> {
    JsonFileStore::open(cfg.records_path()?)
}

async fn process(
    cfg: &Config,
    pdf: Option<PathBuf>,
    text: Option<PathBuf>,
    format: Option<&str>,
    year: Option<i32>,
) -> Result<ProcessedStatement> {
    let pipeline = cfg.pipeline(format)?;
    let statement = pdf::read_statement(pdf, text).await?;
    let year_hint = year.or(cfg.statement.year_hint);
    pipeline
        .process(&statement, year_hint)
        .with_context(|| format!("processing statement as {}", pipeline.format().name()))
}

fn budget(cfg: &Config, command: BudgetCommand) -> Result<()> {
    let mut store = open_store(cfg)?;
    match command {
        BudgetCommand::Set {
            user,
            month,
            total,
            categories,
        } => {
            let budget = categories
                .into_iter()
                .fold(BudgetRecord::new(user, month, total), |b, (name, amount)| {
                    b.with_category(name, amount)
                });
            store.upsert_budget(budget.clone())?;
            println!("Saved budget for {} {}", budget.user_id, budget.month);
            print_budget(&budget);
        }
        BudgetCommand::Show { user, month } => match store.budget(&user, month)? {
            Some(b) => print_budget(&b),
            None => println!("No budget for {user} in {month}"),
        },
        BudgetCommand::List { user } => {
            let mut budgets = store.budgets(&user)?;
            budgets.sort_by_key(|b| b.month);
            if budgets.is_empty() {
                println!("No budgets for {user}");
            }
            for b in &budgets {
                println!(
                    "{} | total {} | {} categories",
                    b.month,
                    b.total_budget,
                    b.category_budgets.len()
                );
            }
        }
    }
    Ok(())
}

fn over_under_label(amount: Decimal) -> String {
    if amount > Decimal::ZERO {
        format!("over by {amount}")
    } else {
        format!("under by {}", amount.abs())
    }
}

fn print_categories<'a>(totals: impl IntoIterator<Item = (&'a String, &'a Decimal)>) {
    for (name, amount) in totals {
        println!("  {:<20}{:>12}", name, amount.to_string());
    }
}

fn print_dashboard(d: &DashboardRecord) {
    println!(
        "Dashboard {} | user {} | {}",
        d.id.as_deref().unwrap_or("(unsaved)"),
        d.user_id,
        d.statement_month
    );
    println!(
        "Income {} | Outcome {} | Net {}",
        d.total_income, d.total_outcome, d.net_balance
    );
    println!(
        "{} income / {} outcome transactions\n",
        d.income_list.len(),
        d.outcome_list.len()
    );
    println!("Spending by category:");
    print_categories(&d.category_totals);
}

fn print_processed(p: &ProcessedStatement, all: bool) {
    println!("Statement month: {}", p.statement_month);
    println!(
        "{} transactions ({} discarded as internal transfers)",
        p.transactions.len(),
        p.discarded
    );
    println!(
        "Income {} | Outcome {} | Net {}\n",
        p.summary.total_income, p.summary.total_outcome, p.summary.net_balance
    );
    if all {
        for t in &p.transactions {
            println!(
                "  {:<12}{:<40}{:>12}  {}",
                t.date,
                t.description,
                t.amount.to_string(),
                t.category.as_deref().unwrap_or("")
            );
        }
        println!();
    }
    println!("Spending by category:");
    print_categories(&p.summary.category_totals);
}

fn print_comparison(cmp: &DashboardComparison) {
    println!(
        "{} (out {}) vs {} (out {})\n",
        cmp.current_month, cmp.current_outcome, cmp.previous_month, cmp.previous_outcome
    );
    println!("{:<20}{:>12}{:>12}{:>12}", "Category", "Current", "Previous", "Change");
    for c in &cmp.categories {
        println!(
            "{:<20}{:>12}{:>12}{:>12}",
            c.category,
            c.current.to_string(),
            c.previous.to_string(),
            c.change().to_string()
        );
    }
    let winner = match cmp.better {
        BetterMonth::Current => cmp.current_month,
        BetterMonth::Previous => cmp.previous_month,
    };
    println!("\nBetter month: {winner}");
}

fn print_budget(b: &BudgetRecord) {
    println!("Budget {} | total {}", b.month, b.total_budget);
    print_categories(&b.category_budgets);
}

fn print_progress(p: &ProgressRecord) {
    println!(
        "Progress {} | {} against budget {}",
        p.id.as_deref().unwrap_or("-"),
        p.statement_month,
        p.budget_month
    );
    println!(
        "Spent {} of {} ({})\n",
        p.current_total,
        p.budget_total,
        over_under_label(p.overall_over_under)
    );
    println!("{:<20}{:>12}{:>12}{:>12}", "Category", "Spent", "Budget", "Over/Under");
    for c in &p.categories {
        println!(
            "{:<20}{:>12}{:>12}{:>12}",
            c.category,
            c.current.to_string(),
            c.budget.to_string(),
            c.over_under.to_string()
        );
    }
}
