//! Settlement CLI
//!
//! Reads a trip snapshot (JSON) and prints balances, suggested transfers,
//! the expense list, the payment log, or the payment that recording a
//! transfer would append.
//! Logs go to stderr; stdout carries only the requested output.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use tripledger_core::{
    payments::recorders, types::member_label, ExpenseOrder, ExpenseQuery, MemberId, PaymentOrder,
    PaymentQuery, TripSnapshot, Validator,
};
use tripledger_settlement::{
    config::LoggingConfig,
    record_settlement_with,
    report::{format_amount, to_json},
    Config, Error, OutputFormat, RecordRequest, SettlementReport,
};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Format {
    Text,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "tripledger-settle", version, about = "Settle up shared trip expenses")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format (overrides configuration)
    #[arg(long, global = true, value_enum)]
    format: Option<Format>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print balances, suggested transfers and expense totals
    Settle {
        /// Trip snapshot (JSON)
        #[arg(long)]
        snapshot: PathBuf,
    },

    /// Check every expense and payment against write-path validation
    Validate {
        /// Trip snapshot (JSON)
        #[arg(long)]
        snapshot: PathBuf,
    },

    /// List expenses
    Expenses {
        /// Trip snapshot (JSON)
        #[arg(long)]
        snapshot: PathBuf,

        /// date-desc, date-asc, amount-desc, amount-asc, description-asc or description-desc
        #[arg(long, default_value = "date-desc")]
        sort: ExpenseOrder,

        /// Only expenses in this category
        #[arg(long)]
        category: Option<String>,

        /// Only expenses paid by this member
        #[arg(long)]
        paid_by: Option<String>,
    },

    /// List the recorded-payment log
    Payments {
        /// Trip snapshot (JSON)
        #[arg(long)]
        snapshot: PathBuf,

        /// date-desc, date-asc, amount-desc or amount-asc
        #[arg(long, default_value = "date-desc")]
        sort: PaymentOrder,

        /// Only payments logged by this member
        #[arg(long)]
        recorded_by: Option<String>,
    },

    /// Print the payment that recording a suggested transfer would append
    Record {
        /// Trip snapshot (JSON)
        #[arg(long)]
        snapshot: PathBuf,

        /// Debtor member ID
        #[arg(long)]
        from: String,

        /// Creditor member ID
        #[arg(long)]
        to: String,

        /// Member logging the payment
        #[arg(long)]
        recorded_by: String,

        /// Currency code (defaults to the configured or trip currency)
        #[arg(long)]
        currency: Option<String>,

        /// Notes
        #[arg(long)]
        notes: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            let mut config = Config::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            config.apply_env().context("Invalid TRIPLEDGER_* environment")?;
            config
        }
        None => Config::from_env().context("Invalid TRIPLEDGER_* environment")?,
    };
    if let Some(format) = cli.format {
        config.output.format = format.into();
    }

    init_tracing(&config.logging);

    match cli.command {
        Command::Settle { snapshot } => run_settle(&config, &load_snapshot(&snapshot)?),
        Command::Validate { snapshot } => run_validate(&config, &load_snapshot(&snapshot)?),
        Command::Expenses {
            snapshot,
            sort,
            category,
            paid_by,
        } => {
            let mut query = ExpenseQuery::new(sort);
            if let Some(category) = category {
                query = query.category(category);
            }
            if let Some(member) = paid_by {
                query = query.paid_by(member.as_str());
            }
            run_expenses(&config, &load_snapshot(&snapshot)?, &query)
        }
        Command::Payments {
            snapshot,
            sort,
            recorded_by,
        } => {
            let mut query = PaymentQuery::new(sort);
            if let Some(member) = recorded_by {
                query = query.recorded_by(member.as_str());
            }
            run_payments(&config, &load_snapshot(&snapshot)?, &query)
        }
        Command::Record {
            snapshot,
            from,
            to,
            recorded_by,
            currency,
            notes,
        } => {
            let snapshot = load_snapshot(&snapshot)?;
            let currency = currency
                .or_else(|| config.display.currency.clone())
                .or_else(|| trip_currency(&snapshot))
                .context("No currency given and the trip has no single currency; pass --currency")?;
            let mut request = RecordRequest::new(recorded_by.as_str(), currency);
            if let Some(notes) = notes {
                request = request.with_notes(notes);
            }
            run_record(&config, &snapshot, &from.as_str().into(), &to.as_str().into(), request)
        }
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let _ = if logging.json {
        builder.json().with_target(false).try_init()
    } else {
        builder.try_init()
    };
}

fn load_snapshot(path: &Path) -> anyhow::Result<TripSnapshot> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    let snapshot = TripSnapshot::from_json(&json)
        .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;

    tracing::info!(
        members = snapshot.members.len(),
        expenses = snapshot.expenses.len(),
        payments = snapshot.payments.len(),
        "Snapshot loaded"
    );

    Ok(snapshot)
}

/// The one currency every expense uses, if there is exactly one
fn trip_currency(snapshot: &TripSnapshot) -> Option<String> {
    let mut currencies = snapshot.expenses.iter().map(|e| e.currency.as_str());
    let first = currencies.next()?;
    currencies.all(|c| c == first).then(|| first.to_string())
}

fn print_json<T: serde::Serialize + ?Sized>(config: &Config, value: &T) -> anyhow::Result<()> {
    println!("{}", to_json(value, config.output.pretty)?);
    Ok(())
}

fn run_settle(config: &Config, snapshot: &TripSnapshot) -> anyhow::Result<()> {
    let report = SettlementReport::build(snapshot);

    match config.output.format {
        OutputFormat::Json => print_json(config, &report),
        OutputFormat::Text => {
            let currency = config.display.currency.clone().or_else(|| trip_currency(snapshot));
            print!(
                "{}",
                report.render_text(config.display.decimal_places, currency.as_deref())
            );
            Ok(())
        }
    }
}

fn run_validate(config: &Config, snapshot: &TripSnapshot) -> anyhow::Result<()> {
    let mut validator = Validator::new().with_members(&snapshot.members);
    if let Some(currency) = &config.display.currency {
        validator = validator.with_base_currency(currency.clone());
    }

    let mut failures: Vec<(String, String)> = Vec::new();
    for record in &snapshot.expenses {
        if let Err(e) = validator.validate_expense(record.clone()) {
            failures.push((record.id.clone(), e.to_string()));
        }
    }
    for payment in &snapshot.payments {
        if let Err(e) = validator.validate_payment(payment) {
            failures.push((payment.id.clone(), e.to_string()));
        }
    }

    match config.output.format {
        OutputFormat::Json => {
            let rows: Vec<serde_json::Value> = failures
                .iter()
                .map(|(id, error)| serde_json::json!({ "id": id, "error": error }))
                .collect();
            print_json(config, &rows)?;
        }
        OutputFormat::Text => {
            for (id, error) in &failures {
                println!("{id}: {error}");
            }
            if failures.is_empty() {
                println!(
                    "{} expenses and {} payments are valid",
                    snapshot.expenses.len(),
                    snapshot.payments.len()
                );
            }
        }
    }

    if !failures.is_empty() {
        bail!("{} invalid records", failures.len());
    }
    Ok(())
}

fn run_expenses(
    config: &Config,
    snapshot: &TripSnapshot,
    query: &ExpenseQuery,
) -> anyhow::Result<()> {
    let expenses = snapshot.resolved_expenses();
    let view = query.apply(&expenses);

    match config.output.format {
        OutputFormat::Json => print_json(config, &view),
        OutputFormat::Text => {
            if view.is_empty() {
                println!("No expenses");
            }
            for expense in &view {
                let date = expense
                    .date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "----------".to_string());
                let amount = format_amount(
                    expense.amount,
                    config.display.decimal_places,
                    Some(&expense.currency),
                );
                println!(
                    "{date}  {}  {}  [{}]  paid by {}",
                    expense.description,
                    amount,
                    expense.category,
                    member_label(&snapshot.members, &expense.paid_by),
                );
            }
            Ok(())
        }
    }
}

fn run_payments(
    config: &Config,
    snapshot: &TripSnapshot,
    query: &PaymentQuery,
) -> anyhow::Result<()> {
    let view = query.apply(&snapshot.payments);

    match config.output.format {
        OutputFormat::Json => print_json(config, &view),
        OutputFormat::Text => {
            if view.is_empty() {
                println!("No recorded payments");
            }
            for payment in &view {
                let amount = format_amount(
                    payment.amount,
                    config.display.decimal_places,
                    Some(&payment.currency),
                );
                print!(
                    "{}  {} -> {}  {}  (by {})",
                    payment.date_recorded.format("%Y-%m-%d %H:%M"),
                    member_label(&snapshot.members, &payment.from_user_id),
                    member_label(&snapshot.members, &payment.to_user_id),
                    amount,
                    member_label(&snapshot.members, &payment.recorded_by),
                );
                match &payment.notes {
                    Some(notes) => println!("  {notes}"),
                    None => println!(),
                }
            }

            let names: Vec<String> = recorders(&snapshot.payments, &snapshot.members)
                .into_iter()
                .map(|(_, name)| name)
                .collect();
            if !names.is_empty() {
                println!("Recorded by: {}", names.join(", "));
            }
            Ok(())
        }
    }
}

fn run_record(
    config: &Config,
    snapshot: &TripSnapshot,
    from: &MemberId,
    to: &MemberId,
    request: RecordRequest,
) -> anyhow::Result<()> {
    let report = SettlementReport::build(snapshot);
    let transaction = report.plan.find(from, to).ok_or_else(|| Error::NoSuchTransfer {
        from: from.to_string(),
        to: to.to_string(),
    })?;

    let validator = Validator::new().with_members(&snapshot.members);
    let payment = record_settlement_with(&validator, transaction, request)?;

    print_json(config, &payment)
}
