use anyhow::{bail, Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use std::env;
use std::path::Path;

use pilaris_control::{
    logging, parse_date, AttendanceStatus, NewExpense, RecordStore, Session, SqliteMedium,
    StoreConfig, Student, StudentPatch, TimeSlot,
};

const DB_PATH_ENV: &str = "PILARIS_DB";
const CONFIG_PATH_ENV: &str = "PILARIS_CONFIG";
const DEFAULT_DB_PATH: &str = "pilaris.db";

fn main() -> Result<()> {
    logging::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("day");
    let rest = args.get(1..).unwrap_or(&[]);

    match command {
        "day" => run_day(rest),
        "attend" => run_attend(rest),
        "expense" => run_expense(rest),
        "annual" => run_annual(rest),
        "services" => run_services(),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            print_usage();
            bail!("unknown command: {}", other)
        }
    }
}

fn print_usage() {
    println!("Usage: pilaris-control <command>");
    println!();
    println!("  day [DATE]                              daily report (default: today)");
    println!("  attend DATE TIME INDEX STATUS [NAME]    mark the INDEX-th student (1-based)");
    println!("  expense DATE AMOUNT DESCRIPTION...      record an expense");
    println!("  annual [YEAR]                           yearly summary (default: this year)");
    println!("  services                                list the service catalog");
    println!();
    println!("  {}      database path (default: {})", DB_PATH_ENV, DEFAULT_DB_PATH);
    println!("  {}  optional JSON config file", CONFIG_PATH_ENV);
}

fn open_store() -> Result<RecordStore<SqliteMedium>> {
    let config = match env::var(CONFIG_PATH_ENV) {
        Ok(path) => StoreConfig::from_file(Path::new(&path))?,
        Err(_) => StoreConfig::default(),
    };

    let db_path = env::var(DB_PATH_ENV).unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());
    let medium = SqliteMedium::open(&db_path)
        .with_context(|| format!("Failed to open database: {}", db_path))?;

    Ok(RecordStore::new(medium, config))
}

fn date_arg(args: &[String], index: usize) -> Result<NaiveDate> {
    match args.get(index) {
        Some(value) => Ok(parse_date(value)?),
        None => Ok(Local::now().date_naive()),
    }
}

fn run_day(args: &[String]) -> Result<()> {
    let date = date_arg(args, 0)?;
    let session = Session::open(open_store()?, date)?;
    let report = session.daily_report();

    println!("📅 {}", report.date);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  Revenue:    R$ {:>10.2}", report.revenue);
    println!("  Expenses:   R$ {:>10.2}", report.expenses);
    println!("  Net profit: R$ {:>10.2}", report.net_profit);

    if !report.attendance.is_empty() {
        println!("\n👥 Attendance");
        for line in &report.attendance {
            let name = if line.student_name.is_empty() { "(sem nome)" } else { line.student_name.as_str() };
            println!("  {}  {:<20} {:<18} {}", line.time, name, line.service_name, line.status.as_str());
        }
    }

    if !session.expenses().is_empty() {
        println!("\n💸 Expenses");
        for expense in session.expenses() {
            println!("  {:<32} R$ {:>8.2}", expense.description, expense.amount);
        }
    }

    Ok(())
}

fn run_attend(args: &[String]) -> Result<()> {
    if args.len() < 4 {
        bail!("usage: attend DATE TIME INDEX STATUS [NAME]");
    }

    let date = parse_date(&args[0])?;
    let time = &args[1];
    let index: usize = args[2].parse().context("INDEX must be a positive number")?;
    let status = AttendanceStatus::parse(&args[3])
        .with_context(|| format!("unknown status: {} (Vago, Presente, Faltou)", args[3]))?;

    let mut session = Session::open(open_store()?, date)?;
    let student_id = session
        .schedule()
        .iter()
        .find(|slot| &slot.time == time)
        .and_then(|slot| nth_student(slot, index))
        .map(|student| student.id.clone())
        .with_context(|| format!("no student #{} at {}", index, time))?;

    let mut patch = StudentPatch::status(status);
    if args.len() > 4 {
        patch = patch.with_name(args[4..].join(" "));
    }
    session.update_student(time, &student_id, patch)?;

    println!("✓ Student #{} at {} marked {}", index, time, status.as_str());
    println!("  Day revenue: R$ {:.2}", session.daily_report().revenue);
    Ok(())
}

/// 1-based position within a slot; 0 matches nobody
fn nth_student(slot: &TimeSlot, index: usize) -> Option<&Student> {
    index.checked_sub(1).and_then(|i| slot.students.get(i))
}

fn run_expense(args: &[String]) -> Result<()> {
    if args.len() < 3 {
        bail!("usage: expense DATE AMOUNT DESCRIPTION...");
    }

    let date = parse_date(&args[0])?;
    let amount: f64 = args[1].parse().context("AMOUNT must be a number")?;
    let description = args[2..].join(" ");

    let mut session = Session::open(open_store()?, date)?;
    let expense = session.add_expense(NewExpense::new(description, amount))?;

    println!("✓ Expense recorded: {} R$ {:.2} on {}", expense.description, expense.amount, expense.date);
    Ok(())
}

fn run_annual(args: &[String]) -> Result<()> {
    let year = match args.first() {
        Some(value) => value.parse::<i32>().context("YEAR must be a number")?,
        None => Local::now().year(),
    };

    let store = open_store()?;
    let tax_rate = store.config().tax_rate;
    let settings = store.load_settings();
    let data = store.annual_data(year);
    let summary = data.summarize(&settings.services, tax_rate);

    println!("📊 Annual summary {}", year);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  Gross revenue:  R$ {:>10.2}", summary.total_revenue);
    println!("  Expenses:       R$ {:>10.2}", summary.total_expenses);
    println!("  Net profit:     R$ {:>10.2}", summary.net_profit);
    println!("  Estimated tax:  R$ {:>10.2}", summary.estimated_tax);
    println!("  Days recorded:  {:>13}", data.days_with_records());
    println!();
    println!(
        "  Simplified estimate: {:.0}% of gross revenue. Consult an accountant.",
        tax_rate * 100.0
    );

    Ok(())
}

fn run_services() -> Result<()> {
    let store = open_store()?;
    let settings = store.load_settings();

    println!("🧾 Services");
    for service in &settings.services {
        println!("  {:<24} R$ {:>8.2}  ({})", service.name, service.price, service.id);
    }
    println!("\n🏷️  Tags: {}", settings.student_tags.join(", "));

    Ok(())
}
