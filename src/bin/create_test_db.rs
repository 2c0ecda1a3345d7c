use std::{error::Error, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use finance_track::{
    BudgetPeriod, Category, CategoryKind, Email, NewBudget, NewRecord, PasswordHash, RecordKind,
    Username, ValidatedPassword, create_budget, create_record, get_categories_by_kind,
    initialize_db, register_new_user,
};

/// A utility for creating a database with a demo user and sample data for FinanceTrack.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// Email address of the demo user.
    #[arg(long, default_value = "demo@example.com")]
    email: String,

    /// Username of the demo user.
    #[arg(long, default_value = "Demo User")]
    username: String,

    /// Password of the demo user. You will be prompted for one if omitted.
    #[arg(long)]
    password: Option<String>,
}

/// Monthly income per category name.
const MONTHLY_INCOME: [(&str, f64, &str); 2] = [
    ("Salary", 4200.0, "Monthly salary"),
    ("Freelance", 650.0, "Website project"),
];

/// Monthly expenses per category name.
const MONTHLY_EXPENSES: [(&str, f64, &str); 6] = [
    ("Housing", 1600.0, "Rent"),
    ("Food", 420.5, "Groceries"),
    ("Transportation", 135.0, "Fuel and bus fares"),
    ("Entertainment", 64.99, "Streaming and cinema"),
    ("Health", 48.0, "Pharmacy"),
    ("Shopping", 210.0, "New shoes"),
];

/// Budgets per expense category name, starting at the beginning of the sample data.
const BUDGETS: [(&str, f64, BudgetPeriod); 3] = [
    ("Food", 2800.0, BudgetPeriod::Monthly),
    ("Entertainment", 300.0, BudgetPeriod::Monthly),
    ("Shopping", 1000.0, BudgetPeriod::Yearly),
];

/// How many months of records to create.
const SAMPLE_MONTHS: i64 = 6;

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    if output_path
        .extension()
        .is_none_or(|extension| extension.is_empty())
    {
        eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
        exit(1);
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    let email = Email::new(&args.email)?;
    let username = Username::new(&args.username)?;
    let raw_password = match args.password {
        Some(password) => password,
        None => rpassword::prompt_password("Password for the demo user: ")?,
    };
    let password_hash = PasswordHash::new(
        ValidatedPassword::new(&raw_password)?,
        PasswordHash::DEFAULT_COST,
    )?;

    println!("Creating database at {output_path:#?}");
    let mut connection = Connection::open(output_path)?;
    initialize_db(&connection)?;

    println!("Creating demo user {email}...");
    let user = register_new_user(username, email, password_hash, &mut connection)?;

    let income_categories = get_categories_by_kind(user.id, CategoryKind::Income, &connection)?;
    let expense_categories = get_categories_by_kind(user.id, CategoryKind::Expense, &connection)?;
    let find_category = |categories: &[Category], name: &str| {
        categories
            .iter()
            .find(|category| category.name.as_ref() == name)
            .map(|category| category.id)
            .ok_or_else(|| format!("missing default category {name}"))
    };

    let today = OffsetDateTime::now_utc().date();
    let first_day = today - Duration::days(30 * (SAMPLE_MONTHS - 1));

    println!("Creating income and expenses...");
    for month in 0..SAMPLE_MONTHS {
        let date = first_day + Duration::days(30 * month);

        for (name, amount, description) in MONTHLY_INCOME {
            create_record(
                RecordKind::Income,
                user.id,
                NewRecord {
                    category_id: find_category(&income_categories, name)?,
                    amount,
                    description: description.to_owned(),
                    date,
                },
                &connection,
            )?;
        }

        for (offset, (name, amount, description)) in MONTHLY_EXPENSES.into_iter().enumerate() {
            create_record(
                RecordKind::Expense,
                user.id,
                NewRecord {
                    category_id: find_category(&expense_categories, name)?,
                    amount,
                    description: description.to_owned(),
                    date: (date + Duration::days(offset as i64 * 3)).min(today),
                },
                &connection,
            )?;
        }
    }

    println!("Creating budgets...");
    for (name, amount, period) in BUDGETS {
        create_budget(
            user.id,
            NewBudget {
                category_id: find_category(&expense_categories, name)?,
                amount,
                period,
                start_date: first_day,
                end_date: None,
            },
            &connection,
        )?;
    }

    println!("Success!");

    Ok(())
}
