use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Date, Duration, OffsetDateTime};

use folio_rs::{
    ContentForm, ContentKind, EntryForm, EntryKind, MessageForm, NewAdmin, PasswordHash,
    ValidatedPassword, WalletForm, create_admin, create_content, create_entry, create_message,
    create_wallet, initialize_db,
};

/// A utility for creating a test database for the Folio web server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test admin admin@example.com with the password \"test\"...");
    let admin = create_admin(
        NewAdmin {
            user_name: "Test Admin".to_owned(),
            email: "admin@example.com".to_owned(),
            password_hash: PasswordHash::new(
                ValidatedPassword::new_unchecked("test"),
                PasswordHash::DEFAULT_COST,
            )?,
        },
        &conn,
    )?;

    println!("Creating wallets...");
    let mut wallet_ids = Vec::new();
    for name in ["Cash", "Current account", "Savings"] {
        let wallet = create_wallet(
            &WalletForm {
                name: Some(name.to_owned()),
                user_id: None,
            },
            admin.id,
            &conn,
        )?;
        wallet_ids.push(wallet.id);
    }

    println!("Creating incomes and expenses...");
    let today = OffsetDateTime::now_utc().date();
    for month in 0..3 {
        let date = today - Duration::days(30 * month);
        create_entry(
            EntryKind::Income,
            &entry("Salary", 2500.0, Some(wallet_ids[1]), date),
            admin.id,
            today,
            &conn,
        )?;

        for (i, (description, amount)) in [("Groceries", 82.45), ("Rent", 950.0), ("Coffee", 3.2)]
            .into_iter()
            .enumerate()
        {
            let wallet_id = wallet_ids.get(i % 2).copied();
            create_entry(
                EntryKind::Expense,
                &entry(description, amount, wallet_id, date - Duration::days(i as i64)),
                admin.id,
                today,
                &conn,
            )?;
        }
    }
    create_entry(
        EntryKind::Expense,
        &entry("Birthday present", 25.0, None, today),
        admin.id,
        today,
        &conn,
    )?;

    println!("Creating articles and projects...");
    for (title, tags) in [
        ("Hello, World!", vec!["meta"]),
        ("Writing a web server in Rust", vec!["rust", "web"]),
        ("Testing with SQLite", vec!["rust", "sql"]),
    ] {
        create_content(
            ContentKind::Article,
            &ContentForm {
                title: Some(title.to_owned()),
                summary: Some(format!("A short post about {}.", title.to_lowercase())),
                description: Some(format!("<p>{title}</p><p>More to come.</p>")),
                tags: Some(tags.into_iter().map(str::to_owned).collect()),
                ..Default::default()
            },
            &conn,
        )?;
    }

    for (name, tags) in [("Folio", vec!["rust", "web"]), ("Budget CLI", vec!["rust"])] {
        create_content(
            ContentKind::Project,
            &ContentForm {
                title: Some(name.to_owned()),
                summary: Some(format!("The {name} project.")),
                email: Some("admin@example.com".to_owned()),
                tags: Some(tags.into_iter().map(str::to_owned).collect()),
                ..Default::default()
            },
            &conn,
        )?;
    }

    println!("Creating messages...");
    for subject in ["Hello", "Job offer"] {
        create_message(
            &MessageForm {
                subject: Some(subject.to_owned()),
                email: Some("visitor@example.com".to_owned()),
                message: Some(format!("{subject}, nice site!")),
                status: None,
            },
            &conn,
        )?;
    }

    println!("Success!");

    Ok(())
}

fn entry(description: &str, amount: f64, wallet_id: Option<i64>, date: Date) -> EntryForm {
    EntryForm {
        description: Some(description.to_owned()),
        amount: Some(amount),
        currency: Some("GBP".to_owned()),
        wallet_id,
        date: Some(date),
    }
}
