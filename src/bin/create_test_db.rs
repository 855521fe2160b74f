use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;

use passbook_rs::{
    AmountUpdate, NewAccount, TransactionKind, create_account, initialize_db, update_amount,
};

/// A utility for creating a test database for the REST API server of passbook_rs.
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

    println!("Creating test account...");

    let account = create_account(
        &NewAccount {
            account_number: None,
            name: "Test Account".to_owned(),
            email: "test@example.com".to_owned(),
            phone: "0000000000".to_owned(),
            aadhar_card: "0000 0000 0000".to_owned(),
        },
        &conn,
    )?;

    for (amount, kind) in [
        (1000.0, TransactionKind::Credit),
        (250.0, TransactionKind::Debit),
        (75.5, TransactionKind::Credit),
    ] {
        update_amount(
            &account.account_number,
            &AmountUpdate::new(amount, kind),
            &conn,
        )?;
    }

    println!(
        "Success! Created account {} with three transactions.",
        account.account_number
    );

    Ok(())
}
