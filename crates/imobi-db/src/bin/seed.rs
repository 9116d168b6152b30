//! # Seed Data Generator
//!
//! Populates the database with clients, listings and contracts for
//! development.
//!
//! ## Usage
//! ```bash
//! # Defaults: 20 clients, 40 listings, 10 contracts into IMOBI_DATABASE_PATH
//! cargo run -p imobi-db --bin seed
//!
//! # Custom amounts and database path
//! cargo run -p imobi-db --bin seed -- --clients 100 --listings 300 --db ./data/imobi.db
//!
//! # Show repository debug logs
//! RUST_LOG=imobi_db=debug cargo run -p imobi-db --bin seed
//! ```
//!
//! ## Generated Data
//! - Clients with valid CPF / CNPJ documents (check digits computed)
//! - Listings spread over a few postal prefixes, so codes run past 001
//! - Contracts over varied terms, fees and due days, each with its full
//!   installment schedule

use chrono::{Months, NaiveDate};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use imobi_core::{document, Contract, CoreError, DocumentKind, Money, Percentage};
use imobi_db::{Database, DbConfig, NewClient, NewContract, NewListing};

/// Property type tags with their display names.
const LISTING_KINDS: &[(&str, &str)] = &[
    ("AP", "Apartamento"),
    ("CA", "Casa"),
    ("SL", "Sala comercial"),
    ("TE", "Terreno"),
];

/// Postal codes with a street to go with them.
const ADDRESSES: &[(&str, &str)] = &[
    ("01310-100", "Av. Paulista"),
    ("01310-200", "Rua Augusta"),
    ("04538-132", "Av. Brigadeiro Faria Lima"),
    ("22041-001", "Av. Atlantica"),
    ("30130-010", "Av. Afonso Pena"),
    ("80010-000", "Rua XV de Novembro"),
];

const FIRST_NAMES: &[&str] = &[
    "Ana", "Bruno", "Carla", "Diego", "Elisa", "Fabio", "Gabriela", "Heitor", "Isabela", "Joao",
];

const LAST_NAMES: &[&str] = &[
    "Silva", "Souza", "Oliveira", "Santos", "Pereira", "Costa", "Almeida", "Ribeiro",
];

/// Administration fees in basis points.
const COMMISSION_RATES: &[i64] = &[1000, 800, 825, 1200];

const TERMS: &[i64] = &[12, 24, 30];

const DUE_DAYS: &[i64] = &[5, 10, 15, 31];

#[derive(Parser)]
#[command(name = "seed")]
#[command(about = "Imobi development data generator")]
struct Args {
    /// Database file path (overrides IMOBI_DATABASE_PATH)
    #[arg(short, long)]
    db: Option<PathBuf>,

    /// Number of clients to register
    #[arg(long, default_value_t = 20)]
    clients: usize,

    /// Number of listings to create
    #[arg(long, default_value_t = 40)]
    listings: usize,

    /// Number of contracts to sign
    #[arg(long, default_value_t = 10)]
    contracts: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();

    let mut config = DbConfig::from_env()?;
    if let Some(path) = args.db {
        config.database_path = path;
    }

    println!("Imobi Seed Data Generator");
    println!("=========================");
    println!("Database:  {}", config.database_path.display());
    println!("Clients:   {}", args.clients);
    println!("Listings:  {}", args.listings);
    println!("Contracts: {}", args.contracts);
    println!();

    let db = Database::new(config).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.clients().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} clients", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();

    // Clients
    let mut client_ids = Vec::with_capacity(args.clients);
    for index in 0..args.clients {
        let client = match generate_client(index) {
            Ok(client) => client,
            Err(e) => {
                warn!(index, error = %e, "Skipping generated document");
                continue;
            }
        };
        match db.clients().insert(&client).await {
            Ok(record) => client_ids.push(record.id),
            Err(e) => warn!(document = %client.document, error = %e, "Skipping client"),
        }
    }
    println!("✓ Registered {} clients", client_ids.len());

    if client_ids.is_empty() {
        println!("  No clients, nothing else to seed.");
        return Ok(());
    }

    // Listings
    let mut listings = Vec::with_capacity(args.listings);
    for index in 0..args.listings {
        let owner_id = &client_ids[index % client_ids.len()];
        let listing = db.listings().create(&generate_listing(index, owner_id)).await?;
        listings.push(listing);
    }
    println!("✓ Created {} listings", listings.len());
    if let Some(last) = listings.last() {
        println!("  Last code: {}", last.code);
    }

    // Contracts
    let mut installments = 0;
    for index in 0..args.contracts.min(listings.len()) {
        let tenant_id = &client_ids[(index + 1) % client_ids.len()];
        let new = NewContract {
            listing_id: listings[index].id.clone(),
            tenant_id: tenant_id.clone(),
            terms: generate_terms(index)?,
        };
        let contract = db.contracts().create(&new).await?;
        installments += db.contracts().installments(&contract.id).await?.len();
    }
    println!(
        "✓ Signed {} contracts ({} installments)",
        db.contracts().count().await?,
        installments
    );

    let elapsed = start.elapsed();
    info!(elapsed_ms = elapsed.as_millis() as u64, "Seed finished");

    println!();
    println!("✓ Seed complete in {:?}!", elapsed);

    db.close().await;
    Ok(())
}

/// `RUST_LOG` wins; otherwise repository logs at info.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("imobi_db=info,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Every fourth client is a company.
fn generate_client(index: usize) -> Result<NewClient, CoreError> {
    let first = FIRST_NAMES[index % FIRST_NAMES.len()];
    let last = LAST_NAMES[(index / FIRST_NAMES.len() + index) % LAST_NAMES.len()];

    let (doc, name) = if index % 4 == 3 {
        let body = format!("{:08}0001", 10_000_000 + (index * 7_919) % 90_000_000);
        let doc = document::complete(DocumentKind::Organization, &body)?;
        (doc, format!("{} {} Imoveis Ltda", first, last))
    } else {
        let body = format!("{:09}", 100_000_000 + (index * 104_729) % 900_000_000);
        let doc = document::complete(DocumentKind::Individual, &body)?;
        (doc, format!("{} {}", first, last))
    };

    let (postal_code, street) = ADDRESSES[index % ADDRESSES.len()];

    Ok(NewClient {
        document: doc.formatted(),
        name,
        email: Some(format!(
            "{}.{}{}@example.com",
            first.to_lowercase(),
            last.to_lowercase(),
            index
        )),
        phone: Some(format!("(11) 9{:04}-{:04}", 1000 + index % 9000, index % 10_000)),
        postal_code: Some(postal_code.to_string()),
        address: Some(format!("{}, {}", street, 10 + index)),
    })
}

fn generate_listing(index: usize, owner_id: &str) -> NewListing {
    let (kind, label) = LISTING_KINDS[index % LISTING_KINDS.len()];
    let (postal_code, street) = ADDRESSES[(index / LISTING_KINDS.len()) % ADDRESSES.len()];
    let seed = index as i64;

    let (bedrooms, suites) = match kind {
        "AP" | "CA" => (1 + seed % 4, seed % 2),
        _ => (0, 0),
    };

    NewListing {
        kind: kind.to_string(),
        postal_code: postal_code.to_string(),
        // R$150.000,00 - R$1.650.000,00 in R$50.000 steps
        asking_price: Money::from_cents((150_000 + (seed * 7 % 31) * 50_000) * 100),
        address: format!("{}, {}", street, 100 + seed * 3),
        complement: (kind == "AP").then(|| format!("Apto {}", 11 + seed % 90)),
        area_m2: 40 + (seed * 13) % 260,
        bedrooms,
        suites,
        parking_spaces: seed % 3,
        notes: Some(format!("{} de demonstracao", label)),
        owner_id: Some(owner_id.to_string()),
        owner_document: None,
    }
}

fn generate_terms(index: usize) -> Result<Contract, Box<dyn std::error::Error>> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("invalid base date")?;
    let start_date = base
        .checked_add_months(Months::new((index % 12) as u32))
        .ok_or("start date out of range")?;
    let seed = index as i64;

    Ok(Contract::new(
        // R$1.200,00 - R$4.950,00, with some odd centavos
        Money::from_cents(120_000 + (seed * 37 % 16) * 25_000 + seed % 3 * 33),
        start_date,
        TERMS[index % TERMS.len()],
        DUE_DAYS[index % DUE_DAYS.len()],
    )
    .with_commission(Percentage::from_bps(
        COMMISSION_RATES[index % COMMISSION_RATES.len()],
    )))
}
