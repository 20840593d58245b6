use std::sync::Arc;
use std::time::Instant;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vlist::cache::VirtualizingCollection;
use vlist::provider::{UserProvider, UserSearchProvider};
use vlist::storage::UserTable;
use vlist::{CacheConfig, Result};

const NUM_USERS: usize = 1_000_000;

fn main() {
    init_logging();

    if let Err(err) = run() {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    println!("vlist - windowed virtualization cache");
    println!("=====================================\n");

    let config = match std::env::args().nth(1) {
        Some(path) => CacheConfig::from_file(&path)?,
        None => CacheConfig::default().with_page_size(200),
    };
    println!(
        "Page size: {}, page timeout: {} ms\n",
        config.page_size, config.page_timeout_ms
    );

    let started = Instant::now();
    let table = Arc::new(UserTable::generate(NUM_USERS));
    println!(
        "Seeded {} users in {} ms",
        table.len(),
        started.elapsed().as_millis()
    );

    // Browse all users
    let started = Instant::now();
    let mut users =
        VirtualizingCollection::with_config(UserProvider::new(Arc::clone(&table)), config.clone())?;
    let count = users.len()?;
    println!(
        "Collection ready: {} users ({} ms)",
        count,
        started.elapsed().as_millis()
    );

    // Scroll forward through the first screens, then jump deep and back up
    let started = Instant::now();
    for index in 0..1_000 {
        users.get(index)?;
    }
    info!("Scrolled 1000 rows, {} pages cached", users.tracked_page_count());

    let deep = count / 2;
    for index in (deep - 500..deep).rev() {
        users.get(index)?;
    }
    println!(
        "Scrolled 1500 rows in {} ms, cached pages: {:?}",
        started.elapsed().as_millis(),
        users
            .tracked_pages()
            .iter()
            .map(|p| p.as_usize())
            .collect::<Vec<_>>()
    );

    if let Some(user) = users.get(deep)? {
        println!("Row {}: {}", deep, user);
    }

    // Replace the collection for a search, as a UI would on a new term
    let term = "ali";
    let started = Instant::now();
    users.clear();
    let mut matches = VirtualizingCollection::with_config(
        UserSearchProvider::new(Arc::clone(&table), term),
        config,
    )?;
    let found = matches.len()?;
    println!(
        "\nSearch {:?}: {} matches ({} ms)",
        term,
        found,
        started.elapsed().as_millis()
    );

    for index in 0..found.min(5) {
        if let Some(user) = matches.get(index)? {
            println!("  - {}", user);
        }
    }

    println!("\nDemo completed successfully!");
    Ok(())
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vlist=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
