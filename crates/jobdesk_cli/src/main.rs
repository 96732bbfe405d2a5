//! JobDesk admin console entrypoint.

mod commands;
mod seed;

use clap::{Parser, Subcommand};
use jobdesk_core::models::customer::{CreateCustomerRequest, Customer};
use jobdesk_core::{Config, Database};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "jobdesk", about = "Admin console for customers and jobs")]
struct Cli {
    /// Database directory (overrides DB_PATH).
    #[arg(long)]
    db_path: Option<String>,

    /// Records per page in listings (overrides PAGE_SIZE).
    #[arg(long)]
    page_size: Option<usize>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive customer browser (the default).
    Browse,
    /// Populate the database with demo customers and jobs.
    Seed {
        /// Number of customers to generate.
        #[arg(long, default_value_t = 25)]
        customers: usize,
    },
    /// Add a customer.
    Add {
        /// Customer name.
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        location: String,
        #[arg(long, default_value = "")]
        billing_address: String,
        #[arg(long, default_value = "")]
        post_code: String,
    },
    /// Show one customer and their jobs.
    Show {
        /// Customer id.
        id: String,
    },
    /// Delete a customer and every job that references it.
    Rm {
        /// Customer id.
        id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jobdesk=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(db_path) = cli.db_path {
        config.db_path = db_path;
    }
    if let Some(page_size) = cli.page_size {
        config.page_size = page_size.max(1);
    }

    let database = Database::new(&config.db_path)?;
    tracing::info!(db_path = %config.db_path, "database ready");

    match cli.command.unwrap_or(Command::Browse) {
        Command::Browse => commands::browse(&config, &database).await?,
        Command::Seed { customers } => {
            let (created_customers, created_jobs) = seed::run(&database, customers)?;
            println!("seeded {created_customers} customers and {created_jobs} jobs");
        }
        Command::Add {
            name,
            email,
            phone,
            location,
            billing_address,
            post_code,
        } => {
            let customer = Customer::new(CreateCustomerRequest {
                name,
                email,
                phone,
                location,
                billing_address,
                post_code,
            });
            database.customers.create(&customer)?;
            println!("created customer {}", customer.id);
        }
        Command::Show { id } => commands::show(&database, &id).await?,
        Command::Rm { id } => {
            if database.delete_customer_with_jobs(&id)? {
                println!("deleted customer {id}");
            } else {
                anyhow::bail!("no customer with id '{id}'");
            }
        }
    }

    Ok(())
}
