//! Demo data generation for local evaluation.

use chrono::{Duration, Utc};
use jobdesk_core::models::customer::{CreateCustomerRequest, Customer};
use jobdesk_core::models::job::{CreateJobRequest, Job};
use jobdesk_core::Database;
use rand::seq::SliceRandom;
use rand::Rng;

const FIRST_NAMES: &[&str] = &[
    "Jo", "Alex", "Sam", "Morgan", "Casey", "Riley", "Jamie", "Taylor", "Robin", "Charlie",
    "Ashley", "Jordan", "Frankie", "Eddie", "Nicky", "Pat",
];

const LAST_NAMES: &[&str] = &[
    "Archer", "Bennett", "Carter", "Dawson", "Ellis", "Foster", "Graham", "Hughes", "Irwin",
    "Jennings", "Kerr", "Lawson", "Mercer", "Norris", "Osborne", "Parker",
];

const TOWNS: &[&str] = &[
    "Leeds", "Harrogate", "Wetherby", "Otley", "Ilkley", "Shipley", "Bingley", "Skipton",
];

const STREETS: &[&str] = &[
    "High Street", "Church Lane", "Mill Road", "Station Road", "Park Avenue", "The Green",
    "Victoria Road", "Main Street",
];

fn pick<'a>(rng: &mut impl Rng, values: &[&'a str]) -> &'a str {
    values.choose(rng).copied().unwrap_or("")
}

/// Generate `customers` demo customers, each with a handful of jobs.
///
/// # Returns
/// The number of customers and jobs created.
pub(crate) fn run(database: &Database, customers: usize) -> anyhow::Result<(usize, usize)> {
    let mut rng = rand::thread_rng();
    let mut created_jobs = 0usize;

    for _ in 0..customers {
        let name = format!("{} {}", pick(&mut rng, FIRST_NAMES), pick(&mut rng, LAST_NAMES));
        let town = pick(&mut rng, TOWNS);
        let customer = Customer::new(CreateCustomerRequest {
            email: format!(
                "{}@example.com",
                name.to_lowercase().replace(' ', ".")
            ),
            phone: format!("07{:09}", rng.gen_range(0..1_000_000_000u32)),
            location: town.to_string(),
            billing_address: format!(
                "{} {}, {}",
                rng.gen_range(1..120),
                pick(&mut rng, STREETS),
                town
            ),
            post_code: format!("LS{} {}AB", rng.gen_range(1..20), rng.gen_range(1..10)),
            name,
        });
        database.customers.create(&customer)?;

        for _ in 0..rng.gen_range(0..4) {
            let job = Job::new(CreateJobRequest {
                customer_id: customer.id.clone(),
                date: Utc::now() - Duration::days(rng.gen_range(0..365)),
                windows: rng.gen_bool(0.8),
                gutters: rng.gen_bool(0.4),
                conservatory: rng.gen_bool(0.2),
                solar_panels: rng.gen_bool(0.1),
                quoted_price: rng.gen_range(15..90) * 100,
                comments: String::new(),
            });
            database.jobs.create(&job)?;
            created_jobs += 1;
        }
    }

    Ok((customers, created_jobs))
}
