//! Interactive browse loop and one-shot console commands.

use jobdesk_core::db::job::JobStore;
use jobdesk_core::gateway::{PageQuery, Predicate, RecordGateway};
use jobdesk_core::models::customer::{
    CreateCustomerRequest, Customer, CustomerFilter, UpdateCustomerRequest,
};
use jobdesk_core::models::job::Job;
use jobdesk_core::{Config, Database, Listing, ListingView};
use std::io::Write as _;
use std::sync::Arc;

/// A parsed browse-loop command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BrowseCommand {
    Next,
    Previous,
    Refresh,
    Filter(CustomerFilter),
    ClearFilter,
    Add { name: String },
    Set { id: String, update: FieldUpdate },
    Remove { id: String },
    Jobs { customer_id: String },
    Help,
    Quit,
}

/// One `field=value` assignment from a `set` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FieldUpdate {
    pub field: String,
    pub value: String,
}

impl FieldUpdate {
    fn into_request(self) -> Result<UpdateCustomerRequest, String> {
        let mut request = UpdateCustomerRequest::default();
        match self.field.as_str() {
            "name" => request.name = Some(self.value),
            "email" => request.email = Some(self.value),
            "phone" => request.phone = Some(self.value),
            "location" => request.location = Some(self.value),
            "billing_address" => request.billing_address = Some(self.value),
            "postcode" | "post_code" => request.post_code = Some(self.value),
            other => return Err(format!("unknown field '{other}'")),
        }
        Ok(request)
    }
}

/// Parse one line of browse-loop input.
pub(crate) fn parse_command(input: &str) -> Result<BrowseCommand, String> {
    let mut tokens = input.split_whitespace();
    let Some(head) = tokens.next() else {
        return Err("empty command".to_string());
    };
    match head {
        "n" | "next" => Ok(BrowseCommand::Next),
        "p" | "prev" | "previous" => Ok(BrowseCommand::Previous),
        "r" | "refresh" => Ok(BrowseCommand::Refresh),
        "c" | "clear" => Ok(BrowseCommand::ClearFilter),
        "h" | "help" | "?" => Ok(BrowseCommand::Help),
        "q" | "quit" | "exit" => Ok(BrowseCommand::Quit),
        "f" | "filter" => {
            let mut filter = CustomerFilter::default();
            let mut any = false;
            for pair in tokens {
                let Some((key, value)) = pair.split_once('=') else {
                    return Err(format!("expected key=value, got '{pair}'"));
                };
                match key {
                    "name" => filter.name = value.to_string(),
                    "email" => filter.email = value.to_string(),
                    "phone" => filter.phone = value.to_string(),
                    "location" => filter.location = value.to_string(),
                    "postcode" | "post_code" => filter.post_code = value.to_string(),
                    other => return Err(format!("unknown filter field '{other}'")),
                }
                any = true;
            }
            if !any {
                return Err("usage: filter name=<prefix> [email=..] [postcode=..]".to_string());
            }
            Ok(BrowseCommand::Filter(filter))
        }
        "add" => {
            let name = tokens.collect::<Vec<_>>().join(" ");
            if name.is_empty() {
                return Err("usage: add <name>".to_string());
            }
            Ok(BrowseCommand::Add { name })
        }
        "set" => {
            let Some(id) = tokens.next() else {
                return Err("usage: set <id> <field>=<value>".to_string());
            };
            let rest = tokens.collect::<Vec<_>>().join(" ");
            let Some((field, value)) = rest.split_once('=') else {
                return Err("usage: set <id> <field>=<value>".to_string());
            };
            Ok(BrowseCommand::Set {
                id: id.to_string(),
                update: FieldUpdate {
                    field: field.trim().to_string(),
                    value: value.trim().to_string(),
                },
            })
        }
        "rm" => match tokens.next() {
            Some(id) => Ok(BrowseCommand::Remove { id: id.to_string() }),
            None => Err("usage: rm <id>".to_string()),
        },
        "jobs" => match tokens.next() {
            Some(id) => Ok(BrowseCommand::Jobs {
                customer_id: id.to_string(),
            }),
            None => Err("usage: jobs <customer-id>".to_string()),
        },
        other => Err(format!("unknown command '{other}' (try 'help')")),
    }
}

/// Run the interactive customer browser until EOF or `quit`.
pub(crate) async fn browse(config: &Config, database: &Database) -> anyhow::Result<()> {
    let listing = Listing::new(
        Arc::new(database.customers.clone()),
        Customer::DEFAULT_ORDER,
        config.page_size,
        config.count_mode,
    );
    let mut filter = CustomerFilter::default();
    let _ = listing.load(&filter.filter_set()).await;
    render_customers(&listing.view(), &filter);
    print_help();

    let stdin = std::io::stdin();
    let mut line = String::new();
    loop {
        print!("jobdesk> ");
        std::io::stdout().flush()?;
        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        let command = match parse_command(input) {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };
        match command {
            BrowseCommand::Quit => break,
            BrowseCommand::Help => print_help(),
            BrowseCommand::Next => {
                let _ = listing.next().await;
            }
            BrowseCommand::Previous => {
                let _ = listing.previous().await;
            }
            BrowseCommand::Refresh => {
                let _ = listing.refresh().await;
            }
            BrowseCommand::Filter(new_filter) => {
                filter = new_filter;
                let _ = listing.load(&filter.filter_set()).await;
            }
            BrowseCommand::ClearFilter => {
                filter = CustomerFilter::default();
                let _ = listing.load(&filter.filter_set()).await;
            }
            BrowseCommand::Add { name } => {
                let customer = Customer::new(CreateCustomerRequest {
                    name,
                    email: String::new(),
                    phone: String::new(),
                    location: String::new(),
                    billing_address: String::new(),
                    post_code: String::new(),
                });
                if listing.create(&customer).await.is_ok() {
                    println!("created customer {}", customer.id);
                }
            }
            BrowseCommand::Set { id, update } => match update.into_request() {
                Ok(request) => {
                    let _ = listing.update(&id, &request).await;
                }
                Err(message) => {
                    println!("{message}");
                    continue;
                }
            },
            BrowseCommand::Remove { id } => {
                let _ = listing.remove(&id).await;
            }
            BrowseCommand::Jobs { customer_id } => {
                browse_jobs(config, database, &customer_id).await?;
                render_customers(&listing.view(), &filter);
                continue;
            }
        }
        render_customers(&listing.view(), &filter);
    }
    Ok(())
}

/// Paged job view for one customer: `n`/`p` to navigate, `q` to return.
async fn browse_jobs(
    config: &Config,
    database: &Database,
    customer_id: &str,
) -> anyhow::Result<()> {
    let Some(customer) = database.customers.get(customer_id)? else {
        println!("no customer with id '{customer_id}'");
        return Ok(());
    };
    let listing: Listing<Job, JobStore> = Listing::new(
        Arc::new(database.jobs.clone()),
        Job::DEFAULT_ORDER,
        config.page_size,
        config.count_mode,
    );
    let _ = listing.load(&Job::for_customer(customer.id.clone())).await;
    render_jobs(&listing.view(), &customer);

    let stdin = std::io::stdin();
    let mut line = String::new();
    loop {
        print!("jobs ({})> ", customer.name);
        std::io::stdout().flush()?;
        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        match line.trim() {
            "" => continue,
            "q" | "quit" => break,
            "n" | "next" => {
                let _ = listing.next().await;
            }
            "p" | "prev" | "previous" => {
                let _ = listing.previous().await;
            }
            "r" | "refresh" => {
                let _ = listing.refresh().await;
            }
            other => {
                println!("unknown command '{other}' (n/p/r/q)");
                continue;
            }
        }
        render_jobs(&listing.view(), &customer);
    }
    Ok(())
}

/// Print one customer and all of their jobs.
pub(crate) async fn show(database: &Database, id: &str) -> anyhow::Result<()> {
    let Some(customer) = database.customers.get(id)? else {
        anyhow::bail!("no customer with id '{id}'");
    };
    println!("{:<16} {}", "id:", customer.id);
    println!("{:<16} {}", "name:", customer.name);
    println!("{:<16} {}", "email:", customer.email);
    println!("{:<16} {}", "phone:", customer.phone);
    println!("{:<16} {}", "location:", customer.location);
    println!("{:<16} {}", "billing:", customer.billing_address);
    println!("{:<16} {}", "post code:", customer.post_code);

    let jobs = database
        .jobs
        .query_page(PageQuery {
            predicates: vec![Predicate::equals("customer_id", customer.id.clone())],
            order: Job::DEFAULT_ORDER,
            limit: None,
            start_after: None,
        })
        .await?;
    println!("\n{} job(s):", jobs.len());
    for job in &jobs {
        println!(
            "  {}  {}  {:>8}p  {}",
            job.id,
            job.date.format("%Y-%m-%d"),
            job.quoted_price,
            work_summary(job)
        );
    }
    Ok(())
}

fn work_summary(job: &Job) -> String {
    let mut parts = Vec::new();
    if job.windows {
        parts.push("windows");
    }
    if job.gutters {
        parts.push("gutters");
    }
    if job.conservatory {
        parts.push("conservatory");
    }
    if job.solar_panels {
        parts.push("solar");
    }
    if parts.is_empty() {
        parts.push("none");
    }
    let mut summary = parts.join("+");
    if !job.comments.is_empty() {
        summary.push_str(": ");
        summary.push_str(&job.comments);
    }
    summary
}

fn render_customers(view: &ListingView<Customer>, filter: &CustomerFilter) {
    println!(
        "{:<36} {:<22} {:<26} {:<14} {:<12} {:<8}",
        "ID", "NAME", "EMAIL", "PHONE", "LOCATION", "POSTCODE"
    );
    for customer in &view.records {
        println!(
            "{:<36} {:<22} {:<26} {:<14} {:<12} {:<8}",
            customer.id,
            customer.name,
            customer.email,
            customer.phone,
            customer.location,
            customer.post_code
        );
    }
    let mut footer = format!(
        "page {}/{} · {} customer(s)",
        view.page.page_index + 1,
        view.page.total_pages.max(1),
        view.page.total_items
    );
    if *filter != CustomerFilter::default() {
        footer.push_str(" · filtered");
    }
    println!("{footer}");
    if let Some(error) = &view.error {
        println!("error: {error} (retry with 'r')");
    }
}

fn render_jobs(view: &ListingView<Job>, customer: &Customer) {
    println!("jobs for {} <{}>", customer.name, customer.id);
    println!(
        "{:<36} {:<12} {:>9} {}",
        "ID", "DATE", "PRICE", "WORK"
    );
    for job in &view.records {
        println!(
            "{:<36} {:<12} {:>8}p {}",
            job.id,
            job.date.format("%Y-%m-%d"),
            job.quoted_price,
            work_summary(job)
        );
    }
    println!(
        "page {}/{} · {} job(s)",
        view.page.page_index + 1,
        view.page.total_pages.max(1),
        view.page.total_items
    );
    if let Some(error) = &view.error {
        println!("error: {error} (retry with 'r')");
    }
}

fn print_help() {
    println!("commands:");
    println!("  n/next, p/prev, r/refresh    page through customers");
    println!("  f name=<prefix> [email=..]   filter (prefix match per field)");
    println!("  c/clear                      clear filters");
    println!("  add <name>                   create a customer");
    println!("  set <id> <field>=<value>     update one field");
    println!("  rm <id>                      delete a customer");
    println!("  jobs <id>                    browse a customer's jobs");
    println!("  q/quit                       exit");
}

#[cfg(test)]
mod tests {
    use super::{parse_command, BrowseCommand, FieldUpdate};
    use jobdesk_core::models::customer::CustomerFilter;

    #[test]
    fn parse_command_accepts_navigation_aliases() {
        for input in ["n", "next"] {
            assert_eq!(parse_command(input), Ok(BrowseCommand::Next), "{input}");
        }
        for input in ["p", "prev", "previous"] {
            assert_eq!(parse_command(input), Ok(BrowseCommand::Previous), "{input}");
        }
        assert_eq!(parse_command("r"), Ok(BrowseCommand::Refresh));
        assert_eq!(parse_command("q"), Ok(BrowseCommand::Quit));
    }

    #[test]
    fn parse_command_builds_filters_from_pairs() {
        let parsed = parse_command("f name=Jo postcode=LS1").expect("parse");
        assert_eq!(
            parsed,
            BrowseCommand::Filter(CustomerFilter {
                name: "Jo".to_string(),
                post_code: "LS1".to_string(),
                ..CustomerFilter::default()
            })
        );
    }

    #[test]
    fn parse_command_rejects_unknown_filter_fields_and_bare_pairs() {
        assert!(parse_command("f colour=red").is_err());
        assert!(parse_command("f name").is_err());
        assert!(parse_command("f").is_err());
    }

    #[test]
    fn parse_command_joins_multi_word_names() {
        assert_eq!(
            parse_command("add Jo Smith"),
            Ok(BrowseCommand::Add {
                name: "Jo Smith".to_string()
            })
        );
        assert!(parse_command("add").is_err());
    }

    #[test]
    fn parse_command_splits_set_assignments() {
        assert_eq!(
            parse_command("set c01 name=Alex Carter"),
            Ok(BrowseCommand::Set {
                id: "c01".to_string(),
                update: FieldUpdate {
                    field: "name".to_string(),
                    value: "Alex Carter".to_string(),
                },
            })
        );
        assert!(parse_command("set c01 name").is_err());
        assert!(parse_command("set").is_err());
    }

    #[test]
    fn unknown_commands_point_at_help() {
        let err = parse_command("paginate").expect_err("unknown command");
        assert!(err.contains("help"));
    }

    #[test]
    fn field_updates_map_to_request_fields() {
        let request = FieldUpdate {
            field: "postcode".to_string(),
            value: "LS2 9ZZ".to_string(),
        }
        .into_request()
        .expect("known field");
        assert_eq!(request.post_code.as_deref(), Some("LS2 9ZZ"));

        let err = FieldUpdate {
            field: "colour".to_string(),
            value: "red".to_string(),
        }
        .into_request()
        .expect_err("unknown field");
        assert!(err.contains("colour"));
    }
}
