use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use kunai_core::config::{Settings, load_config};
use kunai_core::constants::TODO_ENTRY_SUFFIX;
use kunai_db::db::MemoryStore;
use kunai_rfc::rfc::ical::core::names;
use kunai_rfc::rfc::ical::parse::parse;
use kunai_service::codec::strip_mailto;
use kunai_service::{MemoryListingCache, TodoService};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "kunai")]
#[command(about = "Import iCalendar to-dos into an in-memory store and print them back")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import `.ics` files into one user's calendar and print every calendar
    Import {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Email of the importing user
        #[arg(long, default_value = "user@example.com")]
        email: String,

        /// Display name of the importing user
        #[arg(long, default_value = "User")]
        name: String,

        /// Preferred timezone of the importing user (IANA name)
        #[arg(long)]
        timezone: Option<String>,

        /// Give every attendee found in the files a calendar of their own
        #[arg(long)]
        with_attendees: bool,

        /// Roll the import back instead of committing it
        #[arg(long)]
        dry_run: bool,
    },
}

struct ImportArgs {
    files: Vec<PathBuf>,
    email: String,
    name: String,
    timezone: Option<String>,
    with_attendees: bool,
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config().context("failed to load configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.logging.level.as_str()));
    match filter {
        Ok(filter) => {
            if let Err(e) = filter_handle.modify(|current| *current = filter) {
                tracing::warn!(error = %e, "Failed to update log filter");
            }
        }
        Err(_) => {
            tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping info");
        }
    }

    match cli.command {
        Commands::Import {
            files,
            email,
            name,
            timezone,
            with_attendees,
            dry_run,
        } => {
            import(
                &config,
                ImportArgs {
                    files,
                    email,
                    name,
                    timezone,
                    with_attendees,
                    dry_run,
                },
            )
            .await
        }
    }
}

async fn import(settings: &Settings, args: ImportArgs) -> Result<()> {
    let service = TodoService::new(settings, Arc::new(MemoryListingCache::new()))
        .context("invalid calendar settings")?;

    let mut documents = Vec::with_capacity(args.files.len());
    for file in &args.files {
        let body = tokio::fs::read_to_string(file)
            .await
            .with_context(|| format!("failed to read {}", file.display()))?;
        documents.push((file.clone(), body));
    }

    let mut store = MemoryStore::new();
    let user = store.add_user(args.name.as_str(), args.email.as_str(), args.timezone.as_deref());
    let calendar = store.add_calendar(format!("{}'s to-dos", args.name), user);
    let mut calendars = vec![(calendar, user, args.email.clone())];
    if args.with_attendees {
        for email in attendee_emails(&documents) {
            if email == args.email {
                continue;
            }
            let attendee = store.add_user(email.as_str(), email.as_str(), None);
            let attendee_calendar = store.add_calendar(email.as_str(), attendee);
            calendars.push((attendee_calendar, attendee, email));
        }
    }

    let ctx = service.context(user);
    let mut tx = store.begin();
    for (file, body) in &documents {
        let existing = match first_uid(body) {
            Some(uid) => {
                service
                    .resolve_entry(&mut tx, &ctx, calendar, &format!("{uid}{TODO_ENTRY_SUFFIX}"))
                    .await?
            }
            None => None,
        };
        let id = service
            .put(&mut tx, &ctx, calendar, existing, body)
            .await
            .with_context(|| format!("failed to import {}", file.display()))?;
        tracing::info!(file = %file.display(), todo = %id, updated = existing.is_some(), "Imported");
    }

    for (calendar, owner, email) in &calendars {
        let ctx = service.context(*owner);
        for entry in service.list(&mut tx, &ctx, *calendar).await? {
            let Some(id) = service
                .resolve_entry(&mut tx, &ctx, *calendar, &entry)
                .await?
            else {
                continue;
            };
            println!("# {email}/{entry}");
            print!("{}", service.get(&mut tx, &ctx, id).await?);
        }
    }

    if args.dry_run {
        tx.rollback();
        tracing::info!("Dry run, import rolled back");
    } else {
        tx.commit();
        tracing::info!(todos = store.todo_count(), "Import committed");
    }
    Ok(())
}

/// `UID` of the first `VTODO`, when the body parses.
fn first_uid(body: &str) -> Option<String> {
    let ical = parse(body).ok()?;
    ical.todos()
        .first()
        .and_then(|todo| todo.uid())
        .map(str::to_string)
}

/// Attendee emails across all documents, in order of appearance.
fn attendee_emails(documents: &[(PathBuf, String)]) -> Vec<String> {
    let mut emails: Vec<String> = Vec::new();
    for (file, body) in documents {
        let ical = match parse(body) {
            Ok(ical) => ical,
            Err(e) => {
                tracing::warn!(file = %file.display(), error = %e, "Skipping attendees of unparsable file");
                continue;
            }
        };
        for todo in ical.todos() {
            for prop in todo.get_properties(names::ATTENDEE) {
                let email = strip_mailto(prop.as_text().trim()).to_string();
                if !email.is_empty() && !emails.contains(&email) {
                    emails.push(email);
                }
            }
        }
    }
    emails
}
