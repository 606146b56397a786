mod client;
mod form;
mod render;

use std::io::Write;

use clap::{Args, Parser, Subcommand};
use libris_db::{iso_date, RecordId};
use serde_json::json;
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

use client::ApiClient;

/// Admin console for the Libris catalog
#[derive(Parser, Debug)]
#[command(name = "libris-cli", version)]
struct Cli {
    /// Base URL of the Libris server
    #[arg(
        long,
        env = "LIBRIS_SERVER_URL",
        default_value = "http://127.0.0.1:8080",
        global = true
    )]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List books with their categories
    List,
    /// Print one book as raw JSON
    Show { id: RecordId },
    /// Delete a book
    Delete { id: RecordId },
    /// Create a book
    Create(CreateArgs),
    /// List categories
    Categories,
    /// Create a category
    AddCategory { name: String },
}

#[derive(Args, Debug)]
struct CreateArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    author: String,
    #[arg(long)]
    isbn: String,
    /// Publication date, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    date: Option<String>,
    /// Category id or name; repeat for several
    #[arg(long = "category")]
    categories: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .try_init()
        .ok();

    let cli = Cli::parse();
    let client = ApiClient::new(&cli.server)?;
    let mut stdout = std::io::stdout().lock();

    run(cli.command, &client, &mut stdout).await
}

/// Execute one command: one HTTP call per action, one status line per outcome.
async fn run(command: Command, client: &ApiClient, out: &mut impl Write) -> anyhow::Result<()> {
    match command {
        Command::List => {
            let categories = client.categories().await.unwrap_or_else(|err| {
                tracing::warn!(error = %err, "could not fetch categories");
                Vec::new()
            });
            match client.books().await {
                Ok(books) if !books.is_empty() => {
                    for book in &books {
                        writeln!(out, "{}", render::book_summary(book, &categories))?;
                    }
                }
                Ok(_) => writeln!(out, "No books found")?,
                Err(err) => {
                    tracing::warn!(error = %err, "could not fetch books");
                    writeln!(out, "No books found")?;
                }
            }
        }
        Command::Show { id } => match client.book(id).await {
            Ok(book) => writeln!(out, "{}", serde_json::to_string_pretty(&book)?)?,
            Err(_) => writeln!(out, "Could not load book {id}")?,
        },
        Command::Delete { id } => match client.delete_book(id).await {
            Ok(()) => writeln!(out, "Book {id} deleted")?,
            Err(_) => writeln!(out, "Could not delete book {id}")?,
        },
        Command::Create(args) => {
            let today = OffsetDateTime::now_utc().date();
            let date = form::publication_date(args.date.as_deref(), today)?;

            let ids = if args.categories.is_empty() {
                Vec::new()
            } else {
                let categories = match client.categories().await {
                    Ok(categories) => categories,
                    Err(err) => {
                        tracing::warn!(error = %err, "could not fetch categories to pick from");
                        writeln!(out, "Error creating book")?;
                        return Ok(());
                    }
                };
                args.categories
                    .iter()
                    .map(|choice| form::pick_category(choice, &categories))
                    .collect::<anyhow::Result<Vec<_>>>()?
            };

            let body = json!({
                "title": args.title,
                "author": args.author,
                "isbn": args.isbn,
                "date_published": iso_date::format(&date)?,
                "categories": ids
            });

            match client.create_book(&body).await {
                Ok(book) => {
                    tracing::debug!(id = book.id, "book created");
                    writeln!(out, "Book created")?;
                }
                Err(err) => {
                    tracing::debug!(error = %err, "create rejected");
                    writeln!(out, "Error creating book")?;
                }
            }
        }
        Command::Categories => match client.categories().await {
            Ok(categories) if !categories.is_empty() => {
                for category in &categories {
                    writeln!(out, "{}", render::category_line(category))?;
                }
            }
            Ok(_) => writeln!(out, "No categories found")?,
            Err(_) => writeln!(out, "No categories found")?,
        },
        Command::AddCategory { name } => match client.create_category(&name).await {
            Ok(category) => {
                tracing::debug!(id = category.id, "category created");
                writeln!(out, "Category created")?;
            }
            Err(_) => writeln!(out, "Error creating category")?,
        },
    }

    Ok(())
}
