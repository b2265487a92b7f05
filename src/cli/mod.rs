pub mod commands;

use duckdb::{Connection, Result as DbResult};
use tracing::info;

use crate::cli::commands::{CategoryAction, Commands, PageAction};
use crate::config::AppConfig;
use crate::db::{get_connection, lock, service::DbService, Category, Page};
use crate::error::Result;
use crate::forms::{CategoryForm, FormErrors, PageForm};

struct SamplePage {
    title: &'static str,
    url: &'static str,
    views: i64,
}

struct SampleCategory {
    name: &'static str,
    views: i64,
    likes: i64,
    pages: &'static [SamplePage],
}

const SAMPLE_DATA: &[SampleCategory] = &[
    SampleCategory {
        name: "Python",
        views: 128,
        likes: 64,
        pages: &[
            SamplePage { title: "Official Python Tutorial", url: "http://docs.python.org/3/tutorial/", views: 42 },
            SamplePage { title: "How to Think like a Computer Scientist", url: "http://www.greenteapress.com/thinkpython/", views: 17 },
            SamplePage { title: "Learn Python in 10 Minutes", url: "http://www.korokithakis.net/tutorials/python/", views: 9 },
        ],
    },
    SampleCategory {
        name: "Django",
        views: 64,
        likes: 32,
        pages: &[
            SamplePage { title: "Official Django Tutorial", url: "https://docs.djangoproject.com/en/stable/intro/tutorial01/", views: 35 },
            SamplePage { title: "Django Rocks", url: "http://www.djangorocks.com/", views: 12 },
            SamplePage { title: "How to Tango with Django", url: "http://www.tangowithdjango.com/", views: 21 },
        ],
    },
    SampleCategory {
        name: "Other Frameworks",
        views: 32,
        likes: 16,
        pages: &[
            SamplePage { title: "Bottle", url: "http://bottlepy.org/docs/dev/", views: 6 },
            SamplePage { title: "Flask", url: "http://flask.pocoo.org", views: 11 },
        ],
    },
];

/// Seeds the sample categories and pages. Existing rows are left untouched,
/// so running it twice changes nothing.
pub fn populate(conn: &Connection) -> DbResult<Vec<(Category, Vec<Page>)>> {
    let mut seeded = Vec::new();

    for sample in SAMPLE_DATA {
        let (category, created) = DbService::get_or_create_category(conn, sample.name, sample.views, sample.likes)?;
        if created {
            info!("Created category {}", category.name);
        }

        let mut pages = Vec::new();
        for page in sample.pages {
            let (page, _) = DbService::get_or_create_page(conn, category.id, page.title, page.url, page.views)?;
            pages.push(page);
        }
        seeded.push((category, pages));
    }

    Ok(seeded)
}

fn print_errors(errors: &FormErrors) {
    for (field, messages) in errors {
        for message in messages {
            eprintln!("{}: {}", field, message);
        }
    }
}

pub fn run_cli(command: Commands, config_path: String) -> Result<()> {
    let config = AppConfig::load(&config_path)?;
    let pool = get_connection(&config.database)?;
    let conn = lock(&pool)?;

    match command {
        Commands::Serve => {
            unreachable!("Serve command should be intercepted by main.rs to boot actix-web");
        }
        Commands::Populate => {
            for (category, pages) in populate(&conn)? {
                println!("- {} ({} likes, {} views)", category.name, category.likes, category.views);
                for page in pages {
                    println!("    - {} ({} views)", page.title, page.views);
                }
            }
        }
        Commands::Category { action } => match action {
            CategoryAction::Add { name } => match (CategoryForm { name }).validate(&conn)? {
                Ok(valid) => {
                    let category = DbService::insert_category(&conn, &valid.name, 0, 0)?;
                    println!("Created Category: {} ({})", category.name, category.slug);
                }
                Err(errors) => print_errors(&errors),
            },
            CategoryAction::List => {
                let categories = DbService::list_categories(&conn)?;
                if categories.is_empty() {
                    println!("No categories found.");
                } else {
                    println!("{:<24} | {:>6} | {:>6} | {}", "Slug", "Likes", "Views", "Name");
                    println!("{:-<24}-+-{:->6}-+-{:->6}-+-{:-<20}", "", "", "", "");
                    for c in categories {
                        println!("{:<24} | {:>6} | {:>6} | {}", c.slug, c.likes, c.views, c.name);
                    }
                }
            }
        },
        Commands::Page { action } => match action {
            PageAction::Add { category, title, url } => {
                let Some(category) = DbService::get_category_by_slug(&conn, &category)? else {
                    eprintln!("Category {} not found.", category);
                    return Ok(());
                };

                match (PageForm { title, url }).validate() {
                    Ok(valid) => {
                        let page = DbService::insert_page(&conn, category.id, &valid.title, &valid.url, 0)?;
                        println!("Added Page: {} -> {} ({})", page.title, page.url, category.name);
                    }
                    Err(errors) => print_errors(&errors),
                }
            }
        },
    }

    Ok(())
}
