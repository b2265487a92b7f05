use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rango", version, about = "Rango content directory server", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Override the config file path globally
    #[arg(short, long, global = true, default_value = "config.yaml")]
    pub config: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve,

    /// Seed the database with sample categories and pages
    Populate,

    /// Manage categories
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },

    /// Manage pages
    Page {
        #[command(subcommand)]
        action: PageAction,
    },
}

#[derive(Subcommand)]
pub enum CategoryAction {
    /// Create a new category
    Add {
        #[arg(short, long)]
        name: String,
    },

    /// List all categories
    List,
}

#[derive(Subcommand)]
pub enum PageAction {
    /// Add a page to a category
    Add {
        /// Slug of the category the page belongs to
        #[arg(long)]
        category: String,
        #[arg(short, long)]
        title: String,
        #[arg(short, long)]
        url: String,
    },
}
