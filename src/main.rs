use actix_web::{web, App, HttpServer};
use chrono::Utc;
use clap::Parser;
use rango::api::middleware::LoginRequired;
use rango::cli::{commands::{Cli, Commands}, run_cli};
use rango::config::AppConfig;
use rango::db::{self, service::DbService};
use rango::error::RangoError;
use rango::search::SearchProviderFactory;
use tracing::{error, info, warn};

fn clear_expired_sessions(pool: &db::DbPool) -> Result<usize, RangoError> {
    let conn = db::lock(pool)?;
    Ok(DbService::delete_expired_sessions(&conn, Utc::now().timestamp())?)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if !matches!(cli.command, Commands::Serve) {
        if let Err(e) = run_cli(cli.command, cli.config) {
            error!("{}", e);
            std::process::exit(1);
        }
        return Ok(());
    }

    info!("Starting Rango server...");

    let config = match AppConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let db_pool = match db::get_connection(&config.database) {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    match clear_expired_sessions(&db_pool) {
        Ok(removed) => info!("Removed {} expired sessions", removed),
        Err(e) => warn!("Failed to clear expired sessions: {}", e),
    }

    let search_provider = match SearchProviderFactory::create_default(&config) {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to initialize search provider: {}", e);
            std::process::exit(1);
        }
    };

    let host = config.server.host.clone();
    let port = config.server.port;

    info!("Server listening on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(web::Data::new(search_provider.clone()))
            .wrap(LoginRequired)
            .configure(rango::api::routes::configure)
    })
    .bind((host, port))?
    .run()
    .await
}
