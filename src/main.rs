use std::error::Error;
use std::sync::Arc;

use ironlog::config::{get_variable, get_variable_or};
use ironlog::db::PgDb;
use ironlog::environment::{Config, Environment};
use ironlog::routes;
use ironlog::urls::Urls;
use log::{info, initialize_logger};
use warp::Filter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    let logger = initialize_logger();

    let main_port: u16 = get_variable("IRONLOG_PORT")
        .parse()
        .expect("parse IRONLOG_PORT as u16");
    let admin_port: u16 = get_variable("IRONLOG_ADMIN_PORT")
        .parse()
        .expect("parse IRONLOG_ADMIN_PORT as u16");

    info!(logger, "Starting..."; "main_port" => main_port, "admin_port" => admin_port);
    let logger = Arc::new(logger);

    info!(logger, "Creating database pool...");
    let connection_string = get_variable("IRONLOG_DB_CONNECTION_STRING");
    let pool = sqlx::Pool::connect(&connection_string)
        .await
        .expect("create database pool from IRONLOG_DB_CONNECTION_STRING");
    let db = Arc::new(PgDb::new(pool));

    let base_url = get_variable_or("IRONLOG_BASE_URL", format!("http://localhost:{}/", main_port));
    let api_prefix = get_variable_or("IRONLOG_API_PREFIX", "api".to_owned());
    let urls = Arc::new(Urls::new(&base_url, &api_prefix).expect("build URLs from IRONLOG_BASE_URL"));

    let config = Config::from_env();
    info!(logger, "Configured";
        "api_prefix" => urls.api_path(),
        "volume_window_days" => config.volume_window_days,
        "pr_display_limit" => config.pr_display_limit);

    let environment = Environment::new(logger.clone(), db, urls, config);

    let (terminate, should_terminate) = routes::admin::shutdown_channel(logger.clone());

    let (_, main_server) = warp::serve(routes::make_api(environment.clone()))
        .bind_with_graceful_shutdown(([0, 0, 0, 0], main_port), should_terminate.clone());

    let admin_routes = routes::admin::make_healthz_route(environment.clone())
        .or(routes::admin::make_termination_route(environment, terminate));
    let (_, admin_server) = warp::serve(admin_routes)
        .bind_with_graceful_shutdown(([0, 0, 0, 0], admin_port), should_terminate);

    tokio::join!(main_server, admin_server);

    info!(logger, "Exiting gracefully...");

    Ok(())
}
