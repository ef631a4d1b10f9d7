use clap::Parser;
use snippetbox::cli::{
    Args, build_config, init_logging, load_jwt_secret, open_database, validate_origin,
};
use snippetbox::{init_cleanup, run_server};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(&args.log_format);

    let jwt_secret = match load_jwt_secret(args.jwt_secret_file.as_deref()) {
        Ok(secret) => secret,
        Err(e) => {
            error!(error = %e, "Cannot load JWT secret");
            std::process::exit(1);
        }
    };

    let origin = match validate_origin(&args.origin) {
        Ok(origin) => origin,
        Err(e) => {
            error!(error = %e, "Invalid --origin");
            std::process::exit(1);
        }
    };

    let db = match open_database(&args.database).await {
        Ok(db) => db,
        Err(e) => {
            error!(path = %args.database, error = %e, "Failed to open database");
            std::process::exit(1);
        }
    };

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(address = %addr, error = %e, "Failed to bind");
            std::process::exit(1);
        }
    };

    match listener.local_addr() {
        Ok(local_addr) => info!(address = %local_addr, origin = %origin, "Listening"),
        Err(e) => error!(error = %e, "Failed to read local address"),
    }

    init_cleanup(&db).await;

    let config = build_config(db, &origin, jwt_secret);
    if let Err(e) = run_server(config, listener).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
