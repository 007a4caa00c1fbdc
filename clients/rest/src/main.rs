use actix_cors::Cors;
use actix_web::{
    middleware::{self, Condition},
    web::Data,
    App, HttpServer,
};
use clap::Parser;
use std::io;
use store::{
    persistence::storage::StorageEngine,
    store::{options::StoreOptions, store::Store},
};

mod routes;

/// 📀 ContactDB REST Server, provides a simple JSON interface for managing contacts
#[derive(Parser, Debug)]
struct Cli {
    /// Location of the store. Reads / writes to this directory. Note: Does not support shell paths, e.g. ~
    #[clap(short, long, default_value = "data")]
    data: std::path::PathBuf,

    /// Port the REST server will run on
    #[clap(short, long, default_value = "9000")]
    port: u16,

    /// Address the REST server will run on
    #[clap(short, long, default_value = "0.0.0.0")]
    address: String,

    /// Log every HTTP request
    #[clap(long)]
    log_http: bool,

    #[clap(long, default_value_t = 2)]
    http_workers: usize,
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args = Cli::parse();

    let store_options = StoreOptions::default().set_storage_engine(StorageEngine::File(args.data));

    let store_handle = Store::spawn(store_options);

    // Set up Ctrl-C handler
    let set_handler_store_handle_clone = store_handle.clone();

    ctrlc::set_handler(move || {
        let shutdown_response = set_handler_store_handle_clone
            .send_shutdown_request()
            .expect("Should not timeout");

        log::info!("Shutting down server: {}", shutdown_response);
    })
    .expect("Error setting Ctrl-C handler");

    log::info!("starting HTTP server on port {}.", args.port);

    log::info!(
        "Contacts API: http://{}:{}/api/contacts",
        args.address,
        args.port
    );

    // Start HTTP server
    HttpServer::new(move || {
        let app = App::new()
            .app_data(Data::new(store_handle.clone()))
            .configure(routes::configure)
            .wrap(Cors::permissive())
            .wrap(Condition::new(args.log_http, middleware::Logger::default()));

        app
    })
    .workers(args.http_workers)
    .bind((args.address, args.port))?
    .run()
    .await
}
