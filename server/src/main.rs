use actix_cors::Cors;
use actix_web::{App, HttpServer};

use server::handlers::root;
use server::server::spawn_server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let srv_tx = spawn_server();

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let bind_addr = format!("0.0.0.0:{}", port);
    log::info!("Server running on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .data(srv_tx.clone())
            .wrap(Cors::permissive())
            .configure(root)
    })
    .bind(bind_addr)?
    .run()
    .await
}
