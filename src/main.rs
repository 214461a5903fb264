use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use portfolio_backend::create_pool;
use portfolio_backend::guards::{GuardConfig, GuardContext};
use portfolio_backend::handlers;
use portfolio_backend::service::PortfolioService;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let db = create_pool().await;
    let service = web::Data::new(PortfolioService::new(db));

    // Guard state is built once here and injected; the rate limiter's bucket
    // map is shared across all workers.
    let guard_ctx = web::Data::new(GuardContext::new(GuardConfig::from_env()));

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let bind_addr = format!("0.0.0.0:{port}");
    tracing::info!("Server running at http://{bind_addr}");

    HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .app_data(guard_ctx.clone())
            .service(web::scope("/api").configure(handlers::init_routes))
    })
    .bind(&bind_addr)?
    .run()
    .await
}
