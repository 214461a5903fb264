pub mod portfolio;

use actix_web::web;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // The guard pipeline owns method checking, so each resource funnels every
    // method into a single dispatcher. `/portfolios/stats` must be registered
    // before `/portfolios/{id}` so "stats" never parses as an id.
    cfg.service(web::resource("/portfolios").route(web::route().to(portfolio::collection)));
    cfg.service(web::resource("/portfolios/stats").route(web::route().to(portfolio::stats)));
    cfg.service(web::resource("/portfolios/{id}").route(web::route().to(portfolio::item)));
}
