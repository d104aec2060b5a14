//! HTTP routes.

mod domains;
mod health;

use actix_web::web;

pub use domains::{AddDomainRequest, DeleteDomainResponse};

/// Register every route on an app or scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health)
        .service(domains::list_domains)
        .service(domains::add_domain)
        .service(domains::delete_all_domains)
        .service(domains::delete_domain)
        .service(domains::check_dns)
        .service(domains::add_alias)
        .service(domains::delete_alias);
}
