//! Mail Orchestrator HTTP server.

use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use anyhow::Context;
use mail_orchestrator_web::config::Config;
use mail_orchestrator_web::{build_state, logging, routes};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    logging::init(&config.log)?;
    config.validate()?;

    let state = web::Data::new(build_state(&config).await?);
    state.run_startup().await.context("failed to start deletion queue")?;

    let bind = (config.server.host.clone(), config.server.port);
    tracing::info!(host = %bind.0, port = bind.1, "starting HTTP server");

    let server_state = state.clone();
    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(server_state.clone())
            .wrap(Logger::default())
            .configure(routes::configure)
    });
    if let Some(workers) = config.server.workers {
        server = server.workers(workers);
    }

    server
        .bind(bind)
        .context("failed to bind HTTP listener")?
        .run()
        .await?;

    state.shutdown().await;
    tracing::info!("server stopped");
    Ok(())
}
