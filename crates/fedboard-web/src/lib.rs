use actix_web::{middleware::Logger, web, App, HttpServer};
use fedboard_data::Dashboard;
use tera::Tera;
use tracing::info;

pub mod api;
pub mod view;

/// Shared by every worker.
pub struct AppState {
    pub dashboard: Dashboard,
    pub templates: Tera,
}

impl AppState {
    pub fn new(dashboard: Dashboard) -> anyhow::Result<Self> {
        Ok(AppState {
            dashboard,
            templates: view::templates()?,
        })
    }
}

/// Register every route; shared by [`serve`] and the tests.
pub fn routes(cfg: &mut web::ServiceConfig) {
    use api::*;

    cfg
        // dashboard page
        .service(page::dashboard)
        // diagnostics
        .service(diagnostics::clear_cache)
        .service(diagnostics::fred)
        // json endpoints
        .service(data::cards)
        .service(data::series)
        .service(data::calendar);
}

pub async fn serve(dashboard: Dashboard, bind: &str) -> anyhow::Result<()> {
    let state = web::Data::new(AppState::new(dashboard)?);

    info!("serving dashboard on http://{bind}");
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(routes)
    })
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}
