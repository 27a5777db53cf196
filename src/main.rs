// src/main.rs
use actix_web::{App, HttpResponse, HttpServer, Responder, web};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use edu_checkout::config::Config;
use edu_checkout::{AppState, api, docs};

async fn index() -> impl Responder {
    HttpResponse::Ok().body("Checkout service ready!")
}

fn setup_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .compact()
        .init();
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    setup_tracing();

    let config = Config::from_env().expect("invalid configuration");
    let bind = (config.bind_addr.clone(), config.port);

    let state = web::Data::new(AppState::new(config).expect("failed to build backend client"));

    log::info!(
        "checkout service listening addr={}:{} backend={}",
        bind.0,
        bind.1,
        state.config.backend_base_url
    );

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .route("/", web::get().to(index))
            .service(
                SwaggerUi::new("/docs/{_:.*}")
                    .url("/api-docs/openapi.json", docs::ApiDoc::openapi()),
            )
            .configure(api::configure)
    })
    .bind(bind)?
    .run()
    .await
}
