use crate::configuration::Settings;
use crate::connectors;
use crate::db::PgStore;
use crate::health::{HealthChecker, HealthMetrics};
use crate::helpers::JsonResponse;
use crate::middleware;
use crate::routes;
use crate::services::{ChatService, DocumentService};
use actix_cors::Cors;
use actix_web::{dev::Server, error, http, web, App, HttpServer};
use sqlx::{Pool, Postgres};
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

fn cors(frontend_url: &str) -> Cors {
    Cors::default()
        .allowed_origin(frontend_url)
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            http::header::AUTHORIZATION,
            http::header::CONTENT_TYPE,
            http::header::ACCEPT,
        ])
        .allowed_header("x-session-id")
        .supports_credentials()
        .max_age(3600)
}

pub async fn run(
    listener: TcpListener,
    pg_pool: Pool<Postgres>,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let pipeline = connectors::init_ai_pipeline(&settings.ai_pipeline)
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;

    let store = Arc::new(PgStore::new(pg_pool.clone()));
    let chat_service = web::Data::new(ChatService::new(
        store.clone(),
        store,
        pipeline.get_ref().clone(),
    ));
    let document_service = web::Data::new(DocumentService::new(
        pg_pool.clone(),
        pipeline.get_ref().clone(),
        settings.uploads.clone(),
    ));

    let health_checker = web::Data::new(Arc::new(HealthChecker::new(
        pg_pool.clone(),
        pipeline.get_ref().clone(),
        settings.ai_pipeline.mock,
        settings.uploads.dir.clone(),
    )));
    let health_metrics = web::Data::new(Arc::new(HealthMetrics::new(1000)));

    let frontend_url = settings.frontend_url.clone();
    let settings = web::Data::new(settings);
    let pg_pool = web::Data::new(pg_pool);

    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        let msg = match &err {
            error::JsonPayloadError::Deserialize(err) => format!("Invalid JSON payload: {}", err),
            err => format!("Invalid JSON payload: {}", err),
        };
        JsonResponse::bad_request(msg)
    });
    let path_config = web::PathConfig::default()
        .error_handler(|_err, _req| JsonResponse::bad_request("Invalid identifier"));
    let query_config = web::QueryConfig::default()
        .error_handler(|err, _req| JsonResponse::bad_request(err.to_string()));

    let server = HttpServer::new(move || {
        App::new()
            .wrap(middleware::AdminAuthentication)
            .wrap(cors(&frontend_url))
            .wrap(TracingLogger::default())
            .app_data(json_config.clone())
            .app_data(path_config.clone())
            .app_data(query_config.clone())
            .app_data(pg_pool.clone())
            .app_data(settings.clone())
            .app_data(pipeline.clone())
            .app_data(chat_service.clone())
            .app_data(document_service.clone())
            .app_data(health_checker.clone())
            .app_data(health_metrics.clone())
            .service(
                web::scope("/api")
                    .service(
                        web::scope("/health")
                            .service(routes::health_check)
                            .service(routes::components_handler)
                            .service(routes::metrics_handler),
                    )
                    .service(web::scope("/auth").service(routes::auth::login_handler))
                    .service(
                        web::scope("/chat")
                            .service(routes::chat::ask_handler)
                            .service(routes::chat::ask_document_handler)
                            .service(
                                web::scope("/conversations")
                                    .wrap(middleware::AdminOnly)
                                    .service(routes::chat::list_handler)
                                    .service(routes::chat::item_handler)
                                    .service(routes::chat::delete_handler)
                                    .service(routes::chat::deactivate_handler),
                            ),
                    )
                    .service(
                        web::scope("/documents")
                            .service(routes::document::announcements_handler)
                            .service(routes::document::webhook_handler)
                            .service(
                                web::scope("")
                                    .wrap(middleware::AdminOnly)
                                    .service(routes::document::upload_handler)
                                    .service(routes::document::cleanup_handler)
                                    .service(routes::document::view_handler)
                                    .service(routes::document::status_handler)
                                    .service(routes::document::delete_handler),
                            ),
                    )
                    .service(
                        web::scope("/telegram")
                            .service(routes::telegram::ask_handler)
                            .service(routes::telegram::ask_document_handler)
                            .service(routes::telegram::health_handler),
                    ),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
