use crate::configuration::Settings;
use crate::connectors;
use crate::db::ReadingStore;
use crate::middleware;
use crate::routes;
use crate::services::{Palmist, WorkflowRegistry};
use actix_cors::Cors;
use actix_web::{dev::Server, error, http, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;
use tracing_actix_web::TracingLogger;

/// Room for the upload limit plus request overhead; oversized photos still
/// reach the validation step and get a proper message.
const UPLOAD_PAYLOAD_FACTOR: usize = 4;
const JSON_LIMIT: usize = 10 * 1024 * 1024;

pub async fn run(
    listener: TcpListener,
    store: Arc<dyn ReadingStore>,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let payload_limit = settings.upload.max_file_bytes * UPLOAD_PAYLOAD_FACTOR;
    let tick = Duration::from_millis(settings.progress.tick_ms);
    let idle_timeout = Duration::from_secs(settings.workflow.idle_timeout_secs);
    let auth_cache_ttl = Duration::from_secs(settings.workflow.auth_cache_ttl_secs);
    let settings = web::Data::new(settings);

    let store: web::Data<Arc<dyn ReadingStore>> = web::Data::new(store);
    let workflows = web::Data::new(WorkflowRegistry::new(tick, idle_timeout));

    let oauth_http_client = reqwest::Client::builder()
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;
    let oauth_http_client = web::Data::new(oauth_http_client);

    let oauth_cache = web::Data::new(middleware::authentication::OAuthCache::new(auth_cache_ttl));

    // In-process palmist answers the functions routes and stands in for
    // disabled remote connectors
    let inference = connectors::init_openai(&settings.connectors);
    let palmist = Arc::new(Palmist::new(inference, &settings.connectors.openai));
    let analysis_connector =
        connectors::init_analysis_service(&settings.connectors, palmist.clone());
    let chat_connector = connectors::init_chat_service(&settings.connectors, palmist.clone());
    let storage_connector = connectors::init_storage_service(&settings.connectors);
    let palmist = web::Data::new(palmist);

    let json_config = web::JsonConfig::default()
        .limit(JSON_LIMIT)
        .error_handler(|err, _req| {
            let msg: String = match err {
                error::JsonPayloadError::Deserialize(err) => format!(
                    "{{\"kind\":\"deserialize\",\"line\":{}, \"column\":{}, \"msg\":\"{}\"}}",
                    err.line(),
                    err.column(),
                    err
                ),
                _ => format!("{{\"kind\":\"other\",\"msg\":\"{}\"}}", err),
            };
            error::InternalError::new(msg, http::StatusCode::BAD_REQUEST).into()
        });
    let payload_config = web::PayloadConfig::new(payload_limit);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(Cors::permissive())
            .app_data(json_config.clone())
            .app_data(payload_config.clone())
            .app_data(settings.clone())
            .app_data(store.clone())
            .app_data(workflows.clone())
            .app_data(oauth_http_client.clone())
            .app_data(oauth_cache.clone())
            .app_data(analysis_connector.clone())
            .app_data(chat_connector.clone())
            .app_data(storage_connector.clone())
            .app_data(palmist.clone())
            .service(web::scope("/health_check").service(routes::health_check))
            .service(
                web::scope("/functions/v1")
                    .service(routes::functions::generate_palm_reading)
                    .service(routes::functions::chat_with_ai),
            )
            .service(
                web::scope("")
                    .wrap(middleware::authentication::Manager::new())
                    .service(
                        web::scope("/workflow")
                            .service(routes::workflow::get::item)
                            .service(routes::workflow::delete::item),
                    )
                    .service(
                        web::scope("/upload")
                            .service(routes::upload::add)
                            .service(routes::upload::delete::item),
                    )
                    .service(
                        web::scope("/reading")
                            .service(routes::reading::add)
                            .service(routes::reading::latest)
                            .service(routes::reading::report_page),
                    )
                    .service(
                        web::scope("/chat")
                            .service(routes::chat::start)
                            .service(routes::chat::send)
                            .service(routes::chat::history),
                    ),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
