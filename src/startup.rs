use actix_web::{dev::Server, web, web::Data, App, HttpServer};
use std::{net::TcpListener, sync::Arc};
use tracing::info;
use tracing_actix_web::TracingLogger;

use crate::{
    configuration::Settings,
    ports::{embeddings_service::EmbeddingsService, vector_index_repository::VectorIndexRepository},
    repositories::{
        openai_embeddings_service::OpenAIEmbeddingsService,
        vector_index_pinecone_repository::VectorIndexPineconeRepository,
    },
    routes::{
        health_check, insert_vector, json_config,
        pages::{add_content, add_content_page, home_page, search_page, search_results},
        query_vector,
    },
    use_cases::{insert_content::InsertContentUseCase, query_content::QueryContentUseCase},
};

/// Holds the newly built server, and some useful properties
pub struct Application {
    server: Server,
    port: u16,
}

#[derive(thiserror::Error, Debug)]
pub enum ApplicationBuildError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error("Failed to build an HTTP client: {0}")]
    HttpClientError(#[from] reqwest::Error),
}

impl Application {
    /// Binds the listener and wires the external service clients.
    ///
    /// # Parameters
    /// - nb_workers: number of actix-web workers
    ///   if `None`, the number of available physical CPUs is used as the worker count.
    #[tracing::instrument(name = "Building application", skip(settings))]
    pub async fn build(
        settings: Settings,
        nb_workers: Option<usize>,
    ) -> Result<Self, ApplicationBuildError> {
        let address = format!(
            "{}:{}",
            settings.application.host, settings.application.port
        );
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();

        let embeddings_service = OpenAIEmbeddingsService::try_new(&settings.openai)?;
        let vector_index_repository = VectorIndexPineconeRepository::try_new(&settings.pinecone)?;
        info!(
            index = vector_index_repository.index_name(),
            model = %settings.openai.model,
            "External services configured"
        );

        let server = run(
            listener,
            settings,
            nb_workers,
            Arc::new(embeddings_service),
            Arc::new(vector_index_repository),
        )?;

        Ok(Self { server, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// This function only returns when the application is stopped
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        info!("Running server ...");
        self.server.await
    }
}

/// listener: the consumer binds their own port
///
/// TracingLogger middleware: helps collecting telemetry data.
/// It generates a unique identifier for each incoming request: `request_id`.
///
/// The service clients are injected, so any implementation of the ports can back the routes.
pub fn run(
    listener: TcpListener,
    settings: Settings,
    nb_workers: Option<usize>,
    embeddings_service: Arc<dyn EmbeddingsService>,
    vector_index_repository: Arc<dyn VectorIndexRepository>,
) -> Result<Server, std::io::Error> {
    // Shared among all workers
    let insert_content = Data::new(InsertContentUseCase::new(
        embeddings_service.clone(),
        vector_index_repository.clone(),
    ));
    let query_content = Data::new(QueryContentUseCase::new(
        embeddings_service,
        vector_index_repository,
    ));
    let search_ui_settings = Data::new(settings.search_ui);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(json_config())
            .route("/health_check", web::get().to(health_check))
            .route("/api/pinecone/insert_vector", web::post().to(insert_vector))
            .route("/api/pinecone/query_vector", web::post().to(query_vector))
            .route("/", web::get().to(home_page))
            .route("/add", web::get().to(add_content_page))
            .route("/add", web::post().to(add_content))
            .route("/search", web::get().to(search_page))
            .route("/search/results", web::get().to(search_results))
            .app_data(insert_content.clone())
            .app_data(query_content.clone())
            .app_data(search_ui_settings.clone())
    })
    .listen(listener)?;

    // If no workers were set, use the actix-web settings (number of workers = number of physical CPUs)
    if let Some(nb_workers) = nb_workers {
        return Ok(server.workers(nb_workers).run());
    }

    Ok(server.run())
}
