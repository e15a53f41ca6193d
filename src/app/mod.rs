use std::{io, net::SocketAddr, sync::Arc};

use anyhow::{anyhow, Context};
use axum::{
    http::{Method, Request},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    config::{EmailClientSettings, Settings, StorageBackend, TransportKind},
    dispatch::Dispatcher,
    email::{ApiEmailClient, EmailTransport, SmtpEmailClient},
    store::{InMemoryStore, NewsletterStore, PostgresStore, SubscriberStore},
};

mod error;
mod health;
mod newsletter;
mod subscription;

/// Everything a handler may reach. Built once in [`App::build`] and cloned
/// into every request.
#[derive(Clone)]
pub struct AppState {
    pub newsletters: Arc<dyn NewsletterStore>,
    pub subscribers: Arc<dyn SubscriberStore>,
    pub dispatcher: Arc<Dispatcher>,
}

fn app_router() -> Router<AppState> {
    health::router().nest("/api/v1", newsletter::router().merge(subscription::router()))
}

pub struct App {
    listener: TcpListener,
    addr: SocketAddr,
    state: AppState,
}

impl App {
    /// Connects the configured backends and binds the listener. Nothing is
    /// served until [`App::serve`] is awaited.
    pub async fn build(config: &Settings) -> anyhow::Result<Self> {
        let (newsletters, subscribers) = build_stores(config).await?;
        let transport = build_transport(&config.email_client)?;
        let dispatcher = Dispatcher::new(
            newsletters.clone(),
            subscribers.clone(),
            transport,
            config.dispatch.unsubscribe_base_url.clone(),
        );

        let state = AppState {
            newsletters,
            subscribers,
            dispatcher: Arc::new(dispatcher),
        };

        Self::with_state(config, state).await
    }

    /// Binds the listener around an already assembled state.
    pub async fn with_state(config: &Settings, state: AppState) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(format!(
            "{}:{}",
            config.application.host, config.application.port
        ))
        .await
        .context("Could not bind the application address")?;
        let addr = listener.local_addr()?;

        Ok(Self {
            listener,
            addr,
            state,
        })
    }

    pub fn host(&self) -> std::net::IpAddr {
        self.addr.ip()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub async fn serve(self) -> Result<(), io::Error> {
        let app = app_router()
            .with_state(self.state)
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                    let id = uuid::Uuid::new_v4();
                    tracing::info_span!(
                        "request",
                        method = ?request.method(),
                        uri = ?request.uri(),
                        %id,
                    )
                }),
            )
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_headers(Any)
                    .allow_methods([
                        Method::GET,
                        Method::HEAD,
                        Method::POST,
                        Method::PUT,
                        Method::DELETE,
                        Method::OPTIONS,
                    ]),
            );

        axum::serve(self.listener, app.into_make_service()).await
    }
}

type Stores = (Arc<dyn NewsletterStore>, Arc<dyn SubscriberStore>);

async fn build_stores(config: &Settings) -> anyhow::Result<Stores> {
    match config.database.backend {
        StorageBackend::Memory => {
            tracing::info!("using the in-memory store");
            let store = Arc::new(InMemoryStore::new());
            let newsletters: Arc<dyn NewsletterStore> = store.clone();
            let subscribers: Arc<dyn SubscriberStore> = store;
            Ok((newsletters, subscribers))
        }
        StorageBackend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(50)
                .connect_with(config.database.with_db())
                .await
                .context("Could not connect to database")?;
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Could not run database migrations")?;

            let store = Arc::new(PostgresStore::new(pool));
            let newsletters: Arc<dyn NewsletterStore> = store.clone();
            let subscribers: Arc<dyn SubscriberStore> = store;
            Ok((newsletters, subscribers))
        }
    }
}

fn build_transport(config: &EmailClientSettings) -> anyhow::Result<Arc<dyn EmailTransport>> {
    let sender = config.sender().map_err(|e| anyhow!(e))?;

    let transport: Arc<dyn EmailTransport> = match config.transport {
        TransportKind::Api => Arc::new(ApiEmailClient::new(
            config.base_url.clone(),
            sender,
            config.authorization_token.clone(),
            config.timeout(),
        )?),
        TransportKind::Smtp => {
            let smtp = config
                .smtp
                .as_ref()
                .context("The smtp transport needs an `email_client.smtp` section")?;
            Arc::new(SmtpEmailClient::new(
                &smtp.host,
                smtp.port,
                smtp.credentials(),
                &sender,
                config.timeout(),
            )?)
        }
    };

    Ok(transport)
}
