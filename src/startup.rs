use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

use crate::campaign_monitor::CampaignMonitorClient;
use crate::config::{DatabaseSettings, Settings};
use crate::domain::SubscriberState;
use crate::routes::{
    delete_client, delete_list, delete_subscriber, get_client, health_check, purge_list,
    replace_list_subscribers, replace_subscriber_lists, subscribe_to_lists,
    unsubscribe_from_list,
};
use crate::store::{CampaignStore, PgCampaignStore};

pub struct Application {
    pub port: u16,
    pub server: Server,
}

/// Subscriber states pulled from Campaign Monitor when a client is synced.
pub struct SyncStatuses(pub Vec<SubscriberState>);

impl Application {
    pub async fn build(config: Settings) -> Result<Self, std::io::Error> {
        let db_pool = get_connection_db_pool(&config.database);

        Self::build_with_store(config, Arc::new(PgCampaignStore::new(db_pool))).await
    }

    pub async fn build_with_store(
        config: Settings,
        store: Arc<dyn CampaignStore>,
    ) -> Result<Self, std::io::Error> {
        let gateway = CampaignMonitorClient::new(
            config.get_campaign_monitor_base_url(),
            config.get_campaign_monitor_api_key(),
            config.get_campaign_monitor_timeout(),
        )
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;

        let listener = TcpListener::bind(config.get_address())?;
        let port = listener.local_addr()?.port();
        let server = run(
            listener,
            store,
            gateway,
            SyncStatuses(config.get_sync_statuses()),
        )?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stop(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run(
    listener: TcpListener,
    store: Arc<dyn CampaignStore>,
    gateway: CampaignMonitorClient,
    sync_statuses: SyncStatuses,
) -> Result<Server, std::io::Error> {
    let store: web::Data<dyn CampaignStore> = web::Data::from(store);
    let gateway = web::Data::new(gateway);
    let sync_statuses = web::Data::new(sync_statuses);

    let server = HttpServer::new(move || {
        // App is where your application logic lives: routing, middlewares, request handler, etc
        App::new()
            // 'wrap' method adds a middleware to the App. This specific middleware provide incoming
            // request logger
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/admin")
                    .route("/clients/{client_id}", web::delete().to(delete_client))
                    .route("/lists/{list_id}", web::delete().to(delete_list))
                    .route("/lists/{list_id}/purge", web::post().to(purge_list))
                    .route(
                        "/lists/{list_id}/subscribers",
                        web::put().to(replace_list_subscribers),
                    )
                    .route(
                        "/subscribers/{subscriber_id}",
                        web::delete().to(delete_subscriber),
                    )
                    .route(
                        "/subscribers/{subscriber_id}/lists",
                        web::put().to(replace_subscriber_lists),
                    ),
            )
            .route("/{client_id}", web::get().to(get_client))
            .route(
                "/{client_id}/lists/subscribe",
                web::post().to(subscribe_to_lists),
            )
            .route(
                "/{client_id}/lists/{list_id}/subscribers/{subscriber_id}/unsubscribe",
                web::post().to(unsubscribe_from_list),
            )
            .app_data(store.clone())
            .app_data(gateway.clone())
            .app_data(sync_statuses.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}

pub fn get_connection_db_pool(config: &DatabaseSettings) -> Pool<Postgres> {
    PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(2))
        .connect_lazy_with(config.get_db_options())
}
