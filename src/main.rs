use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod cli;
mod state;

use s3_explorer::config;
use s3_explorer::listing::CLI_SESSION_ID;
use s3_explorer::storage::{ClientOptions, S3StoreFactory, StoreCredentials, StoreFactory};
use s3_explorer::utils::lookup_profile_region;
use s3_explorer::ListingService;
use state::{AppState, RuntimeInfo};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "s3_explorer=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration / 加载配置
    let config_path = args.config.clone().unwrap_or_else(config::get_config_path);
    let mut app_config = config::load_config(&config_path).map_err(anyhow::Error::msg)?;
    if let Some(port) = args.port {
        app_config.server.port = port;
    }
    tracing::info!("Server will listen on {}:{}", app_config.server.host, app_config.server.port);

    let listing = Arc::new(ListingService::new(&app_config.listing));
    let store_factory: Arc<dyn StoreFactory> = Arc::new(S3StoreFactory);

    // CLI模式：启动时绑定一个固定会话
    let mut runtime = RuntimeInfo::default();
    let target = args
        .unattended_target(&app_config.s3.default_region, lookup_profile_region)
        .map_err(|e| anyhow::anyhow!("{}", e.message()))?;

    if let Some(target) = target {
        let options = ClientOptions {
            credentials: StoreCredentials::Profile(target.profile.clone()),
            region: target.region.clone(),
            endpoint: app_config.s3.endpoint.clone(),
            force_path_style: app_config.s3.force_path_style,
        };
        let client = store_factory.bind(&options)?;
        listing.sessions().register_with_id(CLI_SESSION_ID, client);

        tracing::info!(
            "CLI mode: profile={}, target={}, region={}",
            target.profile,
            target.location.to_uri(),
            target.region
        );

        runtime = RuntimeInfo {
            cli_mode: true,
            bucket: Some(target.location.bucket),
            root_prefix: target.location.prefix,
            region: Some(target.region),
            session_id: Some(CLI_SESSION_ID.to_string()),
        };
    } else if args.profile.is_some() {
        tracing::warn!("--profile given without --bucket or --s3-uri, starting in interactive mode");
    }

    // 定期清理过期缓存
    let sweep_secs = app_config.listing.sweep_interval_secs;
    if sweep_secs > 0 {
        let listing = listing.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(sweep_secs));
            loop {
                interval.tick().await;
                let purged = listing.cache().purge_expired();
                if purged > 0 {
                    tracing::debug!("Purged {} expired listings", purged);
                }
            }
        });
    }

    let state = Arc::new(AppState {
        listing,
        store_factory,
        s3: app_config.s3.clone(),
        runtime,
    });

    let app = api::router(state)
        .fallback_service(ServeDir::new(&app_config.server.static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let bind_addr = app_config.get_bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server running at http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
