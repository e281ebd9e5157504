use crate::config::HouraiConfig;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tracing::debug;
use twilight_gateway::{
    cluster::{Cluster, ClusterBuilder},
    Intents,
};

pub fn init(config: &HouraiConfig) {
    tracing_subscriber::fmt()
        .with_level(true)
        .with_thread_ids(true)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .init();

    debug!("Loaded command prefix: {:?}", config.command_prefix);
    debug!("Loaded cloner config: {:?}", config.cloner);

    if let Some(metrics_port) = config.metrics.port {
        let socket = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)), metrics_port);
        PrometheusBuilder::new()
            .with_http_listener(socket)
            .install()
            .expect("Failed to set up Prometheus metrics exporter");

        debug!(
            "Metrics endpoint listening on http://0.0.0.0:{}",
            metrics_port
        );
    }
}

pub fn http_client(config: &HouraiConfig) -> twilight_http::Client {
    debug!("Creating Discord HTTP client");
    // Use the twilight HTTP proxy when configured
    if let Some(proxy) = config.discord.proxy.as_ref() {
        twilight_http::Client::builder()
            .token(config.discord.bot_token.clone())
            .proxy(proxy.clone(), true)
            .ratelimiter(None)
            .build()
    } else {
        twilight_http::Client::new(config.discord.bot_token.clone())
    }
}

pub fn cluster(
    config: &HouraiConfig,
    intents: Intents,
    http: Arc<twilight_http::Client>,
) -> ClusterBuilder {
    debug!("Creating Discord gateway cluster");
    Cluster::builder(config.discord.bot_token.clone(), intents).http_client(http)
}
