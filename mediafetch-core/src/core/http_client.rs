use std::time::Duration;

use crate::models::settings::{NetworkSettings, ProxySettings};

const DEFAULT_USER_AGENT: &str = concat!("mediafetch/", env!("CARGO_PKG_VERSION"));

pub fn build_client(network: &NetworkSettings) -> reqwest::Result<reqwest::Client> {
    let user_agent = network
        .user_agent
        .clone()
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

    let mut builder = reqwest::Client::builder().user_agent(user_agent);

    if let Some(secs) = network.request_timeout_secs {
        builder = builder
            .timeout(Duration::from_secs(secs))
            .connect_timeout(Duration::from_secs(secs));
    }

    apply_proxy(builder, &network.proxy).build()
}

pub fn apply_proxy(
    builder: reqwest::ClientBuilder,
    proxy: &ProxySettings,
) -> reqwest::ClientBuilder {
    let Some(proxy_url) = proxy.url() else {
        return builder;
    };
    match reqwest::Proxy::all(&proxy_url) {
        Ok(p) => builder.proxy(p),
        Err(e) => {
            tracing::warn!("Invalid proxy URL: {}", e);
            builder
        }
    }
}
