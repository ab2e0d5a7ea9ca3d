use anyhow::{bail, Result};
use sheetfeed::client::{tabs, RemoteTableClient};
use std::env;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sheetfeed=info"));
    fmt::Subscriber::builder().with_env_filter(env_filter).init();
    info!("startup");

    // ─── 2) required endpoint configuration ──────────────────────────
    let base = match env::var("SHEETFEED_API_URL") {
        Ok(raw) => Url::parse(&raw)?,
        Err(_) => bail!("SHEETFEED_API_URL is not set; refusing to start"),
    };
    info!(endpoint = %base, "configured");

    let client = RemoteTableClient::new(base);

    // ─── 3) reachability probe ───────────────────────────────────────
    if !client.check_connection().await {
        warn!("endpoint unreachable; screens will run on cached/empty data");
    }

    // ─── 4) warm the tables every screen needs ───────────────────────
    for tab in [
        tabs::CONFIG_MAESTRA,
        tabs::LIBRO_ACCIONISTAS,
        tabs::RENTABILIDAD_HISTORICA,
        tabs::NOTICIAS,
    ] {
        let rows = client.fetch_table(tab, false).await;
        info!(tab, rows = rows.len(), "warmed");
    }

    info!("ready");
    Ok(())
}
