use anyhow::{bail, Context, Result};
use finpivot::{
    cache::FinancialCache,
    config::{Config, OutputFormat},
    render,
};
use std::env;
use tokio::time::Instant;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    info!("startup");

    // ─── 2) configuration ────────────────────────────────────────────
    let cfg = Config::load(env::args().skip(1)).context("loading configuration")?;
    let source = cfg.source()?;
    let opts = cfg.load_options()?;
    info!(
        stocks = cfg.stocks.len(),
        source = ?source,
        output = ?cfg.output,
        "configured"
    );

    // ─── 3) load all three reports per stock ─────────────────────────
    let start = Instant::now();
    let mut cache = FinancialCache::new();
    cache.preload(&source, &cfg.stocks, &opts).await;
    info!(elapsed = ?start.elapsed(), "reports loaded");

    // ─── 4) print in the order stocks were given ─────────────────────
    let mut loaded_any = false;
    let mut json_out = Vec::with_capacity(cfg.stocks.len());
    for stock in &cfg.stocks {
        let Some(reports) = cache.get(&stock.code) else {
            continue;
        };
        for (kind, result) in reports.iter() {
            match result {
                Ok(_) => loaded_any = true,
                Err(e) => error!(code = %stock.code, kind = kind.as_str(), "{}", e),
            }
        }
        match cfg.output {
            OutputFormat::Table => println!("{}", render::stock_to_text(reports)),
            OutputFormat::Json => json_out.push(render::stock_to_json(reports)),
        }
    }
    if cfg.output == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&json_out)?);
    }

    if !loaded_any {
        bail!("no report could be loaded for any stock");
    }
    Ok(())
}
