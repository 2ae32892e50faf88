//! # kite-sim: simulated trading backend
//!
//! ```text
//!  ┌─────────────┐  GET  /api/instruments, /api/positions, ...  ┌──────────────────────┐
//!  │  Dashboard  │ ───────────────────────────────────────────▶ │ Market               │
//!  │             │  POST /api/orders, DELETE /api/orders/:id    │ ├─ instruments  ◀─ tick (1 s)
//!  │             │ ───────────────────────────────────────────▶ │ ├─ positions/holdings│
//!  │             │  ws://host/ws/stream?channels=...            │ ├─ orders ◀─ fill delay (2 s)
//!  │             │ ◀─────────────────────────────────────────── │ └─ event bus         │
//!  └─────────────┘                                              └──────────────────────┘
//! ```
//!
//! ## Environment Variables
//!
//! | Variable    | Default              | Description                          |
//! |-------------|----------------------|--------------------------------------|
//! | `BIND_ADDR` | `0.0.0.0:3000`       | Address Axum listens on              |
//! | `RUST_LOG`  | `kite_sim=debug`     | Tracing filter                       |
//! | `SIM_*`     | see `config`         | Simulator tunables                   |

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kite_sim::{routes, state::build_state, Market, MarketConfig, TokioScheduler};

// Timer callbacks and request handlers share one thread, so no two of them
// ever mutate the session at the same time.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // ── 1. Load .env ──────────────────────────────────────────────────────────
    dotenvy::dotenv().ok();

    // ── 2. Structured logging ─────────────────────────────────────────────────
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive("kite_sim=debug".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    info!(r#"

  ╔═══════════════════════════════════════════════╗
  ║          KITE-SIM  Simulated Trading          ║
  ║   Ticks · Orders · Margin · Live Stream       ║
  ╚═══════════════════════════════════════════════╝"#);

    // ── 3. Market session ─────────────────────────────────────────────────────
    let config = MarketConfig::from_env();
    info!(?config, "simulator configuration loaded");

    let scheduler = Arc::new(TokioScheduler::current());
    let market = Market::with_default_book(config, scheduler);
    let ticker = market.start();

    // ── 4. Router ─────────────────────────────────────────────────────────────
    let app = routes::router(build_state(market));

    // ── 5. Bind & Serve ───────────────────────────────────────────────────────
    let addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()
        .context("BIND_ADDR must be a socket address")?;

    info!(?addr, "🚀 kite-sim server starting");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    ticker.cancel();
    info!("kite-sim stopped");
    Ok(())
}
