// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ridelines map wiring check
//!
//! Runs the same startup the map page does: check the session against the
//! Ridelines API and, once the user's tile archive is known, print the
//! source, filter and style values the map would be given.

use anyhow::Context;
use ridelines_map::{config::Config, services::ApiClient, MapContext};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Structured JSON logging
    init_logging()?;

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(api_url = %config.api_url, "Starting Ridelines map check");

    let api = ApiClient::from_config(&config).context("Failed to build API client")?;
    let ctx = MapContext::new(config, api);

    let session = ctx.session.check_authentication().await;
    if !session.authenticated {
        tracing::warn!(error = ?session.error, "Not signed in");
        let report = json!({
            "authenticated": false,
            "error": session.error,
            "login_url": ctx.session.login_redirect_target("/"),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if !ctx.session.is_data_ready() {
        // Signed in but no archive yet; one background refresh before giving up
        ctx.session.refresh_user().await;
    }

    let report = json!({
        "authenticated": true,
        "data_ready": ctx.session.is_data_ready(),
        "user": session.profile,
        "source": ctx.session.vector_source(),
        "filter": ctx.filter.compile_filter(),
        "filterable_types": ctx.filter.list_filterable_types(),
        "line_color": ctx.filter.color_expression(),
        "style": ctx.styles.current_style(),
        "terrain_source": ctx.styles.terrain_source(),
        "terrain": ctx.styles.terrain_config(),
        "center": [ctx.config.default_center.0, ctx.config.default_center.1],
        "zoom": ctx.config.default_zoom,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> anyhow::Result<()> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ridelines_map=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
