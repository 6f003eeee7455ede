// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ridelines map core: session, filter and popup logic for the activity map.
//!
//! This crate sits between the map front-end and the Ridelines API. It owns
//! the authentication cache that decides when the user's tile archive can be
//! loaded, compiles activity-type checkboxes into map filter expressions, and
//! formats activity popups.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod time_utils;

use config::Config;
use services::{ApiClient, FilterCompiler, MapStyleSelector, PopupFormatter, SessionCache};

/// Everything the map shell needs, wired from one `Config`.
pub struct MapContext {
    pub config: Config,
    pub session: SessionCache<ApiClient>,
    pub filter: FilterCompiler,
    pub styles: MapStyleSelector,
    pub popup: PopupFormatter,
}

impl MapContext {
    /// Build the map context around an API client.
    pub fn new(config: Config, api: ApiClient) -> Self {
        let session = SessionCache::new(api, &config.api_url).with_ttl(config.auth_ttl);
        let filter = FilterCompiler::new(config.activity_types.clone())
            .with_colors(config.activity_colors.clone(), &config.default_color);
        let styles = MapStyleSelector::new(config.map_styles.clone(), &config.maptiler_api_key);
        let popup = PopupFormatter::new(&config.activity_link_base)
            .with_link_label(&config.activity_link_label);

        Self {
            config,
            session,
            filter,
            styles,
            popup,
        }
    }
}
