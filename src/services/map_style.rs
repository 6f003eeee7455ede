// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Base map style selection and terrain source.

use crate::models::{MapStyle, SourceDescriptor, SourceKind, TerrainConfig};

/// Id under which the terrain source is registered on the map.
pub const TERRAIN_SOURCE_ID: &str = "terrain";

const TERRAIN_EXAGGERATION: f64 = 1.5;
const TERRAIN_TILE_SIZE: u32 = 256;

/// Tracks the selected base style.
#[derive(Debug, Clone)]
pub struct MapStyleSelector {
    styles: Vec<MapStyle>,
    current_url: String,
    api_key: String,
}

impl MapStyleSelector {
    /// Start on the first style.
    pub fn new(styles: Vec<MapStyle>, api_key: &str) -> Self {
        let current_url = styles.first().map(|s| s.url.clone()).unwrap_or_default();
        Self {
            styles,
            current_url,
            api_key: api_key.to_string(),
        }
    }

    pub fn styles(&self) -> &[MapStyle] {
        &self.styles
    }

    pub fn current_style_url(&self) -> &str {
        &self.current_url
    }

    /// Switch to `style_url`. Unknown URLs are kept as-is, so custom style
    /// documents can be loaded.
    pub fn change_style(&mut self, style_url: &str) {
        tracing::debug!(style_url, "Map style changed");
        self.current_url = style_url.to_string();
    }

    /// The selected style, or the first one if the URL matches none.
    pub fn current_style(&self) -> Option<&MapStyle> {
        self.styles
            .iter()
            .find(|s| s.url == self.current_url)
            .or_else(|| self.styles.first())
    }

    /// MapTiler terrain-RGB elevation source.
    pub fn terrain_source(&self) -> SourceDescriptor {
        SourceDescriptor {
            kind: SourceKind::RasterDem,
            url: format!(
                "https://api.maptiler.com/tiles/terrain-rgb-v2/tiles.json?key={}",
                self.api_key
            ),
            tile_size: Some(TERRAIN_TILE_SIZE),
        }
    }

    pub fn terrain_config(&self) -> TerrainConfig {
        TerrainConfig {
            source: TERRAIN_SOURCE_ID.to_string(),
            exaggeration: TERRAIN_EXAGGERATION,
        }
    }
}
