use crate::{
    core::{constants::OSM_TILE_URL, geo::TileCoord},
    MapError, Result,
};

/// Trait representing anything that can produce tile URLs for a given coordinate.
pub trait TileSource {
    /// Build a URL for the requested `coord`.
    fn url(&self, coord: TileCoord) -> String;
}

/// Tile URLs built from a template with `{z}`, `{x}` and `{y}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplateSource {
    template: String,
}

impl UrlTemplateSource {
    /// Rejects templates that lack any of the three placeholders.
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        for placeholder in ["{z}", "{x}", "{y}"] {
            if !template.contains(placeholder) {
                return Err(MapError::InvalidTemplate(format!(
                    "{template:?} is missing {placeholder}"
                )));
            }
        }
        Ok(Self { template })
    }

    pub fn template(&self) -> &str {
        &self.template
    }
}

impl TileSource for UrlTemplateSource {
    fn url(&self, coord: TileCoord) -> String {
        self.template
            .replace("{z}", &coord.z.to_string())
            .replace("{x}", &coord.x.to_string())
            .replace("{y}", &coord.y.to_string())
    }
}

/// The public OpenStreetMap tile server.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenStreetMapSource;

impl OpenStreetMapSource {
    pub fn new() -> Self {
        Self
    }
}

impl TileSource for OpenStreetMapSource {
    fn url(&self, coord: TileCoord) -> String {
        format!(
            "https://tile.openstreetmap.org/{}/{}/{}.png",
            coord.z, coord.x, coord.y
        )
    }
}

/// Picks the cheapest source for a template: the OSM default needs no substitution pass.
pub fn source_for_template(template: &str) -> Result<Box<dyn TileSource>> {
    if template == OSM_TILE_URL {
        Ok(Box::new(OpenStreetMapSource::new()))
    } else {
        Ok(Box::new(UrlTemplateSource::new(template)?))
    }
}
