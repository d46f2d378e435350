use serde::{Deserialize, Serialize};

/// The tunable constants the source hard-codes, made an explicit,
/// overridable surface per §9's design notes. This is the only
/// "configuration" the core exposes; `dillorc` parsing proper belongs
/// to the UI layer.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Width, in layout units, of the hyphen glyph drawn at a soft
    /// line break. Stands in for the per-font metric the source queries
    /// from its platform.
    pub hyphen_width_px: i32,
    /// How far the hyphenation trie builder searches for a vacant
    /// packing offset before giving up and appending past the array's
    /// end. Larger values build a smaller trie more slowly.
    pub hyphenation_pack_factor: usize,
    /// Width/height ceiling (in pixels) beyond which the image pipeline
    /// aborts decoding rather than allocate an unbounded row store.
    pub image_size_limit: u32,
}

impl Default for CoreConfig {
    fn default() -> CoreConfig {
        CoreConfig {
            hyphen_width_px: 6,
            hyphenation_pack_factor: 8,
            image_size_limit: dillo_image::MAX_IMAGE_DIMENSION,
        }
    }
}

impl CoreConfig {
    /// Parses a config from TOML text, falling back to each field's
    /// default for anything left unset.
    pub fn from_toml(text: &str) -> Result<CoreConfig, crate::error::CoreError> {
        toml::from_str(text).map_err(crate::error::CoreError::from)
    }

    pub fn to_toml(&self) -> Result<String, crate::error::CoreError> {
        toml::to_string(self).map_err(crate::error::CoreError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_documented_constants() {
        let config = CoreConfig::default();
        assert_eq!(config.hyphen_width_px, 6);
        assert_eq!(config.image_size_limit, 6000);
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let config = CoreConfig::from_toml("image_size_limit = 4000\n").unwrap();
        assert_eq!(config.image_size_limit, 4000);
        assert_eq!(config.hyphen_width_px, 6);
    }

    #[test]
    fn round_trips_through_toml() {
        let config = CoreConfig { hyphen_width_px: 9, hyphenation_pack_factor: 16, image_size_limit: 3000 };
        let text = config.to_toml().unwrap();
        let parsed = CoreConfig::from_toml(&text).unwrap();
        assert_eq!(parsed.hyphen_width_px, 9);
        assert_eq!(parsed.hyphenation_pack_factor, 16);
        assert_eq!(parsed.image_size_limit, 3000);
    }
}
