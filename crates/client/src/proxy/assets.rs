//! Asset classification for opportunistic caching.

/// Decides which request URLs are worth keeping after a network miss.
///
/// A URL qualifies when it contains any marker as a plain substring. This is
/// not extension parsing: `/tiles/3/4/5.pbf`, `/glyphs/Noto.ttf?v=2` and
/// `/sprite.png/meta` all match `.pbf`, `.ttf` and `.png` respectively.
#[derive(Debug, Clone, Default)]
pub struct AssetMatcher {
    markers: Vec<String>,
}

impl AssetMatcher {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { markers: markers.into_iter().map(Into::into).filter(|m: &String| !m.is_empty()).collect() }
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    /// The first marker found in `url`, if any.
    pub fn matching_marker(&self, url: &str) -> Option<&str> {
        self.markers
            .iter()
            .find(|marker| url.contains(marker.as_str()))
            .map(String::as_str)
    }

    pub fn matches(&self, url: &str) -> bool {
        self.matching_marker(url).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aramaps_core::config::DEFAULT_ASSET_MARKERS;

    fn default_matcher() -> AssetMatcher {
        AssetMatcher::new(DEFAULT_ASSET_MARKERS.iter().copied())
    }

    #[test]
    fn test_matches_tile_font_image() {
        let matcher = default_matcher();
        assert!(matcher.matches("https://tiles.example.com/v3/12/2048/1361.pbf"));
        assert!(matcher.matches("https://fonts.example.com/Noto%20Sans%20Regular/0-255.ttf"));
        assert!(matcher.matches("http://localhost:8000/icons/marker.png"));
    }

    #[test]
    fn test_no_match_for_documents() {
        let matcher = default_matcher();
        assert!(!matcher.matches("http://localhost:8000/"));
        assert!(!matcher.matches("http://localhost:8000/api/overlays"));
        assert!(!matcher.matches("http://localhost:8000/overlays/site.geojson"));
        assert!(!matcher.matches("https://tiles.example.com/style.json"));
    }

    #[test]
    fn test_substring_semantics_preserved() {
        let matcher = default_matcher();
        assert!(matcher.matches("https://example.com/render?format=.png"));
        assert!(matcher.matches("https://example.com/a.pbf/metadata"));
        assert!(matcher.matches("https://example.com/a.pngx"));
    }

    #[test]
    fn test_matching_marker_reports_first_hit() {
        let matcher = default_matcher();
        assert_eq!(matcher.matching_marker("https://example.com/0/0/0.pbf"), Some(".pbf"));
        assert_eq!(matcher.matching_marker("https://example.com/"), None);
    }

    #[test]
    fn test_empty_markers_never_match() {
        let matcher = AssetMatcher::new(["", ""]);
        assert!(matcher.markers().is_empty());
        assert!(!matcher.matches("https://example.com/a.png"));
    }
}
