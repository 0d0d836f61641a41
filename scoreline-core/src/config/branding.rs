/// Cosmetics stamped on every rendered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandingConfig {
    /// Embed colour as `0xRRGGBB`.
    pub color: u32,
    pub footer_text: String,
    pub footer_icon_url: Option<String>,
    /// Thumbnail used when a message has no league or team logo.
    pub thumbnail_url: Option<String>,
    /// Optional link field appended to every message, as
    /// `(field name, link label, link url)`.
    pub website: Option<(String, String, String)>,
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self {
            color: 0x57F287,
            footer_text: "Scoreline".to_string(),
            footer_icon_url: None,
            thumbnail_url: None,
            website: None,
        }
    }
}
