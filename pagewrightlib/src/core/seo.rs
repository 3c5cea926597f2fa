use serde::{Deserialize, Serialize};

/// Open Graph and Twitter card metadata for a single page.
///
/// When site-wide defaults are configured, `title` and `domain` are always
/// replaced during rendering. `image` and `description` are only filled in
/// when left empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeoData {
    pub title: String,
    pub url: String,
    pub image: String,
    pub description: String,
    pub domain: String,
}

impl SeoData {
    /// Applies site-wide defaults to this page's metadata.
    ///
    /// `title` must already be formatted.
    pub fn merge_defaults(&mut self, title: &str, defaults: &SeoData) {
        self.domain = defaults.domain.clone();
        self.title = title.to_owned();
        if self.image.is_empty() {
            self.image = defaults.image.clone();
        }
        if self.description.is_empty() {
            self.description = defaults.description.clone();
        }
    }
}

/// Everything a page template can see while rendering.
///
/// Templates access these as `title`, `seo.*` and `data.*`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TemplateData {
    pub title: String,
    pub seo: SeoData,
    pub data: serde_json::Value,
}

impl TemplateData {
    pub fn new<S: Into<String>>(title: S, seo: SeoData, data: serde_json::Value) -> Self {
        Self {
            title: title.into(),
            seo,
            data,
        }
    }

    pub fn to_context(&self) -> tera::Result<tera::Context> {
        tera::Context::from_serialize(self)
    }
}
