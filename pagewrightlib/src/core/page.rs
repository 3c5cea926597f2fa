use eyre::WrapErr;
use serde::{Deserialize, Serialize};

use crate::core::seo::{SeoData, TemplateData};
use crate::render::template::static_path;
use crate::Result;

/// A named page bound to a route.
///
/// The page name selects the template under the page directory. Each
/// request to [`Page::url`] renders that template with a fresh
/// [`TemplateData`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Page {
    name: String,
    title: String,
    #[serde(default)]
    route: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    data: serde_json::Value,
}

impl Page {
    /// A page with only a name and a title.
    pub fn new<N: Into<String>, T: Into<String>>(name: N, title: T) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            route: None,
            image: None,
            description: None,
            data: serde_json::Value::Null,
        }
    }

    #[must_use]
    pub fn route<S: Into<String>>(self, route: S) -> Self {
        Self {
            route: Some(route.into()),
            ..self
        }
    }

    /// Preview image, relative to the static file prefix.
    #[must_use]
    pub fn image<S: Into<String>>(self, image: S) -> Self {
        Self {
            image: Some(image.into()),
            ..self
        }
    }

    #[must_use]
    pub fn description<S: Into<String>>(self, description: S) -> Self {
        Self {
            description: Some(description.into()),
            ..self
        }
    }

    #[must_use]
    pub fn with_data(self, data: serde_json::Value) -> Self {
        Self { data, ..self }
    }

    pub fn serialize_data<T: Serialize>(self, data: &T) -> Result<Self> {
        let data = serde_json::to_value(data)
            .wrap_err_with(|| format!("Failed to serialize data for page '{}'", self.name))?;
        Ok(self.with_data(data))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn data(&self) -> &serde_json::Value {
        &self.data
    }

    /// The route this page is served at. Defaults to `/<name>`.
    pub fn url(&self) -> String {
        match self.route.as_deref() {
            Some(route) if !route.is_empty() => route.to_owned(),
            _ => format!("/{}", self.name),
        }
    }

    pub fn seo_data(&self) -> SeoData {
        let mut seo = SeoData {
            url: self.url(),
            description: self.description.clone().unwrap_or_default(),
            ..Default::default()
        };
        if let Some(image) = self.image.as_deref().filter(|image| !image.is_empty()) {
            seo.image = static_path(image);
        }
        seo
    }

    /// Builds the per-request render payload. Site-wide defaults are not
    /// applied here.
    pub fn template_data(&self) -> TemplateData {
        TemplateData::new(self.title.clone(), self.seo_data(), self.data.clone())
    }
}

#[cfg(test)]
mod test {

    #![allow(warnings, unused)]
    use super::*;
    use serde_json::json;

    #[test]
    fn url_defaults_to_name() {
        let page = Page::new("about", "About");
        assert_eq!(page.url(), "/about");
    }

    #[test]
    fn empty_route_falls_back_to_name() {
        let page = Page::new("about", "About").route("");
        assert_eq!(page.url(), "/about");
    }

    #[test]
    fn explicit_route_is_used_verbatim() {
        let page = Page::new("about", "About").route("/contact-us");
        assert_eq!(page.url(), "/contact-us");
    }

    #[test]
    fn image_is_resolved_against_static_prefix() {
        let page = Page::new("home", "Home").image("logo.png");
        assert_eq!(page.seo_data().image, "/static/logo.png");
    }

    #[test]
    fn seo_data_without_image() {
        let page = Page::new("home", "Home").description("Welcome");
        let seo = page.seo_data();

        assert_eq!(
            seo,
            SeoData {
                url: "/home".into(),
                description: "Welcome".into(),
                ..Default::default()
            }
        );
    }

    #[test]
    fn template_data_carries_title_and_data() {
        let page = Page::new("home", "Home").with_data(json!({ "items": [1, 2] }));
        let data = page.template_data();

        assert_eq!(data.title, "Home");
        assert_eq!(data.seo.url, "/home");
        assert!(data.seo.title.is_empty());
        assert_eq!(data.data, json!({ "items": [1, 2] }));
    }

    #[test]
    fn serializes_custom_data() {
        #[derive(Serialize)]
        struct Member {
            name: &'static str,
        }

        let page = Page::new("team", "Team")
            .serialize_data(&vec![Member { name: "ada" }])
            .unwrap();

        assert_eq!(page.data(), &json!([{ "name": "ada" }]));
    }
}
