use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use derivative::Derivative;
use eyre::WrapErr;
use serde::Deserialize;

use crate::core::page::Page;
use crate::core::seo::SeoData;
use crate::Result;

pub const DEFAULT_PAGE_DIR: &str = "page";
pub const DEFAULT_TEMPLATE_EXTENSION: &str = "tera";
pub const DEFAULT_INITIAL_SECTION: &str = "base";

pub type FormatTitleFn = Arc<dyn Fn(&str) -> String + Send + Sync>;
pub type HelperFn =
    Arc<dyn Fn(&HashMap<String, tera::Value>) -> tera::Result<tera::Value> + Send + Sync>;

/// Site-wide rendering configuration.
///
/// Built once with [`SiteConfigBuilder`] and never changed afterwards.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct SiteConfig {
    page_dir: String,
    template_extension: String,
    initial_section: String,
    templates: Vec<String>,
    #[derivative(Debug = "ignore")]
    format_title: FormatTitleFn,
    default_seo: Option<SeoData>,
    #[derivative(Debug(format_with = "fmt_helper_names"))]
    functions: Vec<(String, HelperFn)>,
}

#[allow(clippy::ptr_arg)]
fn fmt_helper_names(
    functions: &Vec<(String, HelperFn)>,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    f.debug_list()
        .entries(functions.iter().map(|(name, _)| name))
        .finish()
}

impl SiteConfig {
    pub fn builder() -> SiteConfigBuilder {
        SiteConfigBuilder::default()
    }

    pub fn from_toml_str<S: AsRef<str>>(toml: S) -> Result<Self> {
        let (builder, _) = SiteFile::from_toml_str(toml)?.into_parts();
        Ok(builder.build())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let (builder, _) = SiteFile::load(path)?.into_parts();
        Ok(builder.build())
    }

    pub fn page_dir(&self) -> &str {
        &self.page_dir
    }

    pub fn template_extension(&self) -> &str {
        &self.template_extension
    }

    pub fn initial_section(&self) -> &str {
        &self.initial_section
    }

    pub fn templates(&self) -> &[String] {
        &self.templates
    }

    pub fn default_seo(&self) -> Option<&SeoData> {
        self.default_seo.as_ref()
    }

    pub fn functions(&self) -> impl Iterator<Item = (&str, &HelperFn)> {
        self.functions.iter().map(|(name, f)| (name.as_str(), f))
    }

    pub fn format_title(&self, title: &str) -> String {
        (self.format_title)(title)
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfigBuilder::default().build()
    }
}

#[derive(Derivative)]
#[derivative(Debug)]
pub struct SiteConfigBuilder {
    page_dir: String,
    template_extension: String,
    initial_section: String,
    templates: Vec<String>,
    #[derivative(Debug = "ignore")]
    format_title: FormatTitleFn,
    default_seo: Option<SeoData>,
    #[derivative(Debug(format_with = "fmt_helper_names"))]
    functions: Vec<(String, HelperFn)>,
}

impl Default for SiteConfigBuilder {
    fn default() -> Self {
        Self {
            page_dir: DEFAULT_PAGE_DIR.to_owned(),
            template_extension: DEFAULT_TEMPLATE_EXTENSION.to_owned(),
            initial_section: DEFAULT_INITIAL_SECTION.to_owned(),
            templates: vec![],
            format_title: Arc::new(|title: &str| title.to_owned()),
            default_seo: None,
            functions: vec![],
        }
    }
}

impl SiteConfigBuilder {
    #[must_use]
    pub fn page_dir<S: Into<String>>(self, dir: S) -> Self {
        Self {
            page_dir: dir.into(),
            ..self
        }
    }

    #[must_use]
    pub fn template_extension<S: Into<String>>(self, ext: S) -> Self {
        Self {
            template_extension: ext.into(),
            ..self
        }
    }

    #[must_use]
    pub fn initial_section<S: Into<String>>(self, section: S) -> Self {
        Self {
            initial_section: section.into(),
            ..self
        }
    }

    /// Adds a shared template path. Shared templates are part of every render.
    #[must_use]
    pub fn template<S: Into<String>>(mut self, path: S) -> Self {
        self.templates.push(path.into());
        self
    }

    #[must_use]
    pub fn templates<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.templates.extend(paths.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn format_title<F>(self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self {
            format_title: Arc::new(f),
            ..self
        }
    }

    #[must_use]
    pub fn default_seo(self, seo: SeoData) -> Self {
        Self {
            default_seo: Some(seo),
            ..self
        }
    }

    /// Registers an extra function callable from every template.
    #[must_use]
    pub fn function<S, F>(mut self, name: S, f: F) -> Self
    where
        S: Into<String>,
        F: Fn(&HashMap<String, tera::Value>) -> tera::Result<tera::Value> + Send + Sync + 'static,
    {
        self.functions.push((name.into(), Arc::new(f)));
        self
    }

    pub fn build(self) -> SiteConfig {
        SiteConfig {
            page_dir: self.page_dir,
            template_extension: self.template_extension,
            initial_section: self.initial_section,
            templates: self.templates,
            format_title: self.format_title,
            default_seo: self.default_seo,
            functions: self.functions,
        }
    }
}

/// On-disk site description (`site.toml`).
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteFile {
    pub page_dir: Option<String>,
    pub template_extension: Option<String>,
    pub initial_section: Option<String>,
    pub templates: Vec<String>,
    /// `{}` is replaced with the page title.
    pub title_format: Option<String>,
    pub seo: Option<SeoData>,
    pub pages: Vec<Page>,
    /// Rendered for requests that match no page.
    pub not_found: Option<Page>,
}

impl SiteFile {
    pub fn from_toml_str<S: AsRef<str>>(toml: S) -> Result<Self> {
        toml::from_str(toml.as_ref()).wrap_err("Failed to parse site configuration")
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).wrap_err_with(|| {
            format!("Failed to read site configuration at '{}'", path.display())
        })?;
        Self::from_toml_str(raw)
            .wrap_err_with(|| format!("Invalid site configuration at '{}'", path.display()))
    }

    pub fn into_parts(self) -> (SiteConfigBuilder, Vec<Page>) {
        let mut builder = SiteConfig::builder().templates(self.templates);
        if let Some(dir) = self.page_dir {
            builder = builder.page_dir(dir);
        }
        if let Some(ext) = self.template_extension {
            builder = builder.template_extension(ext);
        }
        if let Some(section) = self.initial_section {
            builder = builder.initial_section(section);
        }
        if let Some(fmt) = self.title_format {
            builder = builder.format_title(move |title| fmt.replace("{}", title));
        }
        if let Some(seo) = self.seo {
            builder = builder.default_seo(seo);
        }
        (builder, self.pages)
    }
}

#[cfg(test)]
mod test {

    #![allow(warnings, unused)]
    use super::*;

    #[test]
    fn default_values() {
        let config = SiteConfig::default();

        assert_eq!(config.page_dir(), "page");
        assert_eq!(config.template_extension(), "tera");
        assert_eq!(config.initial_section(), "base");
        assert!(config.templates().is_empty());
        assert!(config.default_seo().is_none());
        assert_eq!(config.functions().count(), 0);
        assert_eq!(config.format_title("Home"), "Home");
    }

    #[test]
    fn builder_sets_values() {
        let config = SiteConfig::builder()
            .page_dir("pages")
            .template_extension("html")
            .initial_section("layout")
            .template("layout.html")
            .templates(["nav.html", "footer.html"])
            .format_title(|t| format!("{t} | Site"))
            .function("answer", |_| Ok(tera::Value::from(42)))
            .build();

        assert_eq!(config.page_dir(), "pages");
        assert_eq!(config.template_extension(), "html");
        assert_eq!(config.initial_section(), "layout");
        assert_eq!(config.templates(), &["layout.html", "nav.html", "footer.html"]);
        assert_eq!(config.format_title("Home"), "Home | Site");
        assert_eq!(config.functions().next().unwrap().0, "answer");
    }

    #[test]
    fn debug_lists_helper_names() {
        let config = SiteConfig::builder()
            .function("answer", |_| Ok(tera::Value::from(42)))
            .build();

        assert!(format!("{:?}", config).contains("answer"));
    }

    #[test]
    fn parses_site_file() {
        let raw = r#"
            page_dir = "pages"
            templates = ["base.tera"]
            title_format = "{} | Example"

            [seo]
            domain = "example.com"
            image = "logo.png"

            [[pages]]
            name = "home"
            title = "Home"
            route = "/"
            data = { greeting = "hello" }

            [[pages]]
            name = "about"
            title = "About"

            [not_found]
            name = "404"
            title = "Not Found"
        "#;

        let mut file = SiteFile::from_toml_str(raw).unwrap();
        assert_eq!(file.not_found.take().unwrap().name(), "404");
        let (builder, pages) = file.into_parts();
        let config = builder.build();

        assert_eq!(config.page_dir(), "pages");
        assert_eq!(config.template_extension(), "tera");
        assert_eq!(config.templates(), &["base.tera"]);
        assert_eq!(config.format_title("Home"), "Home | Example");
        assert_eq!(config.default_seo().unwrap().domain, "example.com");

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].url(), "/");
        assert_eq!(pages[0].data()["greeting"], "hello");
        assert_eq!(pages[1].url(), "/about");
    }

    #[test]
    fn rejects_unknown_keys() {
        let result = SiteConfig::from_toml_str("page_directory = \"x\"");
        assert!(result.is_err());
    }

    #[test]
    fn rejects_misspelled_page_keys() {
        let raw = r#"
            templates = ["base.tera"]

            [[pages]]
            name = "home"
            title = "Home"
            descripton = "typo"
        "#;
        assert!(SiteFile::from_toml_str(raw).is_err());
    }

    #[test]
    fn rejects_misspelled_not_found_keys() {
        let raw = r#"
            [not_found]
            name = "404"
            title = "Not Found"
            rout = "/404"
        "#;
        assert!(SiteFile::from_toml_str(raw).is_err());
    }

    #[test]
    fn rejects_misspelled_seo_keys() {
        let raw = r#"
            [seo]
            domian = "example.com"
        "#;
        assert!(SiteFile::from_toml_str(raw).is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let result = SiteConfig::load("/definitely/not/here/site.toml");
        assert!(result.is_err());
    }
}
