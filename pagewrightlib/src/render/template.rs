mod functions;

pub use functions::{asset_path, static_path, AssetPath, StaticPath, ASSETS_PREFIX, STATIC_PREFIX};

use std::collections::HashSet;
use std::sync::Arc;

use eyre::{eyre, WrapErr};
use tera::Tera;
use tracing::{instrument, trace};

use crate::core::config::SiteConfig;
use crate::core::files::FileTree;
use crate::core::seo::TemplateData;
use crate::render::RenderError;
use crate::Result;

/// Name a template is registered under: its path without the final extension.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TemplateName(String);

impl TemplateName {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self(name.into())
    }

    pub fn from_path(path: &str) -> Self {
        let file_start = path.rfind('/').map_or(0, |i| i + 1);
        match path[file_start..].rfind('.') {
            Some(dot) if dot > 0 => Self::new(&path[..file_start + dot]),
            _ => Self::new(path),
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for TemplateName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shared templates plus one page template, ready to execute.
#[derive(Debug)]
pub struct CompiledPage {
    tera: Tera,
    entry: TemplateName,
}

impl CompiledPage {
    pub fn render(&self, context: &tera::Context) -> tera::Result<String> {
        self.tera.render(self.entry.as_str(), context)
    }

    pub fn render_to<W: std::io::Write>(&self, context: &tera::Context, write: W) -> tera::Result<()> {
        self.tera.render_to(self.entry.as_str(), context, write)
    }
}

/// Resolves page names to template files and compiles them against the
/// shared templates.
///
/// The shared templates are parsed once when the store is created. Every
/// compiled page starts from a copy of that set.
#[derive(Debug)]
pub struct TemplateStore {
    config: Arc<SiteConfig>,
    files: Arc<dyn FileTree>,
    shared: Tera,
}

impl TemplateStore {
    #[instrument(skip_all)]
    pub fn new(config: Arc<SiteConfig>, files: Arc<dyn FileTree>) -> Result<Self> {
        let shared = compile_shared(&config, files.as_ref())
            .wrap_err("Failed to compile shared templates")?;
        Ok(Self {
            config,
            files,
            shared,
        })
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// `<page_dir>/<name>.<template_extension>`
    pub fn resolve_path(&self, name: &str) -> String {
        format!(
            "{}/{}.{}",
            self.config.page_dir(),
            name,
            self.config.template_extension()
        )
    }

    pub fn shared_template_names(&self) -> Vec<String> {
        self.shared
            .get_template_names()
            .map(ToString::to_string)
            .collect()
    }

    /// Parses the template for `name` into a copy of the shared set.
    ///
    /// A page template without its own `extends` tag becomes a child of the
    /// initial section.
    #[instrument(skip(self))]
    pub fn compile(&self, name: &str) -> std::result::Result<CompiledPage, RenderError> {
        let path = self.resolve_path(name);
        trace!(path = %path, "compiling page template");

        let source = self
            .files
            .read_to_string(&path)
            .map_err(|source| RenderError::PageFile {
                page: name.to_owned(),
                path: path.clone(),
                source,
            })?;
        let source = match source.strip_prefix('\u{feff}') {
            Some(rest) => rest.to_owned(),
            None => source,
        };

        let source = if declares_parent(&source) {
            source
        } else {
            format!(
                "{{% extends \"{}\" %}}{}",
                self.config.initial_section(),
                source
            )
        };

        let entry = TemplateName::from_path(&path);
        let mut tera = self.shared.clone();
        tera.add_raw_template(entry.as_str(), &source)
            .map_err(|source| RenderError::PageParse {
                page: name.to_owned(),
                path,
                source,
            })?;

        Ok(CompiledPage { tera, entry })
    }

    /// Compiles every named page once, reporting the first failure.
    pub fn verify<'a, I: IntoIterator<Item = &'a str>>(&self, names: I) -> Result<()> {
        for name in names {
            self.compile(name)
                .wrap_err_with(|| format!("Page '{}' failed to compile", name))?;
        }
        Ok(())
    }

    pub fn render(&self, name: &str, data: &TemplateData) -> std::result::Result<String, RenderError> {
        let compiled = self.compile(name)?;
        let context = context_for(name, data)?;
        compiled
            .render(&context)
            .map_err(|source| RenderError::Execution {
                page: name.to_owned(),
                source,
            })
    }
}

pub(crate) fn context_for(
    name: &str,
    data: &TemplateData,
) -> std::result::Result<tera::Context, RenderError> {
    data.to_context().map_err(|source| RenderError::Context {
        page: name.to_owned(),
        source,
    })
}

fn compile_shared(config: &SiteConfig, files: &dyn FileTree) -> Result<Tera> {
    if config.templates().is_empty() {
        return Err(eyre!("no shared templates configured"));
    }

    let mut names = HashSet::new();
    let mut sources = vec![];
    for path in config.templates() {
        let name = TemplateName::from_path(path);
        if !names.insert(name.clone()) {
            return Err(eyre!(
                "shared template '{}' registers duplicate name '{}'",
                path,
                name
            ));
        }
        let source = files
            .read_to_string(path)
            .wrap_err_with(|| format!("Failed to read shared template '{}'", path))?;
        sources.push((name.into_string(), source));
    }

    let mut tera = Tera::default();
    tera.autoescape_on(vec![""]);
    functions::register(config, &mut tera);
    tera.add_raw_templates(sources)
        .wrap_err("Failed to parse shared templates")?;

    if !names.contains(&TemplateName::new(config.initial_section())) {
        return Err(eyre!(
            "initial section '{}' is not one of the shared templates",
            config.initial_section()
        ));
    }

    Ok(tera)
}

/// Whether a template source starts with its own `extends` tag.
fn declares_parent(source: &str) -> bool {
    let mut rest = source.trim_start();
    while let Some(comment) = rest.strip_prefix("{#") {
        match comment.find("#}") {
            Some(end) => rest = comment[end + 2..].trim_start(),
            None => return false,
        }
    }
    rest.strip_prefix("{%")
        .map(|tag| tag.trim_start_matches('-').trim_start())
        .map_or(false, |tag| tag.starts_with("extends"))
}
