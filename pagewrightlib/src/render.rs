pub mod template;

use std::sync::Arc;

use thiserror::Error;
use tracing::{instrument, trace};

use crate::core::config::SiteConfig;
use crate::core::files::{FileTree, FileTreeError};
use crate::core::seo::TemplateData;
use crate::Result;

use template::TemplateStore;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to load template for page '{page}' from '{path}'")]
    PageFile {
        page: String,
        path: String,
        #[source]
        source: FileTreeError,
    },
    #[error("failed to parse template for page '{page}' at '{path}'")]
    PageParse {
        page: String,
        path: String,
        #[source]
        source: tera::Error,
    },
    #[error("failed to build template context for page '{page}'")]
    Context {
        page: String,
        #[source]
        source: tera::Error,
    },
    #[error("failed to render page '{page}'")]
    Execution {
        page: String,
        #[source]
        source: tera::Error,
    },
}

impl RenderError {
    pub fn page(&self) -> &str {
        match self {
            Self::PageFile { page, .. }
            | Self::PageParse { page, .. }
            | Self::Context { page, .. }
            | Self::Execution { page, .. } => page,
        }
    }
}

/// Applies the site defaults to page data and renders it through the
/// template store.
#[derive(Debug)]
pub struct Renderer {
    config: Arc<SiteConfig>,
    store: TemplateStore,
}

impl Renderer {
    pub fn new(config: Arc<SiteConfig>, files: Arc<dyn FileTree>) -> Result<Self> {
        let store = TemplateStore::new(Arc::clone(&config), files)?;
        Ok(Self { config, store })
    }

    pub fn store(&self) -> &TemplateStore {
        &self.store
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Formats the title and fills in the default SEO data, if any is
    /// configured. Without defaults the SEO block is left untouched.
    pub fn merge(&self, data: &mut TemplateData) {
        data.title = self.config.format_title(&data.title);
        if let Some(defaults) = self.config.default_seo() {
            data.seo.merge_defaults(&data.title, defaults);
        }
    }

    #[instrument(skip(self, data))]
    pub fn render(&self, name: &str, mut data: TemplateData) -> std::result::Result<String, RenderError> {
        self.merge(&mut data);
        trace!("rendering page");
        self.store.render(name, &data)
    }

    /// Renders straight into `write`. Bytes already written stay written
    /// when execution fails part way.
    #[instrument(skip(self, data, write))]
    pub fn render_to<W: std::io::Write>(
        &self,
        name: &str,
        mut data: TemplateData,
        write: W,
    ) -> std::result::Result<(), RenderError> {
        self.merge(&mut data);
        let compiled = self.store.compile(name)?;
        let context = template::context_for(name, &data)?;
        compiled
            .render_to(&context, write)
            .map_err(|source| RenderError::Execution {
                page: name.to_owned(),
                source,
            })
    }
}
