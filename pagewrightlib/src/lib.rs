#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod core;
pub mod render;
pub mod server;
pub mod util;

pub use crate::core::config::{SiteConfig, SiteConfigBuilder, SiteFile};
pub use crate::core::files::{DirTree, FileTree, FileTreeError, MemoryTree};
pub use crate::core::page::Page;
pub use crate::core::seo::{SeoData, TemplateData};
pub use render::{RenderError, Renderer};
pub use server::Site;

pub type Result<T> = eyre::Result<T>;

#[cfg(test)]
pub(crate) mod test {
    use std::sync::Arc;

    use crate::core::config::SiteConfig;
    use crate::core::files::MemoryTree;

    pub const BASE: &str = r#"<title>{{ title }}</title>{% block body %}{% endblock body %}"#;

    pub fn tree_with_pages(pages: &[(&str, &str)]) -> Arc<MemoryTree> {
        let mut tree = MemoryTree::new().with_file("base.tera", BASE);
        for (path, content) in pages {
            tree = tree.with_file(*path, *content);
        }
        Arc::new(tree)
    }

    pub fn simple_config() -> Arc<SiteConfig> {
        Arc::new(SiteConfig::builder().template("base.tera").build())
    }
}
