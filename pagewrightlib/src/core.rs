pub mod config;
pub mod files;
pub mod page;
pub mod seo;
