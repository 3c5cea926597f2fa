use std::collections::HashMap;

use tera::Tera;

use crate::core::config::SiteConfig;

pub const STATIC_PREFIX: &str = "/static/";
pub const ASSETS_PREFIX: &str = "/assets/";

/// Path of a static file (images, fonts).
pub fn static_path(path: &str) -> String {
    format!("{STATIC_PREFIX}{path}")
}

/// Path of a built asset (scripts, stylesheets).
pub fn asset_path(path: &str) -> String {
    format!("{ASSETS_PREFIX}{path}")
}

pub fn register(config: &SiteConfig, tera: &mut Tera) {
    tera.register_function(StaticPath::NAME, StaticPath);
    tera.register_function(AssetPath::NAME, AssetPath);

    for (name, f) in config.functions() {
        let f = f.clone();
        tera.register_function(name, move |args: &HashMap<String, tera::Value>| f(args));
    }
}

fn path_arg<'a>(fn_name: &str, args: &'a HashMap<String, tera::Value>) -> tera::Result<&'a str> {
    let value = args
        .get("path")
        .ok_or_else(|| tera::Error::msg(format!("`path` required when calling `{fn_name}`")))?;
    value.as_str().ok_or_else(|| {
        tera::Error::msg(format!(
            "failed to interpret path '{value}' as a string in `{fn_name}`"
        ))
    })
}

pub struct StaticPath;

impl StaticPath {
    pub const NAME: &'static str = "static_path";
}

impl tera::Function for StaticPath {
    fn call(&self, args: &HashMap<String, tera::Value>) -> tera::Result<tera::Value> {
        let path = path_arg(Self::NAME, args)?;
        Ok(tera::Value::String(static_path(path)))
    }

    fn is_safe(&self) -> bool {
        true
    }
}

pub struct AssetPath;

impl AssetPath {
    pub const NAME: &'static str = "asset_path";
}

impl tera::Function for AssetPath {
    fn call(&self, args: &HashMap<String, tera::Value>) -> tera::Result<tera::Value> {
        let path = path_arg(Self::NAME, args)?;
        Ok(tera::Value::String(asset_path(path)))
    }

    fn is_safe(&self) -> bool {
        true
    }
}
