use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use glf_ingest::AssetDirs;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};
use crate::format::PublicUrls;

/// Server configuration, usually read from a TOML file.
///
/// Every field has a default, so a config file only needs the values that
/// differ.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Directory holding `data.json`.
    pub data_dir: PathBuf,
    pub image_full_dir: PathBuf,
    pub image_preview_dir: PathBuf,
    /// Where uploads are written before commit. Not served; must share a
    /// filesystem with the image directories.
    pub image_staging_dir: PathBuf,
    /// Public route of full images, e.g. `/images/full/`.
    pub image_full_route: String,
    /// Public route of previews, e.g. `/images/preview/`.
    pub image_preview_route: String,
    /// Prefix prepended to image routes in token responses.
    pub image_base_path: String,
    /// Prefix of each token's `external_url`; the token id is appended.
    pub external_url_base: String,
    pub allow_cors: bool,
    /// Maximum request body size in bytes.
    pub max_upload_size: usize,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            data_dir: PathBuf::from("data"),
            image_full_dir: PathBuf::from("images/full"),
            image_preview_dir: PathBuf::from("images/preview"),
            image_staging_dir: PathBuf::from("images/.staging"),
            image_full_route: "/images/full/".into(),
            image_preview_route: "/images/preview/".into(),
            image_base_path: String::new(),
            external_url_base: String::new(),
            allow_cors: false,
            max_upload_size: 50 * 1024 * 1024,
            request_timeout_secs: 120,
        }
    }
}

impl ServerConfig {
    /// Read and validate a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> ServerResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the image routes can be mounted side by side.
    pub fn validate(&self) -> ServerResult<()> {
        for (key, route) in [
            ("image_full_route", &self.image_full_route),
            ("image_preview_route", &self.image_preview_route),
        ] {
            if route.len() < 2 || !route.starts_with('/') || !route.ends_with('/') {
                return Err(ServerError::Config(format!(
                    "{key} must start and end with '/' and not be the root: {route:?}"
                )));
            }
        }
        if self.image_full_route == self.image_preview_route {
            return Err(ServerError::Config(
                "image_full_route and image_preview_route must differ".into(),
            ));
        }
        Ok(())
    }

    pub fn public_urls(&self) -> PublicUrls {
        PublicUrls {
            image_base_path: self.image_base_path.clone(),
            image_full_route: self.image_full_route.clone(),
            image_preview_route: self.image_preview_route.clone(),
            external_url_base: self.external_url_base.clone(),
        }
    }

    pub fn asset_dirs(&self) -> AssetDirs {
        AssetDirs::new(
            &self.image_full_dir,
            &self.image_preview_dir,
            &self.image_staging_dir,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(c.max_upload_size, 50 * 1024 * 1024);
        assert!(!c.allow_cors);
        assert_eq!(c.asset_dirs().staging, PathBuf::from("images/.staging"));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = ServerConfig::from_toml(
            r#"
            bind_addr = "0.0.0.0:8080"
            data_dir = "/var/lib/glf"
            image_base_path = "https://img.example.com"
            external_url_base = "https://example.com/token/"
            allow_cors = true
            "#,
        )
        .unwrap();
        assert_eq!(c.bind_addr.port(), 8080);
        assert_eq!(c.data_dir, PathBuf::from("/var/lib/glf"));
        assert!(c.allow_cors);
        assert_eq!(c.image_full_route, "/images/full/");
        assert_eq!(c.public_urls().external_url_base, "https://example.com/token/");
    }

    #[test]
    fn bad_routes_rejected() {
        let err = ServerConfig::from_toml(r#"image_full_route = "/full""#).unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));

        let err = ServerConfig::from_toml(
            r#"
            image_full_route = "/img/"
            image_preview_route = "/img/"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("must differ"));
    }

    #[test]
    fn unknown_types_rejected() {
        assert!(ServerConfig::from_toml("allow_cors = \"yes\"").is_err());
    }

    #[test]
    fn load_missing_file() {
        let err = ServerConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }
}
