//! Import settings resolution
//!
//! Combines command-line overrides with the TOML bootstrap config.
//! Priority: CLI → ENV → TOML → compiled default.

use crate::services::bulk_importer::DEFAULT_BATCH_SIZE;
use crate::services::image_scanner::ImageSource;
use appleverse_common::config::{resolve_root_folder, TomlConfig, ROOT_FOLDER_ENV};
use appleverse_common::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Database file name under the root folder
pub const DATABASE_FILE_NAME: &str = "appleverse.db";

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub root_folder: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
    pub batch_size: Option<usize>,
    pub image_sources: Vec<ImageSource>,
}

/// Fully resolved settings for one import run
#[derive(Debug, Clone)]
pub struct ImportSettings {
    pub root_folder: PathBuf,
    pub data_dir: PathBuf,
    pub database_path: PathBuf,
    pub batch_size: usize,
    pub image_sources: Vec<ImageSource>,
    pub log_level: String,
}

impl ImportSettings {
    pub fn resolve(cli: &CliOverrides, toml_config: &TomlConfig) -> Result<Self> {
        let root_folder =
            resolve_root_folder(cli.root_folder.as_deref(), ROOT_FOLDER_ENV, toml_config);

        let data_dir = cli
            .data_dir
            .clone()
            .or_else(|| toml_config.data_dir.clone())
            .unwrap_or_else(|| root_folder.join("data"));

        let database_path = cli
            .database_path
            .clone()
            .or_else(|| toml_config.database_path.clone())
            .unwrap_or_else(|| root_folder.join(DATABASE_FILE_NAME));

        let batch_size = cli
            .batch_size
            .or(toml_config.batch_size)
            .unwrap_or(DEFAULT_BATCH_SIZE);
        if batch_size == 0 {
            return Err(Error::InvalidInput("batch_size must be at least 1".to_string()));
        }

        let image_sources = if !cli.image_sources.is_empty() {
            cli.image_sources.clone()
        } else if !toml_config.image_sources.is_empty() {
            toml_config
                .image_sources
                .iter()
                .map(|s| ImageSource::new(s.dir.clone(), s.url_prefix.clone()))
                .collect()
        } else {
            default_image_sources(&root_folder)
        };

        let settings = Self {
            root_folder,
            data_dir,
            database_path,
            batch_size,
            image_sources,
            log_level: toml_config.logging.level.clone(),
        };

        info!(
            root = %settings.root_folder.display(),
            data_dir = %settings.data_dir.display(),
            database = %settings.database_path.display(),
            batch_size = settings.batch_size,
            "Resolved import settings"
        );

        Ok(settings)
    }
}

/// `<root>/images` served at `/images`, `<root>/data` served at `/data`
pub fn default_image_sources(root_folder: &Path) -> Vec<ImageSource> {
    vec![
        ImageSource::new(root_folder.join("images"), "/images"),
        ImageSource::new(root_folder.join("data"), "/data"),
    ]
}

/// Parse a `DIR=PREFIX` argument; a bare `DIR` is served at `/images`
pub fn parse_image_source(arg: &str) -> std::result::Result<ImageSource, String> {
    let (dir, prefix) = match arg.split_once('=') {
        Some((dir, prefix)) => (dir.trim(), prefix.trim()),
        None => (arg.trim(), "/images"),
    };

    if dir.is_empty() {
        return Err(format!("missing directory in '{}'", arg));
    }
    if !prefix.starts_with('/') {
        return Err(format!("URL prefix must start with '/': '{}'", prefix));
    }

    Ok(ImageSource::new(dir, prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use appleverse_common::config::ImageSourceConfig;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_defaults_relative_to_root() {
        std::env::remove_var(ROOT_FOLDER_ENV);
        let cli = CliOverrides {
            root_folder: Some(PathBuf::from("/srv/apples")),
            ..Default::default()
        };

        let settings = ImportSettings::resolve(&cli, &TomlConfig::default()).unwrap();

        assert_eq!(settings.data_dir, PathBuf::from("/srv/apples/data"));
        assert_eq!(settings.database_path, PathBuf::from("/srv/apples/appleverse.db"));
        assert_eq!(settings.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.image_sources.len(), 2);
        assert_eq!(settings.image_sources[0].url_prefix, "/images");
        assert_eq!(settings.image_sources[1].dir, PathBuf::from("/srv/apples/data"));
    }

    #[test]
    #[serial]
    fn test_cli_beats_toml() {
        std::env::remove_var(ROOT_FOLDER_ENV);
        let toml_config = TomlConfig {
            root_folder: Some(PathBuf::from("/toml/root")),
            data_dir: Some(PathBuf::from("/toml/data")),
            batch_size: Some(10),
            image_sources: vec![ImageSourceConfig {
                dir: PathBuf::from("/toml/pics"),
                url_prefix: "/pics".to_string(),
            }],
            ..Default::default()
        };
        let cli = CliOverrides {
            data_dir: Some(PathBuf::from("/cli/data")),
            batch_size: Some(5),
            ..Default::default()
        };

        let settings = ImportSettings::resolve(&cli, &toml_config).unwrap();

        assert_eq!(settings.root_folder, PathBuf::from("/toml/root"));
        assert_eq!(settings.data_dir, PathBuf::from("/cli/data"));
        assert_eq!(settings.batch_size, 5);
        assert_eq!(settings.image_sources.len(), 1);
        assert_eq!(settings.image_sources[0].url_prefix, "/pics");
    }

    #[test]
    #[serial]
    fn test_log_level_from_toml() {
        std::env::remove_var(ROOT_FOLDER_ENV);
        let mut toml_config = TomlConfig::default();
        toml_config.logging.level = "debug".to_string();
        let cli = CliOverrides {
            root_folder: Some(PathBuf::from("/srv/apples")),
            ..Default::default()
        };

        let settings = ImportSettings::resolve(&cli, &toml_config).unwrap();
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    #[serial]
    fn test_zero_batch_size_rejected() {
        std::env::remove_var(ROOT_FOLDER_ENV);
        let cli = CliOverrides {
            root_folder: Some(PathBuf::from("/srv/apples")),
            batch_size: Some(0),
            ..Default::default()
        };

        assert!(matches!(
            ImportSettings::resolve(&cli, &TomlConfig::default()),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_parse_image_source() {
        let source = parse_image_source("/srv/pics=/media").unwrap();
        assert_eq!(source.dir, PathBuf::from("/srv/pics"));
        assert_eq!(source.url_prefix, "/media");

        let bare = parse_image_source("/srv/pics").unwrap();
        assert_eq!(bare.url_prefix, "/images");

        assert!(parse_image_source("=/media").is_err());
        assert!(parse_image_source("/srv/pics=media").is_err());
    }
}
