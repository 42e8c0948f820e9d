//! Loads the project configuration from `photogrid.yaml` and the theme's
//! `theme.yaml`.
//!
//! ```yaml
//! # photogrid.yaml
//! site_root: https://example.org/
//! image_base_url: https://images.example.org/account-hash/
//! image_variant: small
//! ```

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;

/// The name of the project file searched for by [`Config::from_directory`].
pub const PROJECT_FILE: &str = "photogrid.yaml";

#[derive(Deserialize)]
struct Variant(String);
impl Default for Variant {
    fn default() -> Self {
        Variant("small".to_owned())
    }
}

#[derive(Deserialize)]
struct Project {
    pub site_root: Url,

    #[serde(default)]
    pub home_page: String,

    pub image_base_url: Url,

    #[serde(default)]
    pub image_variant: Variant,

    #[serde(default)]
    pub images_directory: Option<PathBuf>,

    #[serde(default)]
    pub theme_directory: Option<PathBuf>,

    #[serde(default)]
    pub output_directory: Option<PathBuf>,
}

#[derive(Deserialize)]
struct Theme {
    grid_template: Vec<PathBuf>,
}

/// Resolved configuration. Relative paths in the project file are resolved
/// against the directory containing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// The URL of the site's home page.
    pub home_page: Url,

    /// The URL images are served from. Always ends in a slash, so that
    /// `{image_base_url}{id}/{variant}` can be built with [`Url::join`].
    pub image_base_url: Url,

    /// The named image size appended to image URLs.
    pub image_variant: String,

    /// Where image files are read from to resolve their dimensions.
    pub images_directory: PathBuf,

    /// The template files for gallery pages, concatenated in order.
    pub grid_template: Vec<PathBuf>,

    /// Where gallery pages are written.
    pub output_directory: PathBuf,

    /// Worker threads used to resolve image dimensions.
    pub threads: usize,
}

impl Config {
    /// Searches `dir` and then each of its ancestors for a
    /// [`PROJECT_FILE`] and loads the first one found.
    pub fn from_directory(
        dir: &Path,
        output_directory: Option<&Path>,
        threads: Option<usize>,
    ) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            match Config::from_project_file(&path, output_directory, threads) {
                Ok(config) => Ok(config),
                Err(e) => Err(anyhow!("Loading configuration: {:?}", e)),
            }
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent, output_directory, threads),
                None => Err(anyhow!(
                    "Could not find `{}` in any parent directory",
                    PROJECT_FILE
                )),
            }
        }
    }

    pub fn from_project_file(
        path: &Path,
        output_directory: Option<&Path>,
        threads: Option<usize>,
    ) -> Result<Config> {
        let project: Project = serde_yaml::from_reader(open(path, "project")?)?;
        let project_root = path.parent().ok_or_else(|| {
            anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )
        })?;

        let theme_dir = project_root.join(
            project
                .theme_directory
                .unwrap_or_else(|| PathBuf::from("theme")),
        );
        let theme: Theme = serde_yaml::from_reader(open(&theme_dir.join("theme.yaml"), "theme")?)?;

        Ok(Config {
            home_page: project.site_root.join(&project.home_page)?,
            image_base_url: with_trailing_slash(project.image_base_url),
            image_variant: project.image_variant.0,
            images_directory: project_root.join(
                project
                    .images_directory
                    .unwrap_or_else(|| PathBuf::from("images")),
            ),
            grid_template: theme
                .grid_template
                .iter()
                .map(|relpath| theme_dir.join(relpath))
                .collect(),
            output_directory: match output_directory {
                Some(dir) => dir.to_owned(),
                None => project_root.join(
                    project
                        .output_directory
                        .unwrap_or_else(|| PathBuf::from("_site")),
                ),
            },
            threads: match threads {
                None => num_cpus::get(),
                Some(threads) => threads,
            },
        })
    }
}

fn open(path: &Path, kind: &str) -> Result<File> {
    File::open(path).with_context(|| format!("Opening {} file `{}`", kind, path.display()))
}

// A trailing slash is significant to `Url::join`: without it the last path
// segment is treated as a file name and replaced.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
