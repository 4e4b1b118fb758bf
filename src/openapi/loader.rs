//! OpenAPI document loaders

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use super::OpenApiDocument;

/// Vendor annotation stripped from every document before parsing
pub const CHANGELOG_EXTENSION: &str = "x-xgen-changelog";

/// Conventional location of the OpenAPI document inside an API-client package
pub const PACKAGE_DOCUMENT: &str = "openapi/atlas-api-transformed.yaml";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read OpenAPI document {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse OpenAPI document {identifier}: {source}")]
    Parse {
        identifier: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to expand {identifier}: {message}")]
    Expand { identifier: String, message: String },

    #[error("cannot load {0}: remote documents require the `http` feature")]
    RemoteUnsupported(String),

    #[error("failed to fetch {url}: {message}")]
    Http { url: String, message: String },

    #[error("invalid package reference {0:?}, expected module@version")]
    InvalidPackage(String),

    #[error("package {package} not found in module cache {}", .searched.display())]
    PackageNotFound { package: String, searched: PathBuf },

    #[error("could not determine the module cache directory")]
    NoModuleCache,
}

/// Loads an OpenAPI document by identifier
#[async_trait]
pub trait Loader: Send + Sync {
    async fn load(&self, identifier: &str) -> Result<OpenApiDocument, LoadError>;
}

/// Parse a YAML or JSON document, dropping changelog annotations first
pub fn parse_document(content: &str, identifier: &str) -> Result<OpenApiDocument, LoadError> {
    let parse_error = |source| LoadError::Parse {
        identifier: identifier.to_string(),
        source,
    };

    let mut value: serde_yaml::Value = serde_yaml::from_str(content).map_err(parse_error)?;
    strip_extension(&mut value, CHANGELOG_EXTENSION);
    serde_yaml::from_value(value).map_err(parse_error)
}

/// Remove `key` from every mapping nested anywhere in `value`
pub fn strip_extension(value: &mut serde_yaml::Value, key: &str) {
    match value {
        serde_yaml::Value::Mapping(mapping) => {
            mapping.remove(key);
            for (_, child) in mapping.iter_mut() {
                strip_extension(child, key);
            }
        }
        serde_yaml::Value::Sequence(items) => {
            for item in items {
                strip_extension(item, key);
            }
        }
        serde_yaml::Value::Tagged(tagged) => strip_extension(&mut tagged.value, key),
        _ => {}
    }
}

/// Loads documents from local paths, or from `http(s)://` URIs with the `http` feature
#[derive(Debug, Clone, Default)]
pub struct PathLoader {
    /// Directory relative paths are resolved against
    base_dir: Option<PathBuf>,
}

impl PathLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn resolve_path(&self, identifier: &str) -> Result<PathBuf, LoadError> {
        let expanded = shellexpand::full(identifier).map_err(|e| LoadError::Expand {
            identifier: identifier.to_string(),
            message: e.to_string(),
        })?;
        let path = PathBuf::from(expanded.as_ref());

        Ok(match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path,
        })
    }

    #[cfg(feature = "http")]
    async fn fetch(&self, url: &str) -> Result<String, LoadError> {
        let http_error = |e: reqwest::Error| LoadError::Http {
            url: url.to_string(),
            message: e.to_string(),
        };
        reqwest::get(url)
            .await
            .and_then(|r| r.error_for_status())
            .map_err(http_error)?
            .text()
            .await
            .map_err(http_error)
    }

    #[cfg(not(feature = "http"))]
    async fn fetch(&self, url: &str) -> Result<String, LoadError> {
        Err(LoadError::RemoteUnsupported(url.to_string()))
    }
}

#[async_trait]
impl Loader for PathLoader {
    async fn load(&self, identifier: &str) -> Result<OpenApiDocument, LoadError> {
        if identifier.starts_with("http://") || identifier.starts_with("https://") {
            debug!("Fetching OpenAPI document {}", identifier);
            let content = self.fetch(identifier).await?;
            return parse_document(&content, identifier);
        }

        let path = self.resolve_path(identifier)?;
        debug!("Reading OpenAPI document {:?}", path);
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| LoadError::Io {
                path: path.clone(),
                source,
            })?;
        parse_document(&content, identifier)
    }
}

/// Loads the document bundled with a versioned API-client package.
///
/// `module@version` is located in the module cache, then the document is read
/// from a conventional path inside the package.
#[derive(Debug, Clone)]
pub struct PackageLoader {
    cache_dir: PathBuf,
    document: String,
}

impl PackageLoader {
    /// Use the module cache from `GOMODCACHE`, `GOPATH/pkg/mod` or `~/go/pkg/mod`
    pub fn from_env() -> Result<Self, LoadError> {
        let cache_dir = std::env::var_os("GOMODCACHE")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("GOPATH")
                    .filter(|v| !v.is_empty())
                    .map(|p| PathBuf::from(p).join("pkg").join("mod"))
            })
            .or_else(|| dirs::home_dir().map(|home| home.join("go").join("pkg").join("mod")))
            .ok_or(LoadError::NoModuleCache)?;

        Ok(Self::with_cache_dir(cache_dir))
    }

    pub fn with_cache_dir(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            document: PACKAGE_DOCUMENT.to_string(),
        }
    }

    /// Override the document path inside the package
    pub fn with_document(mut self, document: impl Into<String>) -> Self {
        self.document = document.into();
        self
    }

    /// Install directory of a `module@version` reference
    pub fn package_dir(&self, package: &str) -> Result<PathBuf, LoadError> {
        let (module, version) = package
            .split_once('@')
            .filter(|(m, v)| !m.is_empty() && !v.is_empty())
            .ok_or_else(|| LoadError::InvalidPackage(package.to_string()))?;

        let dir = self
            .cache_dir
            .join(format!("{}@{}", escape_module_path(module), escape_module_path(version)));

        if !dir.is_dir() {
            return Err(LoadError::PackageNotFound {
                package: package.to_string(),
                searched: self.cache_dir.clone(),
            });
        }
        Ok(dir)
    }

    fn document_path(&self, package_dir: &Path) -> PathBuf {
        package_dir.join(&self.document)
    }
}

#[async_trait]
impl Loader for PackageLoader {
    async fn load(&self, identifier: &str) -> Result<OpenApiDocument, LoadError> {
        let path = self.document_path(&self.package_dir(identifier)?);
        debug!("Reading OpenAPI document of {} from {:?}", identifier, path);

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| LoadError::Io {
                path: path.clone(),
                source,
            })?;
        parse_document(&content, identifier)
    }
}

/// Module cache escaping: every uppercase letter becomes `!` plus its lowercase form
fn escape_module_path(path: &str) -> String {
    let mut escaped = String::with_capacity(path.len());
    for c in path.chars() {
        if c.is_ascii_uppercase() {
            escaped.push('!');
            escaped.push(c.to_ascii_lowercase());
        } else {
            escaped.push(c);
        }
    }
    escaped
}
