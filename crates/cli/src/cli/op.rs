use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use acl_backend::{
    AclBackend, BackendConfig, BackendError, ConfigError, ElasticsearchClient,
    ElasticsearchError, Refresh,
};

pub const DEFAULT_URL: &str = "http://localhost:9200";

pub type EsBackend = AclBackend<ElasticsearchClient>;
pub type EsBackendError = BackendError<ElasticsearchError>;

/// Contents of the `--config` file: backend settings plus where to find
/// the cluster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub url: Option<Url>,
    #[serde(flatten)]
    pub backend: BackendConfig,
}

/// Command-line settings; each one that is set wins over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub url: Option<Url>,
    pub index: Option<String>,
    pub prefix: Option<String>,
    pub refresh: Option<Refresh>,
    pub page_size: Option<usize>,
}

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("failed to read config {0}: {1}")]
    Read(PathBuf, #[source] std::io::Error),
    #[error("invalid config {0}: {1}")]
    Parse(PathBuf, #[source] toml::de::Error),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("invalid backend settings: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to create Elasticsearch client: {0}")]
    Client(#[from] ElasticsearchError),
}

impl CliConfig {
    pub fn load(path: &Path) -> Result<Self, ContextError> {
        let contents =
            fs::read_to_string(path).map_err(|e| ContextError::Read(path.to_path_buf(), e))?;
        toml::from_str(&contents).map_err(|e| ContextError::Parse(path.to_path_buf(), e))
    }
}

/// Resolve the settings to run with.
///
/// Priority: explicit flag > config file > built-in default.
pub fn resolve_config(
    config_path: Option<&Path>,
    overrides: Overrides,
) -> Result<(Url, BackendConfig), ContextError> {
    let file = match config_path {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };

    let url = match overrides.url.or(file.url) {
        Some(url) => url,
        None => Url::parse(DEFAULT_URL)?,
    };

    let mut config = file.backend;
    if let Some(index) = overrides.index {
        config.index = index;
    }
    if let Some(prefix) = overrides.prefix {
        config.prefix = prefix;
    }
    if let Some(refresh) = overrides.refresh {
        config.refresh = refresh;
    }
    if let Some(page_size) = overrides.page_size {
        config.page_size = page_size;
    }

    Ok((url, config))
}

#[derive(Debug, Clone)]
pub struct OpContext {
    pub backend: EsBackend,
}

impl OpContext {
    pub fn new(url: &Url, config: BackendConfig) -> Result<Self, ContextError> {
        let client = ElasticsearchClient::new(url)?;
        let backend = AclBackend::builder().client(client).config(config).build()?;
        Ok(Self { backend })
    }

    pub fn client(&self) -> &ElasticsearchClient {
        self.backend.store()
    }
}

#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: Error + Send + Sync + 'static;
    type Output;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $type:ty)),* $(,)?) => {
        #[derive(Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($type),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$type as $crate::cli::op::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$type as $crate::cli::op::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::cli::op::Op for Command {
            type Output = OpOutput;
            type Error = OpError;

            async fn execute(&self, ctx: &$crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => {
                            op.execute(ctx).await
                                .map(OpOutput::$variant)
                                .map_err(OpError::$variant)
                        },
                    )*
                }
            }
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        OpOutput::$variant(output) => write!(f, "{}", output),
                    )*
                }
            }
        }
    };
}
