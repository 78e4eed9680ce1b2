// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{Result, SyncError};
use crate::utils::Validator;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub project: ProjectConfig,
    pub workspace: WorkspaceConfig,
    pub git: GitConfig,
    pub repositories: Vec<RepositoryDescriptor>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProjectConfig {
    pub name: String,
    pub organization: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkspaceConfig {
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitConfig {
    pub host: String,
    pub ssh_user: String,
    pub max_concurrent: usize,
    /// Substring scanned for (case-insensitively) in the stderr of
    /// `ssh -T` to detect a successful authentication. The Git host
    /// prints this on success while still exiting non-zero, so the
    /// exit status alone cannot be used.
    pub auth_marker: String,
}

/// One repository to synchronize. Everything besides `name` is opaque
/// provisioning metadata carried through to the `--debug` dump verbatim.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RepositoryDescriptor {
    pub name: String,
    #[serde(flatten, default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl RepositoryDescriptor {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            metadata: serde_json::Map::new(),
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder.add_source(config::File::from(Path::new("config/default.toml")));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("WORKSPACE_INIT")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| SyncError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| SyncError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            project: ProjectConfig {
                name: "gcp-kubernetes".to_string(),
                organization: "HappyPathway".to_string(),
            },
            workspace: WorkspaceConfig {
                base_dir: PathBuf::from(".."),
            },
            git: GitConfig {
                host: "github.com".to_string(),
                ssh_user: "git".to_string(),
                max_concurrent: 5,
                auth_marker: "successfully authenticated".to_string(),
            },
            repositories: vec![
                RepositoryDescriptor::named("terraform-gcp-compute"),
                RepositoryDescriptor::named("terraform-gcp-networking"),
                RepositoryDescriptor::named("terraform-gcp-storage"),
                RepositoryDescriptor::named("terraform-gcp-monitoring"),
                RepositoryDescriptor::named("terraform-gcp-security"),
                RepositoryDescriptor::named("gcp-deployment"),
            ],
        }
    }

    /// Expected `origin` URL for a repository in this organization.
    pub fn remote_url(&self, repo_name: &str) -> String {
        format!(
            "{}@{}:{}/{}.git",
            self.git.ssh_user, self.git.host, self.project.organization, repo_name
        )
    }

    /// Clone/pull target directory for a repository.
    pub fn repo_path(&self, repo_name: &str) -> PathBuf {
        self.workspace.base_dir.join(repo_name)
    }

    pub fn validate(&self) -> Result<()> {
        Validator::validate_organization(&self.project.organization)?;
        Validator::validate_host(&self.git.host)?;

        if self.git.max_concurrent == 0 {
            return Err(SyncError::Config(
                "git.max_concurrent must be greater than 0".to_string(),
            ));
        }

        for repo in &self.repositories {
            Validator::validate_repo_name(&repo.name)?;
        }

        Ok(())
    }
}
