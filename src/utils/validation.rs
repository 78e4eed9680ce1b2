// file: src/utils/validation.rs
// description: data validation utilities and helpers
// reference: input validation patterns

use crate::error::{Result, SyncError};

pub struct Validator;

impl Validator {
    /// Repository names become both a filesystem path segment and a
    /// `git clone` argv element, so path separators, parent references,
    /// and option-looking names are all rejected.
    pub fn validate_repo_name(name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(SyncError::Validation(
                "Repository name cannot be empty".to_string(),
            ));
        }

        if name.contains('/') || name.contains('\\') {
            return Err(SyncError::Validation(format!(
                "Repository name cannot contain path separators: {}",
                name
            )));
        }

        if name == "." || name == ".." {
            return Err(SyncError::Validation(format!(
                "Repository name cannot be a directory reference: {}",
                name
            )));
        }

        if name.starts_with('-') {
            return Err(SyncError::Validation(format!(
                "Repository name cannot start with a dash: {}",
                name
            )));
        }

        Ok(())
    }

    pub fn validate_organization(org: &str) -> Result<()> {
        if org.trim().is_empty() {
            return Err(SyncError::Validation(
                "Organization cannot be empty".to_string(),
            ));
        }

        if org.contains('/') || org.contains(':') {
            return Err(SyncError::Validation(format!(
                "Organization cannot contain '/' or ':': {}",
                org
            )));
        }

        Ok(())
    }

    pub fn validate_host(host: &str) -> Result<()> {
        if host.trim().is_empty() {
            return Err(SyncError::Validation("Git host cannot be empty".to_string()));
        }

        if host.contains('@') || host.contains(':') {
            return Err(SyncError::Validation(format!(
                "Git host must be a bare hostname: {}",
                host
            )));
        }

        Ok(())
    }
}
