//! Filesystem storage for generated report files.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ReportStorageError {
    #[error("invalid report path")]
    InvalidPath,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug)]
pub struct ReportStorage {
    root: PathBuf,
}

impl ReportStorage {
    /// Initialise storage rooted at the provided directory, creating it if necessary.
    pub fn new(root: PathBuf) -> Result<Self, ReportStorageError> {
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn file_name_for(report_id: Uuid) -> String {
        format!("{report_id}.xlsx")
    }

    pub fn absolute_path(&self, file_name: &str) -> Result<PathBuf, ReportStorageError> {
        let relative = Path::new(file_name);
        if relative.is_absolute()
            || relative
                .components()
                .any(|component| matches!(component, Component::ParentDir | Component::Prefix(_)))
        {
            return Err(ReportStorageError::InvalidPath);
        }

        Ok(self.root.join(relative))
    }

    pub async fn read(&self, file_name: &str) -> Result<Vec<u8>, ReportStorageError> {
        let absolute = self.absolute_path(file_name)?;
        Ok(fs::read(absolute).await?)
    }
}
