//! Template store: `{template_dir}/{id}.tex`.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template {id} not found ({})", path.display())]
    NotFound { id: u32, path: PathBuf },

    #[error("Failed to read template {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub fn template_path(template_dir: &Path, id: u32) -> PathBuf {
    template_dir.join(format!("{id}.tex"))
}

pub async fn load_template(template_dir: &Path, id: u32) -> Result<String, TemplateError> {
    let path = template_path(template_dir, id);
    match tokio::fs::read_to_string(&path).await {
        Ok(template) => {
            debug!("Loaded template {} ({} bytes)", path.display(), template.len());
            Ok(template)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(TemplateError::NotFound { id, path })
        }
        Err(source) => Err(TemplateError::Io { path, source }),
    }
}
