use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use uuid::Uuid;

use crate::dto::orders::ProofUpload;

/// URL prefix under which stored proofs are served.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Where payment proofs go. Returns the URI recorded on the order.
#[async_trait]
pub trait ProofStore: Send + Sync {
    async fn store(&self, upload: &ProofUpload) -> anyhow::Result<String>;

    /// Removes a previously stored proof; used when the order that referenced it never committed.
    async fn discard(&self, uri: &str) -> anyhow::Result<()>;
}

pub struct LocalProofStore {
    root: PathBuf,
}

impl LocalProofStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

/// File extension from the declared content type, then the client file name.
fn extension_for(upload: &ProofUpload) -> &'static str {
    let from_type = match upload.content_type.as_deref() {
        Some("image/png") => Some("png"),
        Some("image/jpeg") | Some("image/jpg") => Some("jpg"),
        Some("image/webp") => Some("webp"),
        Some("image/gif") => Some("gif"),
        _ => None,
    };
    if let Some(ext) = from_type {
        return ext;
    }
    let lower = upload
        .file_name
        .as_deref()
        .unwrap_or_default()
        .to_ascii_lowercase();
    if lower.ends_with(".png") {
        "png"
    } else if lower.ends_with(".webp") {
        "webp"
    } else if lower.ends_with(".gif") {
        "gif"
    } else {
        "jpg"
    }
}

#[async_trait]
impl ProofStore for LocalProofStore {
    async fn store(&self, upload: &ProofUpload) -> anyhow::Result<String> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("creating upload dir {}", self.root.display()))?;

        let name = format!("proof-{}.{}", Uuid::new_v4(), extension_for(upload));
        let path = self.root.join(&name);
        tokio::fs::write(&path, &upload.bytes)
            .await
            .with_context(|| format!("writing {}", path.display()))?;

        tracing::debug!(path = %path.display(), bytes = upload.bytes.len(), "payment proof stored");
        Ok(format!("{PUBLIC_PREFIX}/{name}"))
    }

    async fn discard(&self, uri: &str) -> anyhow::Result<()> {
        let Some(name) = uri.strip_prefix(&format!("{PUBLIC_PREFIX}/")) else {
            return Ok(());
        };
        // Only plain file names produced by `store` are ever removed.
        if name.contains('/') || name.contains("..") {
            return Ok(());
        }
        tokio::fs::remove_file(self.root.join(name))
            .await
            .with_context(|| format!("removing {name}"))?;
        Ok(())
    }
}
