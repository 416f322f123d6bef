//! Reading reference images and writing exports

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use aura_artifact::{Artifact, Payload, ReferenceImage};

/// MIME type from a file extension
pub(crate) fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}

pub(crate) async fn read_reference(path: &Path) -> Result<ReferenceImage> {
    let Some(mime) = mime_for(path) else {
        bail!("{}: unsupported image type (png, jpg, webp, heic)", path.display());
    };
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))?;
    ReferenceImage::new(bytes, mime).with_context(|| format!("{} is not a usable reference", path.display()))
}

pub(crate) async fn read_optional(path: Option<&PathBuf>) -> Result<Option<ReferenceImage>> {
    match path {
        Some(path) => Ok(Some(read_reference(path).await?)),
        None => Ok(None),
    }
}

pub(crate) async fn read_all<'a>(paths: impl IntoIterator<Item = &'a PathBuf>) -> Result<Vec<ReferenceImage>> {
    let mut refs = Vec::new();
    for path in paths {
        refs.push(read_reference(path).await?);
    }
    Ok(refs)
}

/// Write an artifact to `out`: raw image bytes, or the copy bundle as JSON
pub(crate) async fn export(artifact: &Artifact, out: &Path) -> Result<()> {
    let bytes = match artifact.payload() {
        Payload::Image(image) => image.bytes.clone(),
        Payload::Copy(bundle) => serde_json::to_vec_pretty(bundle)?,
    };
    tokio::fs::write(out, bytes)
        .await
        .with_context(|| format!("cannot write {}", out.display()))
}
