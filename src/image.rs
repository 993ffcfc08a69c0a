//! Image URL resolution.
//!
//! Cover images and avatars arrive either as plain URL strings (Markdown
//! front-matter, or CMS fields holding external links) or as CMS image
//! descriptors that reference an uploaded asset:
//!
//! ```json
//! { "_type": "image", "asset": { "_ref": "image-Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000-jpg" } }
//! ```
//!
//! Asset references are turned into CDN URLs of the form
//! `https://cdn.sanity.io/images/{project}/{dataset}/{id}-{w}x{h}.{ext}`,
//! optionally with `w`/`h` sizing parameters.

use serde::Deserialize;

use crate::config::CmsConfig;

const CDN_BASE: &str = "https://cdn.sanity.io/images";

/// An image reference as found in source records.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ImageRef {
    Url(String),
    Descriptor(ImageDescriptor),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ImageDescriptor {
    #[serde(default)]
    pub asset: Option<AssetRef>,
}

/// Either an unresolved `_ref` or an already-dereferenced asset with `url`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AssetRef {
    #[serde(rename = "_ref", default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Requested output size. Either dimension may be omitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageSize {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ImageSize {
    pub fn new(width: Option<u32>, height: Option<u32>) -> Self {
        Self { width, height }
    }
}

/// Resolves [`ImageRef`]s to URLs for one CMS project.
#[derive(Debug, Clone, Default)]
pub struct ImageResolver {
    project_id: Option<String>,
    dataset: String,
}

impl ImageResolver {
    pub fn new(cms: &CmsConfig) -> Self {
        let project_id = Some(cms.project_id.trim().to_string()).filter(|p| !p.is_empty());
        Self {
            project_id,
            dataset: cms.dataset.clone(),
        }
    }

    /// Resolve a plain string reference.
    pub fn resolve_str(&self, value: &str, size: ImageSize) -> Option<String> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        if value.starts_with("image-") {
            return self.asset_url(value, size);
        }
        Some(value.to_string())
    }

    pub fn resolve(&self, image: &ImageRef, size: ImageSize) -> Option<String> {
        match image {
            ImageRef::Url(value) => self.resolve_str(value, size),
            ImageRef::Descriptor(descriptor) => {
                let asset = descriptor.asset.as_ref()?;
                if let Some(url) = asset.url.as_deref().filter(|u| !u.trim().is_empty()) {
                    return Some(with_size(url.trim().to_string(), size));
                }
                asset
                    .reference
                    .as_deref()
                    .and_then(|r| self.asset_url(r, size))
            }
        }
    }

    /// Build a CDN URL from an `image-{id}-{w}x{h}-{ext}` reference. Returns
    /// `None` when the reference is malformed or no project is configured.
    fn asset_url(&self, reference: &str, size: ImageSize) -> Option<String> {
        let project_id = self.project_id.as_deref()?;
        let rest = reference.strip_prefix("image-")?;
        let (rest, ext) = rest.rsplit_once('-')?;
        let (id, dims) = rest.rsplit_once('-')?;
        let (w, h) = dims.split_once('x')?;
        if id.is_empty() || ext.is_empty() || w.parse::<u32>().is_err() || h.parse::<u32>().is_err()
        {
            return None;
        }

        let url = format!(
            "{}/{}/{}/{}-{}.{}",
            CDN_BASE, project_id, self.dataset, id, dims, ext
        );
        Some(with_size(url, size))
    }
}

fn with_size(mut url: String, size: ImageSize) -> String {
    let mut params = Vec::new();
    if let Some(w) = size.width {
        params.push(format!("w={}", w));
    }
    if let Some(h) = size.height {
        params.push(format!("h={}", h));
    }
    if params.is_empty() {
        return url;
    }
    url.push(if url.contains('?') { '&' } else { '?' });
    url.push_str(&params.join("&"));
    url
}
