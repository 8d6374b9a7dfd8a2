//! Loading of external assets: raw files, textures, HDR environment maps and
//! glTF models.
//!
//! Natively, paths resolve against the asset root, which is the
//! `REALISTIC_RENDER_ASSETS` environment variable or `./static`. In the browser
//! they are fetched relative to `<origin>/static/`. A leading `/` is ignored in
//! both cases so paths can be written the way a web server would see them.

pub mod hdr;
pub mod model;
pub mod texture;

pub use hdr::RgbeLoader;
pub use model::GltfLoader;
pub use texture::TextureLoader;

/// Environment variable overriding the native asset root.
pub const ASSET_ROOT_ENV: &str = "REALISTIC_RENDER_ASSETS";
pub const DEFAULT_ASSET_ROOT: &str = "./static";

#[cfg(not(target_arch = "wasm32"))]
pub fn asset_root() -> std::path::PathBuf {
    std::env::var_os(ASSET_ROOT_ENV)
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|| std::path::PathBuf::from(DEFAULT_ASSET_ROOT))
}

#[cfg(not(target_arch = "wasm32"))]
pub fn asset_path(file_name: &str) -> std::path::PathBuf {
    asset_root().join(file_name.trim_start_matches('/'))
}

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let origin = window
        .location()
        .origin()
        .map_err(|_| anyhow::anyhow!("page origin is not available"))?;
    let base = reqwest::Url::parse(&format!("{}/static/", origin))?;
    Ok(base.join(file_name.trim_start_matches('/'))?)
}

pub async fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(file_name)?;
        reqwest::get(url)
            .await?
            .error_for_status()?
            .bytes()
            .await?
            .to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        let path = asset_path(file_name);
        tokio::fs::read(&path)
            .await
            .map_err(|e| anyhow::anyhow!("could not read {}: {e}", path.display()))?
    };

    Ok(data)
}

/// File extension of `file_name`, used as an image format hint.
pub(crate) fn extension(file_name: &str) -> Option<&str> {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
}
