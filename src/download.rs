//! Downloads of gzip-compressed third party executables.

use anyhow::{Context, Result, bail};
use flate2::read::GzDecoder;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// User-Agent header sent with download requests.
const USER_AGENT: &str = "lammps-win-installer";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

fn build_http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")
}

/// Fetch `url` into memory.
pub fn fetch_bytes(url: &str) -> Result<Vec<u8>> {
    let client = build_http_client()?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime for HTTP request")?;

    let bytes = runtime.block_on(async move {
        let response = client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to connect to download server for {url}"))?;

        let status = response.status();
        if !status.is_success() {
            bail!("Download of {url} failed: HTTP {status}");
        }

        response
            .bytes()
            .await
            .with_context(|| format!("Failed to read response body for {url}"))
    })?;

    Ok(bytes.to_vec())
}

/// Decompress a gzip stream into `dest`.
pub fn gunzip_to(compressed: &[u8], dest: &Path) -> Result<()> {
    let mut decoder = GzDecoder::new(compressed);
    let mut out = std::fs::File::create(dest)
        .with_context(|| format!("Failed to create {}", dest.display()))?;
    io::copy(&mut decoder, &mut out)
        .with_context(|| format!("Failed to decompress into {}", dest.display()))?;
    Ok(())
}

/// Download `url` (a `.gz` file) and store the decompressed payload as
/// `dest_dir/name`. Returns the written path.
pub fn fetch_gunzipped(url: &str, dest_dir: &Path, name: &str) -> Result<PathBuf> {
    let bytes = fetch_bytes(url)?;
    let dest = dest_dir.join(name);
    gunzip_to(&bytes, &dest)?;
    Ok(dest)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
