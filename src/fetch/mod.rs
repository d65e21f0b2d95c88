//! Download resolved assets and unpack them into a scratch directory

pub mod decompress;

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use tempfile::TempDir;

use crate::error::{InstallerError, Result, fs as fs_error};
use crate::github::{self, Asset, GithubClient};
use crate::platform::Platform;
use crate::progress::DownloadProgress;
use crate::resolver::{self, MatchCriteria};
use crate::temp;

pub use decompress::Compression;

const CHUNK_SIZE: usize = 8192;

/// An unpacked asset; the scratch directory lives as long as this value
pub struct Fetched {
    _dir: TempDir,
    pub asset: Asset,
    pub path: PathBuf,
}

/// Resolve, download and unpack a release asset.
///
/// `compression` of `None` detects it from the asset name; a name that
/// clearly names another codec overrides the given one.
pub fn fetch(
    client: &GithubClient,
    owner: &str,
    repo: &str,
    criteria: &MatchCriteria,
    platform: &Platform,
    compression: Option<Compression>,
    show_progress: bool,
) -> Result<Fetched> {
    let asset = resolver::resolve(client, owner, repo, criteria, platform)?;
    info!("Selected asset {}", asset.name);

    let dir = temp::scratch_dir("download")?;
    let archive = download(client, &asset, dir.path(), show_progress)?;
    let detected = Compression::detect(&asset.name);
    let compression = match compression {
        // The asset name wins when it names a different codec
        Some(expected) if detected != Compression::Plain && detected != expected => {
            debug!("{} looks {detected:?}, not {expected:?}", asset.name);
            detected
        }
        Some(expected) => expected,
        None => detected,
    };
    let path = decompress::unpack(
        &archive,
        &asset.name,
        compression,
        &dir.path().join("unpacked"),
    )?;

    Ok(Fetched {
        _dir: dir,
        asset,
        path,
    })
}

/// Stream `asset` into `dir`, retrying per the client's policy
pub fn download(
    client: &GithubClient,
    asset: &Asset,
    dir: &Path,
    show_progress: bool,
) -> Result<PathBuf> {
    let dest = dir.join(&asset.name);
    client
        .retry_policy()
        .run(&asset.download_url, github::is_retryable, || {
            stream_to_file(client, asset, &dest, show_progress)
        })?;
    info!("Downloaded {} to {}", asset.name, dest.display());
    Ok(dest)
}

fn stream_to_file(
    client: &GithubClient,
    asset: &Asset,
    dest: &Path,
    show_progress: bool,
) -> Result<()> {
    let mut body = client.open_asset(asset)?;
    let progress = DownloadProgress::new(&asset.name, body.len, show_progress);

    let file = File::create(dest).map_err(|e| fs_error::write_failed(dest, e))?;
    let mut writer = BufWriter::new(file);
    let mut buffer = [0u8; CHUNK_SIZE];
    loop {
        let read = match body.reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                progress.abandon();
                return Err(InstallerError::HttpTransport {
                    url: asset.download_url.clone(),
                    reason: e.to_string(),
                });
            }
        };
        writer
            .write_all(&buffer[..read])
            .map_err(|e| fs_error::write_failed(dest, e))?;
        progress.inc(read as u64);
    }
    writer.flush().map_err(|e| fs_error::write_failed(dest, e))?;
    progress.finish();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::DownloadConfig;
    use crate::platform::Libc;
    use mockito::Server;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut enc = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    #[test]
    fn test_fetch_resolves_downloads_and_unpacks() {
        let mut server = Server::new();
        let base = server.url();
        let release = format!(
            r#"{{"tag_name": "v1.0.0", "assets": [
                {{"name": "tool-linux-x86_64.gz", "browser_download_url": "{base}/dl/linux"}},
                {{"name": "tool-darwin-arm64.gz", "browser_download_url": "{base}/dl/darwin"}},
                {{"name": "tool-linux-x86_64.sha256", "browser_download_url": "{base}/dl/sum"}}
            ]}}"#
        );
        server
            .mock("GET", "/repos/owner/tool/releases/latest")
            .with_status(200)
            .with_body(release)
            .create();
        let download = server
            .mock("GET", "/dl/linux")
            .match_header("authorization", "Bearer t0ken")
            .with_status(200)
            .with_body(gzip(b"tool-binary"))
            .create();

        let client = GithubClient::new(DownloadConfig {
            token: Some("t0ken".to_string()),
            api_base: base.clone(),
            ..DownloadConfig::default()
        });
        let criteria = MatchCriteria {
            not_endswith: vec!["sha256".to_string()],
            ..MatchCriteria::system_machine()
        };
        let platform = Platform::from_parts("linux", "x86_64", Some(Libc::Gnu)).unwrap();

        let fetched = fetch(&client, "owner", "tool", &criteria, &platform, None, false).unwrap();
        download.assert();
        assert_eq!(fetched.asset.name, "tool-linux-x86_64.gz");
        assert_eq!(std::fs::read(&fetched.path).unwrap(), b"tool-binary");
    }

    #[test]
    fn test_download_failure_status() {
        let mut server = Server::new();
        server.mock("GET", "/dl/gone").with_status(410).create();
        let client = GithubClient::new(DownloadConfig::default());
        let asset = Asset {
            name: "gone".to_string(),
            download_url: format!("{}/dl/gone", server.url()),
        };
        let dir = tempfile::TempDir::new().unwrap();
        let err = download(&client, &asset, dir.path(), false).unwrap_err();
        assert!(matches!(err, InstallerError::HttpStatus { status: 410, .. }));
    }
}
