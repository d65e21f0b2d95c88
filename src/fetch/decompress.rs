//! Decompression and tar unpacking of downloaded assets

use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use log::debug;
use tar::Archive;
use xz2::read::XzDecoder;

use crate::error::{InstallerError, Result, fs as fs_error};

/// Stream compression applied to a release asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Plain,
    Gzip,
    Bzip2,
    Lzma,
}

impl Compression {
    /// Guess the compression from an asset file name
    pub fn detect(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.ends_with(".gz") || lower.ends_with(".tgz") {
            Compression::Gzip
        } else if lower.ends_with(".bz2") || lower.ends_with(".tbz") || lower.ends_with(".tbz2") {
            Compression::Bzip2
        } else if lower.ends_with(".xz") || lower.ends_with(".txz") || lower.ends_with(".lzma") {
            Compression::Lzma
        } else {
            Compression::Plain
        }
    }
}

/// Whether the decompressed stream of `name` is a tar archive
pub fn is_tar(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains(".tar")
        || lower.ends_with(".tgz")
        || lower.ends_with(".tbz")
        || lower.ends_with(".tbz2")
        || lower.ends_with(".txz")
}

/// Unpack `archive` (downloaded as `name`) into `out_dir`.
///
/// Returns the path to install from:
/// - plain assets are returned as-is;
/// - a compressed single file is decompressed next to its stem name;
/// - a tarball yields its only top-level entry, or `out_dir` when the
///   archive holds several entries.
pub fn unpack(
    archive: &Path,
    name: &str,
    compression: Compression,
    out_dir: &Path,
) -> Result<PathBuf> {
    if compression == Compression::Plain {
        return Ok(archive.to_path_buf());
    }

    let file = File::open(archive).map_err(|e| fs_error::read_failed(archive, e))?;
    let reader = BufReader::new(file);
    let decoder: Box<dyn Read> = match compression {
        Compression::Gzip => Box::new(GzDecoder::new(reader)),
        Compression::Bzip2 => Box::new(BzDecoder::new(reader)),
        Compression::Lzma => Box::new(XzDecoder::new(reader)),
        Compression::Plain => Box::new(reader),
    };

    fs::create_dir_all(out_dir).map_err(|e| fs_error::write_failed(out_dir, e))?;
    let failed = |e: io::Error| InstallerError::DecompressFailed {
        path: archive.display().to_string(),
        reason: e.to_string(),
    };

    if is_tar(name) {
        Archive::new(decoder).unpack(out_dir).map_err(failed)?;
        let result = single_entry(out_dir)?;
        debug!("Unpacked {name} to {}", result.display());
        Ok(result)
    } else {
        let dest = out_dir.join(stem_name(name));
        let mut out = File::create(&dest).map_err(|e| fs_error::write_failed(&dest, e))?;
        let mut decoder = decoder;
        io::copy(&mut decoder, &mut out).map_err(failed)?;
        debug!("Decompressed {name} to {}", dest.display());
        Ok(dest)
    }
}

/// The only entry of `dir`, or `dir` itself when it holds zero or several
fn single_entry(dir: &Path) -> Result<PathBuf> {
    let mut entries = fs::read_dir(dir)
        .map_err(|e| fs_error::read_failed(dir, e))?
        .collect::<io::Result<Vec<_>>>()
        .map_err(|e| fs_error::read_failed(dir, e))?;
    if entries.len() == 1 {
        if let Some(entry) = entries.pop() {
            return Ok(entry.path());
        }
    }
    Ok(dir.to_path_buf())
}

fn stem_name(name: &str) -> &str {
    [".gz", ".bz2", ".xz", ".lzma"]
        .iter()
        .find_map(|ext| name.strip_suffix(ext))
        .filter(|stem| !stem.is_empty())
        .unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn tar_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (path, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o755);
            header.set_cksum();
            builder.append_data(&mut header, path, data.as_bytes()).unwrap();
        }
        builder.into_inner().unwrap()
    }

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut enc = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    fn bzip2(data: &[u8]) -> Vec<u8> {
        let mut enc = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    fn xz(data: &[u8]) -> Vec<u8> {
        let mut enc = xz2::write::XzEncoder::new(Vec::new(), 6);
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    fn write(temp: &TempDir, name: &str, data: &[u8]) -> PathBuf {
        let path = temp.path().join(name);
        fs::write(&path, data).unwrap();
        path
    }

    #[test]
    fn test_detect() {
        assert_eq!(Compression::detect("fd-v10-x86_64.tar.gz"), Compression::Gzip);
        assert_eq!(Compression::detect("tool.tgz"), Compression::Gzip);
        assert_eq!(Compression::detect("restic_0.17.3_linux_amd64.bz2"), Compression::Bzip2);
        assert_eq!(Compression::detect("watchexec.tar.xz"), Compression::Lzma);
        assert_eq!(Compression::detect("sops-v3.9.0.linux.amd64"), Compression::Plain);
    }

    #[test]
    fn test_is_tar() {
        assert!(is_tar("age-v1.2.0-linux-amd64.tar.gz"));
        assert!(is_tar("tool.tgz"));
        assert!(!is_tar("restic_0.17.3_linux_amd64.bz2"));
    }

    #[test]
    fn test_plain_returns_download() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "jq-linux-amd64", b"#!jq");
        let out =
            unpack(&path, "jq-linux-amd64", Compression::Plain, &temp.path().join("out")).unwrap();
        assert_eq!(out, path);
    }

    #[test]
    fn test_gzip_tarball_single_directory() {
        let temp = TempDir::new().unwrap();
        let archive = gzip(&tar_bytes(&[
            ("bat-v0.24.0/bat", "bat-binary"),
            ("bat-v0.24.0/README.md", "readme"),
        ]));
        let path = write(&temp, "bat.tar.gz", &archive);
        let out_dir = temp.path().join("out");

        let out = unpack(&path, "bat.tar.gz", Compression::Gzip, &out_dir).unwrap();
        assert_eq!(out, out_dir.join("bat-v0.24.0"));
        assert_eq!(fs::read(out.join("bat")).unwrap(), b"bat-binary");
    }

    #[test]
    fn test_gzip_tarball_several_entries_returns_dir() {
        let temp = TempDir::new().unwrap();
        let archive = gzip(&tar_bytes(&[
            ("age/age", "a"),
            ("age/age-keygen", "k"),
            ("LICENSE", "l"),
        ]));
        let path = write(&temp, "age.tar.gz", &archive);
        let out_dir = temp.path().join("out");

        let out = unpack(&path, "age.tar.gz", Compression::Gzip, &out_dir).unwrap();
        assert_eq!(out, out_dir);
        assert!(out_dir.join("age/age-keygen").is_file());
    }

    #[test]
    fn test_bzip2_single_file() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "restic_linux_amd64.bz2", &bzip2(b"restic-binary"));
        let out = unpack(
            &path,
            "restic_linux_amd64.bz2",
            Compression::Bzip2,
            &temp.path().join("out"),
        )
        .unwrap();
        assert_eq!(out.file_name().unwrap(), "restic_linux_amd64");
        assert_eq!(fs::read(out).unwrap(), b"restic-binary");
    }

    #[test]
    fn test_xz_tarball() {
        let temp = TempDir::new().unwrap();
        let archive = xz(&tar_bytes(&[("watchexec-2.1.2/watchexec", "wx")]));
        let path = write(&temp, "watchexec.tar.xz", &archive);
        let out =
            unpack(&path, "watchexec.tar.xz", Compression::Lzma, &temp.path().join("out")).unwrap();
        assert_eq!(fs::read(out.join("watchexec")).unwrap(), b"wx");
    }

    #[test]
    fn test_corrupt_archive() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "broken.tar.gz", b"not gzip at all");
        let err = unpack(&path, "broken.tar.gz", Compression::Gzip, &temp.path().join("out"))
            .unwrap_err();
        assert!(matches!(err, InstallerError::DecompressFailed { .. }));
    }
}
