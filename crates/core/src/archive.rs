//! Toolkit source archive retrieval.
//!
//! The archive is fetched once (HTTP GET, no retry) and scanned in memory for the single
//! regular file whose path ends with the configured suffix.
//!
//! # Member selection
//!
//! Exactly one member must match. No match is `MissingArtifact`; several matches are
//! `AmbiguousArtifact` listing every matching path, so a repackaged archive is noticed rather
//! than silently resolved to whichever copy happened to come last.

use crate::{ConformanceError, ConformanceResult};
use flate2::read::GzDecoder;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tar::Archive;

/// Somewhere a `.tar.gz` archive can be obtained from, given its download URL.
pub trait ArchiveSource {
    /// Return the raw (still compressed) archive bytes.
    fn fetch(&self, url: &str) -> ConformanceResult<Vec<u8>>;
}

/// Downloads archives over HTTP(S).
///
/// The client has no request timeout: a stalled download stalls the run.
#[derive(Debug, Clone)]
pub struct HttpArchiveSource {
    client: reqwest::blocking::Client,
}

impl HttpArchiveSource {
    /// # Errors
    ///
    /// Returns `ConformanceError::HttpClient` if the HTTP client cannot be initialised
    /// (for example when no TLS backend is available).
    pub fn new() -> ConformanceResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(None::<Duration>)
            .build()
            .map_err(ConformanceError::HttpClient)?;

        Ok(Self { client })
    }
}

impl ArchiveSource for HttpArchiveSource {
    fn fetch(&self, url: &str) -> ConformanceResult<Vec<u8>> {
        tracing::info!("Downloading {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|source| ConformanceError::Network {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConformanceError::HttpStatus {
                url: url.to_string(),
                status,
            });
        }

        let body = response
            .bytes()
            .map_err(|source| ConformanceError::Network {
                url: url.to_string(),
                source,
            })?;

        tracing::debug!("Downloaded {} bytes", body.len());
        Ok(body.to_vec())
    }
}

/// Reads an archive that is already on disk, ignoring the download URL.
///
/// Used for offline runs against a previously downloaded toolkit release.
#[derive(Debug, Clone)]
pub struct LocalArchiveSource {
    path: PathBuf,
}

impl LocalArchiveSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ArchiveSource for LocalArchiveSource {
    fn fetch(&self, url: &str) -> ConformanceResult<Vec<u8>> {
        tracing::info!("Using local archive {} instead of {}", self.path.display(), url);

        std::fs::read(&self.path).map_err(|source| ConformanceError::FileRead {
            path: self.path.clone(),
            source,
        })
    }
}

/// A single file extracted from the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveMember {
    /// Path of the member as recorded in the archive
    pub path: String,
    /// Uncompressed content
    pub content: Vec<u8>,
}

impl ArchiveMember {
    /// Readable stream over the member content.
    pub fn reader(&self) -> Cursor<&[u8]> {
        Cursor::new(self.content.as_slice())
    }
}

/// Locate the unique regular file in a gzip-compressed tar archive whose path ends with
/// `suffix`.
///
/// # Errors
///
/// - `CorruptArchive` if the gzip or tar framing cannot be read
/// - `MissingArtifact` if no regular file matches
/// - `AmbiguousArtifact` if more than one regular file matches
pub fn find_member(archive_bytes: &[u8], suffix: &str) -> ConformanceResult<ArchiveMember> {
    let mut archive = Archive::new(GzDecoder::new(archive_bytes));
    let entries = archive.entries().map_err(ConformanceError::CorruptArchive)?;

    let mut found: Vec<ArchiveMember> = Vec::new();
    for entry in entries {
        let mut entry = entry.map_err(ConformanceError::CorruptArchive)?;
        if !entry.header().entry_type().is_file() {
            continue;
        }

        let path = entry
            .path()
            .map_err(ConformanceError::CorruptArchive)?
            .to_string_lossy()
            .into_owned();
        if !path.ends_with(suffix) {
            continue;
        }

        let mut content = Vec::new();
        entry
            .read_to_end(&mut content)
            .map_err(ConformanceError::CorruptArchive)?;
        found.push(ArchiveMember { path, content });
    }

    match found.len() {
        0 => Err(ConformanceError::MissingArtifact {
            suffix: suffix.to_string(),
        }),
        1 => {
            let member = found.remove(0);
            tracing::debug!("Found {} ({} bytes)", member.path, member.content.len());
            Ok(member)
        }
        _ => Err(ConformanceError::AmbiguousArtifact {
            suffix: suffix.to_string(),
            matches: found.into_iter().map(|m| m.path).collect(),
        }),
    }
}

/// In-memory `.tar.gz` construction for tests.
#[cfg(test)]
pub(crate) mod test_support {
    use flate2::write::GzEncoder;
    use flate2::Compression;

    /// Build a gzip-compressed tar archive holding `files`, plus a directory entry for
    /// every `dirs` path.
    pub(crate) fn build_tar_gz(dirs: &[&str], files: &[(&str, &str)]) -> Vec<u8> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);

        for dir in dirs {
            let mut header = tar::Header::new_gnu();
            header.set_entry_type(tar::EntryType::Directory);
            header.set_size(0);
            header.set_mode(0o755);
            builder
                .append_data(&mut header, dir, std::io::empty())
                .expect("append directory");
        }

        for (path, data) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            builder
                .append_data(&mut header, path, data.as_bytes())
                .expect("append file");
        }

        builder
            .into_inner()
            .expect("finish tar")
            .finish()
            .expect("finish gzip")
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::build_tar_gz;
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread::JoinHandle;
    use tempfile::TempDir;

    const SUFFIX: &str = "dcmdata/include/dcmtk/dcmdata/dcuid.h";

    /// Answer a single request on a loopback port with `status` and `body`.
    ///
    /// Returns the base URL of the server and the handle of its thread.
    fn serve_once(status: &'static str, body: Vec<u8>) -> (String, JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            loop {
                line.clear();
                if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                    break;
                }
            }

            let head = format!(
                "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            stream.write_all(head.as_bytes()).unwrap();
            stream.write_all(&body).unwrap();
            stream.flush().unwrap();
        });

        (base_url, handle)
    }

    #[test]
    fn test_find_member_success() {
        let archive = build_tar_gz(
            &["dcmtk-3.6.8/dcmdata/include/dcmtk/dcmdata/"],
            &[
                ("dcmtk-3.6.8/README", "readme"),
                (
                    "dcmtk-3.6.8/dcmdata/include/dcmtk/dcmdata/dcuid.h",
                    "#define UID_A \"1\"\n",
                ),
                ("dcmtk-3.6.8/dcmdata/include/dcmtk/dcmdata/dcdict.h", "x"),
            ],
        );

        let member = find_member(&archive, SUFFIX).unwrap();

        assert_eq!(member.path, "dcmtk-3.6.8/dcmdata/include/dcmtk/dcmdata/dcuid.h");
        let first_line = member.reader().lines().next().unwrap().unwrap();
        assert_eq!(first_line, "#define UID_A \"1\"");
    }

    #[test]
    fn test_find_member_missing() {
        let archive = build_tar_gz(&[], &[("dcmtk-3.6.8/README", "readme")]);

        let err = find_member(&archive, SUFFIX).unwrap_err();

        assert!(matches!(err, ConformanceError::MissingArtifact { .. }));
        assert!(err.is_missing_artifact());
    }

    #[test]
    fn test_find_member_ignores_directories() {
        let archive = build_tar_gz(&["dcmtk/dcmdata/include/dcmtk/dcmdata/dcuid.h"], &[]);

        let err = find_member(&archive, SUFFIX).unwrap_err();
        assert!(matches!(err, ConformanceError::MissingArtifact { .. }));
    }

    #[test]
    fn test_find_member_ambiguous() {
        let archive = build_tar_gz(
            &[],
            &[
                ("a/dcmdata/include/dcmtk/dcmdata/dcuid.h", "first"),
                ("b/dcmdata/include/dcmtk/dcmdata/dcuid.h", "second"),
            ],
        );

        match find_member(&archive, SUFFIX) {
            Err(ConformanceError::AmbiguousArtifact { matches, .. }) => {
                assert_eq!(
                    matches,
                    vec![
                        "a/dcmdata/include/dcmtk/dcmdata/dcuid.h".to_string(),
                        "b/dcmdata/include/dcmtk/dcmdata/dcuid.h".to_string(),
                    ]
                );
            }
            other => panic!("Expected AmbiguousArtifact error, got {:?}", other),
        }
    }

    #[test]
    fn test_find_member_corrupt_archive() {
        let err = find_member(b"definitely not gzip", SUFFIX).unwrap_err();

        assert!(matches!(err, ConformanceError::CorruptArchive(_)));
        assert!(err.is_missing_artifact());
    }

    #[test]
    fn test_local_archive_source_reads_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("dcmtk-3.6.8.tar.gz");
        let archive = build_tar_gz(&[], &[("dcmtk/dcmdata/include/dcmtk/dcmdata/dcuid.h", "")]);
        std::fs::write(&path, &archive).unwrap();

        let source = LocalArchiveSource::new(&path);
        let bytes = source.fetch("https://example.invalid/dcmtk-3.6.8.tar.gz").unwrap();

        assert_eq!(bytes, archive);
        assert_eq!(source.path(), path.as_path());
    }

    #[test]
    fn test_local_archive_source_missing_file() {
        let temp = TempDir::new().unwrap();
        let source = LocalArchiveSource::new(temp.path().join("absent.tar.gz"));

        let err = source.fetch("https://example.invalid/x.tar.gz").unwrap_err();
        assert!(matches!(err, ConformanceError::FileRead { .. }));
    }

    #[test]
    fn test_http_archive_source_downloads_archive() {
        let archive = build_tar_gz(
            &[],
            &[("dcmtk-3.6.8/dcmdata/include/dcmtk/dcmdata/dcuid.h", "x")],
        );
        let (base_url, server) = serve_once("200 OK", archive.clone());

        let source = HttpArchiveSource::new().unwrap();
        let bytes = source.fetch(&format!("{base_url}/dcmtk-3.6.8.tar.gz")).unwrap();
        server.join().unwrap();

        assert_eq!(bytes, archive);
        assert!(find_member(&bytes, SUFFIX).is_ok());
    }

    #[test]
    fn test_http_archive_source_not_found() {
        let (base_url, server) = serve_once("404 Not Found", Vec::new());
        let url = format!("{base_url}/dcmtk-3.6.8.tar.gz");

        let err = HttpArchiveSource::new().unwrap().fetch(&url).unwrap_err();
        server.join().unwrap();

        match &err {
            ConformanceError::HttpStatus { url: failed, status } => {
                assert_eq!(failed, &url);
                assert_eq!(*status, reqwest::StatusCode::NOT_FOUND);
            }
            other => panic!("Expected HttpStatus error, got {:?}", other),
        }
        assert!(err.is_network());
        assert!(!err.is_missing_artifact());
    }

    #[test]
    fn test_http_archive_source_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = HttpArchiveSource::new()
            .unwrap()
            .fetch(&format!("http://{addr}/dcmtk-3.6.8.tar.gz"))
            .unwrap_err();

        assert!(matches!(err, ConformanceError::Network { .. }));
        assert!(err.is_network());
    }
}
