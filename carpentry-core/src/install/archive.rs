//! Archive readers for downloaded tool packages.
//!
//! Both formats implement [`ArchiveReader`]: open an in-memory payload, list its
//! members, and extract a single member into a directory. Opening reads the
//! whole member table, so a corrupt or truncated payload fails before anything
//! is written to disk.

use std::fs::{self, File};
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};

use super::fetcher::DownloadedArtifact;
use super::normalize::split_components;
use crate::error::{InstallError, Result};

// ============================================================================
// Members
// ============================================================================

/// What kind of filesystem object a member describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    File,
    Directory,
    /// Symlink or hardlink. Never materialized.
    Link,
    /// Device nodes, FIFOs and other special entries.
    Other,
}

/// One entry inside an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveMember {
    /// Position in the archive's own member table.
    pub index: usize,
    /// Member path as stored, or as rewritten by the normalizer.
    pub path: String,
    pub kind: MemberKind,
    pub size: u64,
    /// Unix mode bits, when the archive records them.
    pub mode: Option<u32>,
}

/// Read access to an archive held in memory.
pub trait ArchiveReader: Sized {
    /// Parses the payload and indexes every member.
    fn open(artifact: DownloadedArtifact) -> Result<Self>;

    /// Members in archive order.
    fn members(&self) -> &[ArchiveMember];

    /// Writes `member` below `dest_dir` at `member.path`.
    fn extract_member(&mut self, member: &ArchiveMember, dest_dir: &Path) -> Result<()>;
}

/// Resolves a member path under `dest_dir`, refusing anything that could escape it.
pub fn member_destination(dest_dir: &Path, path: &str) -> Option<PathBuf> {
    if path.starts_with('/') || path.starts_with('\\') {
        return None;
    }

    let components: Vec<&str> = split_components(path)
        .into_iter()
        .filter(|c| *c != ".")
        .collect();
    if components.is_empty()
        || components
            .iter()
            .any(|c| *c == ".." || c.contains(':'))
    {
        return None;
    }

    Some(
        components
            .into_iter()
            .fold(dest_dir.to_path_buf(), |acc, c| acc.join(c)),
    )
}

fn checked_destination(url: &str, dest_dir: &Path, path: &str) -> Result<PathBuf> {
    member_destination(dest_dir, path)
        .ok_or_else(|| InstallError::archive(url, format!("unsafe member path: {}", path)))
}

fn write_file(dest_path: &Path, reader: &mut impl Read, url: &str) -> Result<()> {
    if let Some(parent) = dest_path.parent() {
        fs::create_dir_all(parent).map_err(|e| InstallError::fs(parent, e))?;
    }

    let mut outfile = File::create(dest_path).map_err(|e| InstallError::fs(dest_path, e))?;
    io::copy(reader, &mut outfile).map_err(|e| match e.kind() {
        io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => {
            InstallError::archive(url, format!("{}: {}", dest_path.display(), e))
        }
        _ => InstallError::fs(dest_path, e),
    })?;
    outfile.flush().map_err(|e| InstallError::fs(dest_path, e))?;
    Ok(())
}

// ============================================================================
// TAR
// ============================================================================

/// Compression wrapped around a tar payload, detected from magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TarCompression {
    None,
    Gzip,
    Bzip2,
    Xz,
}

impl TarCompression {
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.starts_with(&[0x1f, 0x8b]) {
            Self::Gzip
        } else if bytes.starts_with(b"BZh") {
            Self::Bzip2
        } else if bytes.starts_with(&[0xfd, b'7', b'z', b'X', b'Z', 0x00]) {
            Self::Xz
        } else {
            Self::None
        }
    }
}

/// Tar archive, decompressed into memory on open.
pub struct TarReader {
    url: String,
    data: Vec<u8>,
    members: Vec<ArchiveMember>,
    offsets: Vec<u64>,
}

impl TarReader {
    fn decompress(url: &str, bytes: Vec<u8>) -> Result<Vec<u8>> {
        let compression = TarCompression::detect(&bytes);
        let mut out = Vec::new();
        let result = match compression {
            TarCompression::None => return Ok(bytes),
            TarCompression::Gzip => {
                flate2::read::GzDecoder::new(bytes.as_slice()).read_to_end(&mut out)
            }
            TarCompression::Bzip2 => {
                bzip2::read::BzDecoder::new(bytes.as_slice()).read_to_end(&mut out)
            }
            TarCompression::Xz => xz2::read::XzDecoder::new(bytes.as_slice()).read_to_end(&mut out),
        };
        result.map_err(|e| InstallError::archive(url, format!("{:?} stream: {}", compression, e)))?;
        Ok(out)
    }
}

impl ArchiveReader for TarReader {
    fn open(artifact: DownloadedArtifact) -> Result<Self> {
        let url = artifact.url;
        let data = Self::decompress(&url, artifact.bytes)?;

        let mut members = Vec::new();
        let mut offsets = Vec::new();
        {
            let mut archive = tar::Archive::new(Cursor::new(data.as_slice()));
            let entries = archive
                .entries()
                .map_err(|e| InstallError::archive(&url, e))?;

            for (index, entry_result) in entries.enumerate() {
                let entry = entry_result.map_err(|e| InstallError::archive(&url, e))?;
                let header = entry.header();
                let entry_type = header.entry_type();

                let kind = if entry_type.is_symlink() || entry_type.is_hard_link() {
                    MemberKind::Link
                } else if entry_type.is_dir() {
                    MemberKind::Directory
                } else if entry_type.is_file() {
                    MemberKind::File
                } else {
                    MemberKind::Other
                };

                members.push(ArchiveMember {
                    index,
                    path: String::from_utf8_lossy(&entry.path_bytes()).into_owned(),
                    kind,
                    size: entry.size(),
                    mode: header.mode().ok(),
                });
                offsets.push(entry.raw_file_position());
            }
        }

        Ok(Self {
            url,
            data,
            members,
            offsets,
        })
    }

    fn members(&self) -> &[ArchiveMember] {
        &self.members
    }

    fn extract_member(&mut self, member: &ArchiveMember, dest_dir: &Path) -> Result<()> {
        let dest_path = checked_destination(&self.url, dest_dir, &member.path)?;

        match member.kind {
            MemberKind::Directory => {
                fs::create_dir_all(&dest_path).map_err(|e| InstallError::fs(&dest_path, e))?;
            }
            MemberKind::File => {
                let offset = self.offsets.get(member.index).copied().ok_or_else(|| {
                    InstallError::archive(&self.url, format!("no member #{}", member.index))
                })?;
                let start = offset as usize;
                let end = start.saturating_add(member.size as usize);
                let mut content = self.data.get(start..end).ok_or_else(|| {
                    InstallError::archive(
                        &self.url,
                        format!("member {} runs past the end of the archive", member.path),
                    )
                })?;
                write_file(&dest_path, &mut content, &self.url)?;

                #[cfg(unix)]
                set_unix_permissions(&dest_path, member.mode)?;
            }
            MemberKind::Link | MemberKind::Other => {}
        }
        Ok(())
    }
}

// ============================================================================
// ZIP
// ============================================================================

const UNIX_FILE_TYPE_MASK: u32 = 0o170000;
const UNIX_SYMLINK: u32 = 0o120000;

/// Zip archive over an in-memory buffer.
pub struct ZipReader {
    url: String,
    archive: zip::ZipArchive<Cursor<Vec<u8>>>,
    members: Vec<ArchiveMember>,
}

impl ArchiveReader for ZipReader {
    fn open(artifact: DownloadedArtifact) -> Result<Self> {
        let url = artifact.url;
        let mut archive = zip::ZipArchive::new(Cursor::new(artifact.bytes))
            .map_err(|e| InstallError::archive(&url, e))?;

        let mut members = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let entry = archive
                .by_index_raw(index)
                .map_err(|e| InstallError::archive(&url, e))?;
            let path = entry.name().to_string();
            let mode = entry.unix_mode();

            let kind = if mode.is_some_and(|m| m & UNIX_FILE_TYPE_MASK == UNIX_SYMLINK) {
                MemberKind::Link
            } else if entry.is_dir() || path.ends_with('\\') {
                MemberKind::Directory
            } else {
                MemberKind::File
            };

            members.push(ArchiveMember {
                index,
                path,
                kind,
                size: entry.size(),
                mode,
            });
        }

        Ok(Self {
            url,
            archive,
            members,
        })
    }

    fn members(&self) -> &[ArchiveMember] {
        &self.members
    }

    fn extract_member(&mut self, member: &ArchiveMember, dest_dir: &Path) -> Result<()> {
        let dest_path = checked_destination(&self.url, dest_dir, &member.path)?;

        match member.kind {
            MemberKind::Directory => {
                fs::create_dir_all(&dest_path).map_err(|e| InstallError::fs(&dest_path, e))?;
            }
            MemberKind::File => {
                let mut entry = self
                    .archive
                    .by_index(member.index)
                    .map_err(|e| InstallError::archive(&self.url, e))?;
                write_file(&dest_path, &mut entry, &self.url)?;

                #[cfg(unix)]
                set_unix_permissions(&dest_path, member.mode)?;
            }
            MemberKind::Link | MemberKind::Other => {}
        }
        Ok(())
    }
}

// ============================================================================
// Unix Permissions
// ============================================================================

#[cfg(unix)]
fn set_unix_permissions(path: &Path, mode: Option<u32>) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    if let Some(mode) = mode {
        if mode & 0o111 != 0 {
            let permissions = fs::Permissions::from_mode((mode & 0o7777) | 0o755);
            fs::set_permissions(path, permissions).map_err(|e| InstallError::fs(path, e))?;
        }
    }

    Ok(())
}
