use std::io::Read;
use std::path::PathBuf;
use std::process::ExitStatus;

use anyhow::anyhow;
use camino::{Utf8Path, Utf8PathBuf};
use flate2::read::GzDecoder;
use futures::TryStreamExt;
use reqwest::header::{HeaderValue, ACCEPT, USER_AGENT};
use tar::Archive;
use tokio::process::Command;
use tokio_util::io::{StreamReader, SyncIoBridge};
use url::Url;

use crate::source::DownloadSource;
use crate::InstallerError;

const BINARY_INSTALL_HEADER: HeaderValue = HeaderValue::from_static("binary-install");
const OCTET_STREAM_HEADER: HeaderValue = HeaderValue::from_static("application/octet-stream");

/// Options governing [`Binary::install`].
#[derive(Clone, Copy, Debug)]
pub struct InstallOptions {
    /// Wipe and replace an existing installation instead of keeping it
    pub allow_reinstall: bool,
    /// Silence the user-facing install notices on stderr
    pub suppress_logs: bool,
}

impl Default for InstallOptions {
    fn default() -> InstallOptions {
        InstallOptions {
            allow_reinstall: true,
            suppress_logs: false,
        }
    }
}

/// A prebuilt binary managed inside `<base_dir>/bin`.
///
/// The install directory belongs to this `Binary` wholesale: a reinstall
/// deletes the whole directory and unpacks a fresh archive into it, so
/// nothing else should be kept there. Concurrent installs racing on the
/// same directory are unsupported.
#[derive(Clone, Debug)]
pub struct Binary {
    name: String,
    install_dir: Utf8PathBuf,
    binary_path: Utf8PathBuf,
    source: Option<DownloadSource>,
}

impl Binary {
    /// Creates a manager for `name` rooted at `base_dir`, eagerly
    /// creating `<base_dir>/bin` if it is absent.
    pub fn new(
        name: impl Into<String>,
        base_dir: impl AsRef<Utf8Path>,
    ) -> Result<Binary, InstallerError> {
        let name = name.into();
        if name.is_empty() {
            return Err(InstallerError::MissingBinaryName);
        }
        let install_dir = base_dir.as_ref().join("bin");
        std::fs::create_dir_all(&install_dir)?;
        let binary_path = install_dir.join(&name);
        Ok(Binary {
            name,
            install_dir,
            binary_path,
            source: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn install_dir(&self) -> &Utf8Path {
        &self.install_dir
    }

    /// The path the executable lives at once installed.
    pub fn binary_path(&self) -> &Utf8Path {
        &self.binary_path
    }

    /// The configured download source, if one has been set.
    pub const fn download_source(&self) -> Option<&DownloadSource> {
        self.source.as_ref()
    }

    /// Whether the managed binary is currently installed.
    pub fn exists(&self) -> bool {
        self.binary_path.exists()
    }

    /// Configures a direct download URL. The URL is kept verbatim and
    /// validated when an install resolves it.
    pub fn use_download_url(&mut self, url: impl Into<String>) -> &mut Binary {
        self.source = Some(DownloadSource::url(url));
        self
    }

    /// Configures the GitHub Releases naming convention for this
    /// binary's name, resolving the host platform tag now.
    pub fn use_github_release(
        &mut self,
        owner: &str,
        repo: &str,
        release_tag: &str,
        proxy_url: Option<&str>,
    ) -> Result<&mut Binary, InstallerError> {
        self.source = Some(DownloadSource::github_release(
            &self.name,
            owner,
            repo,
            release_tag,
            proxy_url,
        )?);
        Ok(self)
    }

    /// Removes the entire install directory. Removing an installation
    /// that does not exist is not an error.
    pub fn uninstall(&self) -> Result<(), InstallerError> {
        if self.install_dir.exists() {
            tracing::debug!(dir = %self.install_dir, "removing install directory");
            std::fs::remove_dir_all(&self.install_dir)?;
        }
        Ok(())
    }

    /// Installs the binary from its configured source, returning the
    /// path it was installed to, or `Ok(None)` when an existing
    /// installation was kept.
    ///
    /// An existing installation is wiped and replaced when
    /// `allow_reinstall` is set (the default); otherwise it is kept and
    /// no transfer happens. The tarball streams straight from the
    /// transport into extraction, with the first path component of every
    /// entry stripped so the archive's top-level folder unwraps into the
    /// install directory. A failed install may leave a partial
    /// directory behind; the next install starts clean.
    pub async fn install(
        &self,
        client: &reqwest::Client,
        options: InstallOptions,
    ) -> Result<Option<Utf8PathBuf>, InstallerError> {
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| InstallerError::MissingDownloadUrl {
                name: self.name.clone(),
            })?;
        let url = source.resolve()?;

        if self.exists() {
            if options.allow_reinstall {
                if !options.suppress_logs {
                    eprintln!("{} is already installed, reinstalling...", self.name);
                }
                self.uninstall()?;
            } else {
                if !options.suppress_logs {
                    eprintln!("{} is already installed, skipping...", self.name);
                }
                return Ok(None);
            }
        }

        std::fs::create_dir_all(&self.install_dir)?;

        if !options.suppress_logs {
            eprintln!("Downloading binary from {url}");
        }
        self.download_and_unpack(client, url).await?;

        if !options.suppress_logs {
            eprintln!("{} has been installed!", self.name);
        }
        Ok(Some(self.binary_path.clone()))
    }

    async fn download_and_unpack(
        &self,
        client: &reqwest::Client,
        url: Url,
    ) -> Result<(), InstallerError> {
        tracing::debug!(%url, "starting download");
        let response = client
            .get(url)
            .header(USER_AGENT, BINARY_INSTALL_HEADER)
            .header(ACCEPT, OCTET_STREAM_HEADER)
            .send()
            .await?
            .error_for_status()?;

        // bridge the response body into the blocking decoder chain so
        // the archive is extracted as bytes arrive instead of being
        // buffered whole
        let body = Box::pin(response.bytes_stream().map_err(std::io::Error::other));
        let reader = SyncIoBridge::new(StreamReader::new(body));
        let install_dir = self.install_dir.clone();
        tokio::task::spawn_blocking(move || unpack_tarball(reader, &install_dir))
            .await
            .map_err(|err| anyhow!("unpack task failed: {err}"))?
    }

    /// Spawns the installed binary with exactly `args`, inheriting the
    /// parent's working directory and stdio, and waits for it to exit.
    ///
    /// Embedding binaries usually pass `std::env::args().skip(1)` and
    /// terminate with the returned status's code. If nothing is
    /// installed yet this fails with [`InstallerError::BinaryNotFound`]
    /// rather than installing on the fly.
    pub async fn run<I, S>(&self, args: I) -> Result<ExitStatus, InstallerError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        if !self.exists() {
            return Err(InstallerError::BinaryNotFound {
                path: self.binary_path.clone(),
            });
        }
        let status = Command::new(&self.binary_path).args(args).status().await?;
        tracing::debug!(binary = %self.name, %status, "delegated process exited");
        Ok(status)
    }
}

/// Unpacks a gzipped tarball into `dest`, discarding the first path
/// component of every entry. Entries that are nothing but the wrapper
/// folder itself are skipped.
fn unpack_tarball(reader: impl Read, dest: &Utf8Path) -> Result<(), InstallerError> {
    let tar = GzDecoder::new(reader);
    let mut archive = Archive::new(tar);
    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?.into_owned();
        let stripped: PathBuf = path.components().skip(1).collect();
        if stripped.as_os_str().is_empty() {
            continue;
        }
        let target = dest.as_std_path().join(stripped);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        tracing::debug!(entry = %path.display(), "unpacking");
        entry.unpack(&target)?;
    }
    Ok(())
}
