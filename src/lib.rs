//! Installation and delegation for prebuilt binaries.
//!
//! This crate manages a single binary inside a `bin` directory it owns:
//! a [`Binary`] is bound to a logical name and a base directory, gets a
//! download source configured (either a direct URL, or the GitHub
//! Releases naming convention `<name>-<platform>.tar.gz` with an
//! optional proxy prefix), and then [`Binary::install`] fetches the
//! gzipped tarball, unwraps its top-level folder, and unpacks it into
//! `<base_dir>/bin`. [`Binary::run`] hands control to the installed
//! executable, inheriting stdio and reporting its exit status.
//!
//! The HTTP client is injected by the caller, so transport concerns
//! (headers, timeouts, proxies) are configured on the
//! [`reqwest::Client`] the caller builds. Everything that can go wrong
//! is surfaced as an [`InstallerError`] for the embedding binary to
//! report and exit on.

mod binary;
mod error;
mod platform;
mod source;

pub use binary::{Binary, InstallOptions};
pub use error::InstallerError;
pub use platform::platform;
pub use source::DownloadSource;
