use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

/// InstallerError is the type of Error that occurred while installing or
/// running a managed binary.
#[derive(Error, Debug)]
pub enum InstallerError {
    /// Something went wrong with system I/O
    #[error(transparent)]
    IoError(#[from] io::Error),

    /// Something went wrong while making an HTTP request
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),

    /// The configured download URL was not a well-formed absolute URL
    #[error("'{url}' is not a valid download URL: {source}")]
    MalformedUrl {
        url: String,
        source: url::ParseError,
    },

    /// A `Binary` was constructed without a name
    #[error("You must specify the name of your binary")]
    MissingBinaryName,

    /// Install was invoked before a download source was configured
    #[error("You must configure the download url of the {name} binary")]
    MissingDownloadUrl { name: String },

    /// The host OS is not one release archives are published for
    #[error("Unsupported platform: {os} {arch}")]
    UnsupportedPlatform { os: String, arch: String },

    /// Run was invoked before the binary was installed
    #[error("Binary not found at {path}. Try installing it first")]
    BinaryNotFound { path: Utf8PathBuf },

    /// A specified path was not valid UTF-8
    #[error(transparent)]
    PathNotUtf8(#[from] camino::FromPathBufError),

    #[error(transparent)]
    AdhocError(#[from] anyhow::Error),
}
