use url::Url;

use crate::{platform, InstallerError};

/// Where a managed binary's release archive is downloaded from.
///
/// Exactly one source must be configured on a [`Binary`](crate::Binary)
/// before installing. The configured URL is held verbatim and only
/// validated when an install resolves it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadSource {
    url: String,
}

impl DownloadSource {
    /// A direct download URL, stored as given.
    pub fn url(url: impl Into<String>) -> DownloadSource {
        DownloadSource { url: url.into() }
    }

    /// The GitHub Releases naming convention:
    /// `https://github.com/{owner}/{repo}/releases/download/{release_tag}/{name}-{platform}.tar.gz`.
    ///
    /// When a proxy base URL is given, the upstream URL is appended to
    /// it as a suffix path. The platform tag is resolved here so an
    /// unsupported host surfaces before an install is ever attempted.
    pub fn github_release(
        name: &str,
        owner: &str,
        repo: &str,
        release_tag: &str,
        proxy_url: Option<&str>,
    ) -> Result<DownloadSource, InstallerError> {
        let platform = platform()?;
        Ok(Self::github_release_for_platform(
            name,
            owner,
            repo,
            release_tag,
            proxy_url,
            &platform,
        ))
    }

    fn github_release_for_platform(
        name: &str,
        owner: &str,
        repo: &str,
        release_tag: &str,
        proxy_url: Option<&str>,
        platform: &str,
    ) -> DownloadSource {
        let mut url = format!(
            "https://github.com/{owner}/{repo}/releases/download/{release_tag}/{name}-{platform}.tar.gz"
        );
        if let Some(proxy_url) = proxy_url {
            // the proxy takes the whole upstream URL as a suffix path,
            // so this is plain concatenation rather than URL joining
            url = format!("{proxy_url}/{url}");
        }
        DownloadSource { url }
    }

    /// Parses the configured URL, rejecting anything that is not a
    /// well-formed absolute URL before a transfer is attempted.
    pub(crate) fn resolve(&self) -> Result<Url, InstallerError> {
        Url::parse(&self.url).map_err(|source| InstallerError::MalformedUrl {
            url: self.url.clone(),
            source,
        })
    }

    /// The configured URL, exactly as it will be requested.
    pub fn as_str(&self) -> &str {
        &self.url
    }
}

#[cfg(test)]
mod tests {
    use speculoos::prelude::*;

    use super::DownloadSource;
    use crate::InstallerError;

    #[test]
    fn it_builds_the_github_release_url() {
        let source = DownloadSource::github_release_for_platform(
            "tool",
            "acme",
            "tool",
            "v1.2.3",
            None,
            "linux-x86_64",
        );
        assert_that!(source.as_str()).is_equal_to(
            "https://github.com/acme/tool/releases/download/v1.2.3/tool-linux-x86_64.tar.gz",
        );
    }

    #[test]
    fn it_prefixes_the_proxy_base() {
        let source = DownloadSource::github_release_for_platform(
            "tool",
            "acme",
            "tool",
            "v1.2.3",
            Some("https://proxy.example"),
            "linux-x86_64",
        );
        assert_that!(source.as_str()).is_equal_to(
            "https://proxy.example/https://github.com/acme/tool/releases/download/v1.2.3/tool-linux-x86_64.tar.gz",
        );
    }

    #[test]
    fn it_resolves_well_formed_urls() {
        let source = DownloadSource::url("https://downloads.example/tool.tar.gz");
        let url = source.resolve();
        assert_that!(url).is_ok();
        assert_that!(url.unwrap().as_str())
            .is_equal_to("https://downloads.example/tool.tar.gz");
    }

    #[test]
    fn it_rejects_malformed_urls_at_resolution() {
        let source = DownloadSource::url("not a url");
        assert_that!(source.resolve())
            .is_err()
            .matches(|err| matches!(err, InstallerError::MalformedUrl { url, .. } if url == "not a url"));
    }
}
