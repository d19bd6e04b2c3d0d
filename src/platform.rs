use std::env::consts::{ARCH, OS};

use crate::InstallerError;

/// Resolves the platform tag used to pick a release archive for the
/// current host, in the form `<os>-<arch>`, e.g. `linux-x86_64`,
/// `darwin-aarch64`, `windows-x86_64`.
///
/// The architecture half is the host's native arch string, passed
/// through verbatim. Publishers must name their archives with the same
/// convention for the tag to select anything.
pub fn platform() -> Result<String, InstallerError> {
    platform_for(OS, ARCH)
}

fn platform_for(os: &str, arch: &str) -> Result<String, InstallerError> {
    let prefix = match os {
        "windows" => "windows",
        "linux" => "linux",
        "macos" => "darwin",
        _ => {
            return Err(InstallerError::UnsupportedPlatform {
                os: os.to_string(),
                arch: arch.to_string(),
            })
        }
    };
    Ok(format!("{prefix}-{arch}"))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use speculoos::prelude::*;

    use super::{platform, platform_for};
    use crate::InstallerError;

    #[rstest]
    #[case::windows("windows", "x86_64", "windows-x86_64")]
    #[case::linux("linux", "aarch64", "linux-aarch64")]
    #[case::macos("macos", "aarch64", "darwin-aarch64")]
    fn it_maps_supported_os_kinds(#[case] os: &str, #[case] arch: &str, #[case] expected: &str) {
        assert_that!(platform_for(os, arch))
            .is_ok()
            .is_equal_to(expected.to_string());
    }

    #[rstest]
    #[case::freebsd("freebsd")]
    #[case::wasi("wasi")]
    fn it_rejects_unknown_os_kinds(#[case] os: &str) {
        assert_that!(platform_for(os, "x86_64"))
            .is_err()
            .matches(|err| {
                matches!(
                    err,
                    InstallerError::UnsupportedPlatform { os: o, arch } if o == os && arch == "x86_64"
                )
            });
    }

    #[test]
    fn it_resolves_the_host_platform() {
        // every target this crate compiles for is in the mapping
        assert_that!(platform()).is_ok();
    }
}
