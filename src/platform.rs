//! Target platform of an image, in the GOARCH/GOOS vocabulary that
//! [image indexes](https://github.com/opencontainers/image-spec/blob/v1.0.1/image-index.md) use.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Platform {
    architecture: String,
    os: String,
}

impl Platform {
    /// Canonicalizes common aliases. Anything else is kept as is and left for the registry to reject.
    pub fn new(architecture: impl Into<String>, os: impl Into<String>) -> Self {
        let mut architecture = architecture.into();
        let mut os = os.into();
        if matches!(architecture.as_str(), "x64" | "x86_64") {
            architecture = "amd64".to_string();
        }
        if os == "win32" {
            os = "windows".to_string();
        }
        Self { architecture, os }
    }

    /// Platform of the running host.
    pub fn current() -> Self {
        Self::new(
            host_architecture(std::env::consts::ARCH),
            host_os(std::env::consts::OS),
        )
    }

    pub fn architecture(&self) -> &str {
        &self.architecture
    }

    pub fn os(&self) -> &str {
        &self.os
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.architecture)
    }
}

fn host_architecture(arch: &str) -> &str {
    match arch {
        "aarch64" => "arm64",
        "x86" => "386",
        "powerpc64" => "ppc64",
        other => other,
    }
}

fn host_os(os: &str) -> &str {
    match os {
        "macos" => "darwin",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn x64_maps_to_amd64() {
        assert_eq!(Platform::new("x64", "linux").architecture(), "amd64");
        assert_eq!(Platform::new("x86_64", "linux").architecture(), "amd64");
    }

    #[test]
    fn win32_maps_to_windows() {
        assert_eq!(Platform::new("amd64", "win32").os(), "windows");
    }

    #[test]
    fn others_pass_through() {
        let platform = Platform::new("riscv64", "freebsd");
        assert_eq!(platform.architecture(), "riscv64");
        assert_eq!(platform.os(), "freebsd");
        assert_eq!(Platform::new("arm64", "linux").architecture(), "arm64");
    }

    #[test]
    fn host_names() {
        assert_eq!(host_architecture("aarch64"), "arm64");
        assert_eq!(host_architecture("s390x"), "s390x");
        assert_eq!(host_os("macos"), "darwin");
        assert_eq!(host_os("linux"), "linux");
    }

    #[test]
    fn current_platform_is_canonical() {
        let platform = Platform::current();
        assert_ne!(platform.architecture(), "x86_64");
        assert_ne!(platform.architecture(), "aarch64");
        assert!(!platform.os().is_empty());
    }

    #[test]
    fn display() {
        assert_eq!(Platform::new("x64", "linux").to_string(), "linux/amd64");
    }
}
