use std::fmt;

/// Version and build stamp, fixed at compile time. Set `EAPOL_RELAY_BUILD_STAMP` while building
/// to record when and where the binary was made.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: &'static str,
    pub build_stamp: &'static str,
}

impl BuildInfo {
    pub const fn current() -> BuildInfo {
        BuildInfo {
            version: env!("CARGO_PKG_VERSION"),
            build_stamp: match option_env!("EAPOL_RELAY_BUILD_STAMP") {
                Some(stamp) => stamp,
                None => "unknown",
            },
        }
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Version:  {}\nBuild Time:  {}",
            self.version, self.build_stamp
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_carries_package_version() {
        let build = BuildInfo::current();
        assert_eq!(build.version, env!("CARGO_PKG_VERSION"));
        assert!(!build.build_stamp.is_empty());
    }

    #[test]
    fn display_format() {
        let build = BuildInfo {
            version: "1.2.3",
            build_stamp: "2024-05-01T10:00:00Z",
        };
        assert_eq!(
            build.to_string(),
            "Version:  1.2.3\nBuild Time:  2024-05-01T10:00:00Z"
        );
    }
}
