//! Platform detection
//!
//! Provides OS information and, on Windows, which shell flavour is running so
//! that path hints printed by `init` match what the operator types.
//!
//! Platform info is cached on first access.

use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Current platform information (cached)
pub static CURRENT_PLATFORM: LazyLock<Platform> = LazyLock::new(Platform::detect);

/// Platform information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    /// OS: "darwin" (macOS), "linux", "windows", "unknown"
    pub os: &'static str,
    /// CPU architecture: "x86_64", "aarch64", etc.
    pub arch: &'static str,
}

impl Platform {
    /// Platform of the running binary
    pub fn detect() -> Self {
        Self {
            os: Self::detect_os(),
            arch: std::env::consts::ARCH,
        }
    }

    /// Whether we are running on Windows
    pub fn is_windows(&self) -> bool {
        self.os == "windows"
    }

    const fn detect_os() -> &'static str {
        #[cfg(target_os = "macos")]
        {
            "darwin"
        }

        #[cfg(target_os = "linux")]
        {
            "linux"
        }

        #[cfg(target_os = "windows")]
        {
            "windows"
        }

        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            "unknown"
        }
    }
}

/// Shell environment on Windows hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowsShell {
    /// cmd.exe or PowerShell
    #[default]
    Standard,
    /// Git Bash / MSYS2
    GitBash,
    /// Windows Subsystem for Linux
    Wsl,
}

impl WindowsShell {
    /// Detect the shell from the process environment
    pub fn detect() -> Self {
        Self::from_env(|key| std::env::var_os(key).is_some())
    }

    /// Detect the shell using `is_set` to query environment variables
    pub fn from_env(is_set: impl Fn(&str) -> bool) -> Self {
        if is_set("WSL_DISTRO_NAME") || is_set("WSLENV") {
            Self::Wsl
        } else if is_set("MSYSTEM") {
            Self::GitBash
        } else {
            Self::Standard
        }
    }

    /// Human readable label
    pub fn label(self) -> &'static str {
        match self {
            Self::Standard => "PowerShell/CMD",
            Self::GitBash => "Git Bash",
            Self::Wsl => "WSL",
        }
    }
}
