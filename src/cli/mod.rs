// SecureValues — CLI Module
//
// Command-line interface using clap derive macros.
// Subcommands: get, flavors, check.

mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub use commands::execute;

/// SecureValues — inspect and query the secure-values native library.
#[derive(Parser, Debug)]
#[command(name = "secure-values")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub library: LibraryArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where to find the native library. Flags override values from `--config`.
#[derive(Args, Debug, Default)]
pub struct LibraryArgs {
    /// JSON file with provider settings.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Exact path of the native library file (skips searching).
    #[arg(long, global = true)]
    pub library: Option<PathBuf>,

    /// Directory to search for the native library. May be repeated.
    #[arg(long = "library-dir", global = true)]
    pub library_dirs: Vec<PathBuf>,

    /// Name of the exported entry point.
    #[arg(long, global = true)]
    pub symbol: Option<String>,

    /// Do not fall back to the system library search path.
    #[arg(long, global = true)]
    pub no_system_search: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch a secret by flavor name or raw selector.
    Get {
        /// Flavor name ("primary", "backup") or integer selector.
        #[arg(allow_negative_numbers = true)]
        selector: String,

        /// Print the secret itself to stdout. Without this flag only its
        /// length and fingerprint are shown.
        #[arg(long)]
        reveal: bool,

        /// Emit JSON instead of text (ignored with --reveal).
        #[arg(long)]
        json: bool,
    },

    /// List the known flavor selectors.
    Flavors {
        #[arg(long)]
        json: bool,
    },

    /// Load the native library and report where it was found.
    Check {
        #[arg(long)]
        json: bool,
    },
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_get_with_name() {
        let cli = Cli::try_parse_from(["secure-values", "get", "primary"]).unwrap();
        match cli.command {
            Commands::Get {
                selector,
                reveal,
                json,
            } => {
                assert_eq!(selector, "primary");
                assert!(!reveal);
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_get_with_negative_selector() {
        let cli = Cli::try_parse_from(["secure-values", "get", "-1", "--reveal"]).unwrap();
        match cli.command {
            Commands::Get {
                selector, reveal, ..
            } => {
                assert_eq!(selector, "-1");
                assert!(reveal);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_library_flags_are_global() {
        let cli = Cli::try_parse_from([
            "secure-values",
            "check",
            "--library-dir",
            "/opt/a",
            "--library-dir",
            "/opt/b",
            "--symbol",
            "custom_get",
            "--no-system-search",
        ])
        .unwrap();

        assert_eq!(
            cli.library.library_dirs,
            vec![PathBuf::from("/opt/a"), PathBuf::from("/opt/b")]
        );
        assert_eq!(cli.library.symbol.as_deref(), Some("custom_get"));
        assert!(cli.library.no_system_search);
        assert!(matches!(cli.command, Commands::Check { json: false }));
    }

    #[test]
    fn test_get_requires_selector() {
        assert!(Cli::try_parse_from(["secure-values", "get"]).is_err());
    }
}
