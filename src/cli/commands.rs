// SecureValues — CLI Command Handlers
//
// Each function handles one CLI subcommand. Output goes to a caller-supplied
// writer (stdout in production); logs go to stderr through tracing, so a
// revealed secret never ends up in the log stream.

use std::io::{self, Write};

use serde::Serialize;

use crate::config::ProviderConfig;
use crate::error::SecureValuesError;
use crate::flavor::Flavor;
use crate::provider::{ModuleLoader, NativeSecretProvider};

use super::{Cli, Commands, LibraryArgs};

/// Execute the parsed CLI command.
pub fn execute(cli: Cli) -> Result<(), SecureValuesError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Flavors { json } => cmd_flavors(json, &mut out),
        Commands::Get {
            selector,
            reveal,
            json,
        } => {
            let provider = NativeSecretProvider::new(build_config(&cli.library)?)?;
            cmd_get(&provider, &selector, reveal, json, &mut out)
        }
        Commands::Check { json } => {
            let provider = NativeSecretProvider::new(build_config(&cli.library)?)?;
            cmd_check(&provider, json, &mut out)
        }
    }
}

/// Merge `--config` with the individual library flags.
fn build_config(args: &LibraryArgs) -> Result<ProviderConfig, SecureValuesError> {
    let mut config = match &args.config {
        Some(path) => ProviderConfig::from_file(path)?,
        None => ProviderConfig::default(),
    };

    if let Some(path) = &args.library {
        config.library_path = Some(path.clone());
    }
    config.search_dirs.extend(args.library_dirs.iter().cloned());
    if let Some(symbol) = &args.symbol {
        config.entry_symbol = symbol.clone();
    }
    if args.no_system_search {
        config.system_search = false;
    }

    config.validate()?;
    Ok(config)
}

/// Accept either a flavor name or a raw integer. Integers are passed through
/// untouched so that out-of-range values are rejected by the provider.
fn resolve_selector(input: &str) -> Result<i32, SecureValuesError> {
    if let Ok(raw) = input.trim().parse::<i32>() {
        return Ok(raw);
    }
    Ok(input.parse::<Flavor>()?.as_raw())
}

// ─── Get ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct SecretSummary {
    flavor: Flavor,
    selector: i32,
    length: usize,
    fingerprint: String,
}

fn cmd_get<L: ModuleLoader>(
    provider: &NativeSecretProvider<L>,
    selector: &str,
    reveal: bool,
    json: bool,
    out: &mut dyn Write,
) -> Result<(), SecureValuesError> {
    let raw = resolve_selector(selector)?;
    let secret = provider.get_secret(raw)?;
    let flavor = Flavor::try_from(raw)?;

    if reveal {
        tracing::info!(flavor = %flavor, "Revealing secret on stdout");
        out.write_all(secret.expose_secret())?;
        out.write_all(b"\n")?;
        out.flush()?;
        return Ok(());
    }

    let summary = SecretSummary {
        flavor,
        selector: raw,
        length: secret.len(),
        fingerprint: secret.fingerprint(),
    };

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&summary)?)?;
    } else {
        writeln!(
            out,
            "✓ {} (selector {}): {} bytes, fingerprint {}",
            summary.flavor, summary.selector, summary.length, summary.fingerprint
        )?;
        writeln!(out, "  Use --reveal to print the value.")?;
    }

    Ok(())
}

// ─── Flavors ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct FlavorEntry {
    selector: i32,
    name: Flavor,
}

fn cmd_flavors(json: bool, out: &mut dyn Write) -> Result<(), SecureValuesError> {
    let entries: Vec<FlavorEntry> = Flavor::ALL
        .into_iter()
        .map(|flavor| FlavorEntry {
            selector: flavor.as_raw(),
            name: flavor,
        })
        .collect();

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&entries)?)?;
        return Ok(());
    }

    writeln!(out, "{:<10} NAME", "SELECTOR")?;
    writeln!(out, "{:-<20}", "")?;
    for entry in entries {
        writeln!(out, "{:<10} {}", entry.selector, entry.name)?;
    }
    Ok(())
}

// ─── Check ───────────────────────────────────────────────────────────────────

fn cmd_check<L: ModuleLoader>(
    provider: &NativeSecretProvider<L>,
    json: bool,
    out: &mut dyn Write,
) -> Result<(), SecureValuesError> {
    let info = provider.load()?;

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&info)?)?;
        return Ok(());
    }

    writeln!(out, "✓ Native library loaded")?;
    writeln!(out, "  Path:        {}", info.path.display())?;
    writeln!(out, "  Entry point: {}", info.entry_symbol)?;
    writeln!(
        out,
        "  SHA-256:     {}",
        info.sha256.as_deref().unwrap_or("(resolved by system loader)")
    )?;
    Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::{LoadBehavior, MockLoader, MockModule};
    use crate::provider::ProviderError;
    use std::path::PathBuf;

    fn mock_provider(behavior: LoadBehavior) -> NativeSecretProvider<MockLoader> {
        NativeSecretProvider::with_loader(ProviderConfig::default(), MockLoader::new(behavior))
            .unwrap()
    }

    fn run_get(selector: &str, reveal: bool, json: bool) -> Result<String, SecureValuesError> {
        let provider = mock_provider(LoadBehavior::Succeed(MockModule::standard()));
        let mut out = Vec::new();
        cmd_get(&provider, selector, reveal, json, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_resolve_selector_accepts_names_and_integers() {
        assert_eq!(resolve_selector("primary").unwrap(), 0);
        assert_eq!(resolve_selector("Backup").unwrap(), 1);
        assert_eq!(resolve_selector("7").unwrap(), 7);
        assert_eq!(resolve_selector(" -3 ").unwrap(), -3);
        assert!(matches!(
            resolve_selector("staging"),
            Err(SecureValuesError::Flavor(_))
        ));
    }

    #[test]
    fn test_get_without_reveal_hides_value() {
        let output = run_get("primary", false, false).unwrap();
        assert!(!output.contains("primary-secret"), "output leaked: {}", output);
        assert!(output.contains("14 bytes"));
        assert!(output.contains("--reveal"));
    }

    #[test]
    fn test_get_json_summary() {
        let output = run_get("1", false, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["flavor"], "backup");
        assert_eq!(value["selector"], 1);
        assert_eq!(value["length"], 13);
        assert!(!output.contains("backup-secret"));
    }

    #[test]
    fn test_get_with_reveal_prints_value() {
        let output = run_get("backup", true, false).unwrap();
        assert_eq!(output, "backup-secret\n");
    }

    #[test]
    fn test_get_out_of_range_selector_fails() {
        let err = run_get("2", false, false).unwrap_err();
        assert!(matches!(
            err,
            SecureValuesError::Provider(ProviderError::InvalidSelector(2))
        ));
    }

    #[test]
    fn test_check_reports_module_info() {
        let provider = mock_provider(LoadBehavior::Succeed(MockModule::standard()));
        let mut out = Vec::new();
        cmd_check(&provider, false, &mut out).unwrap();
        let output = String::from_utf8(out).unwrap();

        assert!(output.contains("mock://secure-values"));
        assert!(output.contains("secure_values_get"));
        assert!(output.contains("resolved by system loader"));
    }

    #[test]
    fn test_check_surfaces_load_failure() {
        let provider = mock_provider(LoadBehavior::FailLoad("not found".into()));
        let mut out = Vec::new();
        let err = cmd_check(&provider, true, &mut out).unwrap_err();

        assert!(matches!(
            err,
            SecureValuesError::Provider(ProviderError::Load { .. })
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_flavors_lists_known_range() {
        let mut out = Vec::new();
        cmd_flavors(false, &mut out).unwrap();
        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("0          primary"));
        assert!(output.contains("1          backup"));

        let mut out = Vec::new();
        cmd_flavors(true, &mut out).unwrap();
        let entries: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(entries.as_array().unwrap().len(), 2);
        assert_eq!(entries[1]["name"], "backup");
    }

    #[test]
    fn test_build_config_applies_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "search_dirs": ["/from/file"], "max_secret_len": 128 }}"#).unwrap();

        let args = LibraryArgs {
            config: Some(file.path().to_path_buf()),
            library: None,
            library_dirs: vec![PathBuf::from("/from/flag")],
            symbol: Some("alt_get".into()),
            no_system_search: true,
        };

        let config = build_config(&args).unwrap();
        assert_eq!(
            config.search_dirs,
            vec![PathBuf::from("/from/file"), PathBuf::from("/from/flag")]
        );
        assert_eq!(config.entry_symbol, "alt_get");
        assert_eq!(config.max_secret_len, 128);
        assert!(!config.system_search);
    }

    #[test]
    fn test_build_config_rejects_invalid_overrides() {
        let args = LibraryArgs {
            symbol: Some(String::new()),
            ..Default::default()
        };
        assert!(matches!(
            build_config(&args),
            Err(SecureValuesError::Config(_))
        ));
    }
}
