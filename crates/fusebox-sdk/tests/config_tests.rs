//! Loading configuration from files and the environment

use fusebox_sdk::{SdkError, ShimConfig};
use std::io::Write;

#[test]
fn test_from_file() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(
        file,
        "backend_name: NNPI\nfusion_symbol: glow::FusionGroup\nsettings:\n  min_fusion_group_size: 2"
    )?;

    let config = ShimConfig::from_file(file.path())?;
    assert_eq!(config.backend_name, "NNPI");
    assert_eq!(config.symbol()?.namespace(), "glow");
    assert_eq!(config.settings.min_fusion_group_size, 2);
    Ok(())
}

#[test]
fn test_from_missing_file() {
    let result = ShimConfig::from_file("/nonexistent/fusebox.yaml");
    assert!(matches!(result, Err(SdkError::Io(_))));
}

// File and environment sources share process state, so they are exercised in one test.
#[test]
fn test_load_from_file_and_environment() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(
        dir.path().join("fusebox.yaml"),
        "backend_name: NNPI\nsettings:\n  pre_compile: true\n",
    )?;
    let base = dir.path().join("fusebox");

    let from_file = ShimConfig::load_from(&base)?;
    assert_eq!(from_file.backend_name, "NNPI");
    assert!(from_file.settings.pre_compile);
    assert!(from_file.settings.enable_signal_handler_overrides);

    std::env::set_var("FUSEBOX_BACKEND_NAME", "CPU");
    std::env::set_var("FUSEBOX_SETTINGS__ENABLE_SIGNAL_HANDLER_OVERRIDES", "false");
    let layered = ShimConfig::load_from(&base);
    std::env::remove_var("FUSEBOX_BACKEND_NAME");
    std::env::remove_var("FUSEBOX_SETTINGS__ENABLE_SIGNAL_HANDLER_OVERRIDES");

    let layered = layered?;
    assert_eq!(layered.backend_name, "CPU");
    assert!(layered.settings.pre_compile);
    assert!(!layered.settings.enable_signal_handler_overrides);

    let defaults = ShimConfig::load_from(dir.path().join("absent"))?;
    assert_eq!(defaults, ShimConfig::default());
    Ok(())
}
