//! Integration tests for the `relink` CLI binary.

use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn write_file(path: &Path, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

fn relink_cmd(cwd: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_relink"));
    cmd.current_dir(cwd);
    cmd.env_remove("RUST_LOG");
    cmd
}

fn seed_sources(root: &Path) -> Result<(), Box<dyn std::error::Error>> {
    write_file(
        &root.join("src/COMMONS.FOR"),
        "      COMMON /FLD/ TC, PC\n",
    )?;
    write_file(
        &root.join("src/CORE.FOR"),
        "      SUBROUTINE SETUP(X)\n      INCLUDE 'commons.for'\n      TC = X\n      END\n",
    )?;
    Ok(())
}

#[test]
fn test_relink_partial_run_writes_destination() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = TempDir::new()?;
    seed_sources(tmp.path())?;

    let output = relink_cmd(tmp.path())
        .args(["src", "work", "dest", "0", "--partial"])
        .output()?;

    assert!(
        output.status.success(),
        "relink failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8(output.stdout)?;
    for step in ["materialize", "normalize", "privatize", "list symbols", "rename", "save", "total"] {
        assert!(stdout.contains(step), "missing {step} in:\n{stdout}");
    }
    assert!(!stdout.contains("glue source"));

    let core = fs::read_to_string(tmp.path().join("dest/RP9_CORE.FOR"))?;
    assert!(core.contains("      SUBROUTINE SETUP_RP9(X)\n"));
    assert!(core.contains("      INCLUDE 'RP9_COMMONS.INC'\n"));
    let commons = fs::read_to_string(tmp.path().join("dest/RP9_COMMONS.INC"))?;
    assert!(commons.contains("      COMMON /FLD_RP9/ START_FLD,\n"));
    assert!(!tmp.path().join("RP9_XCOMMONS.FOR").exists());
    Ok(())
}

#[test]
fn test_relink_full_run_writes_glue() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = TempDir::new()?;
    seed_sources(tmp.path())?;

    let output = relink_cmd(tmp.path())
        .args(["src", "work", "dest", "1", "--glue-dir", "glue"])
        .output()?;

    assert!(
        output.status.success(),
        "relink failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let glue = fs::read_to_string(tmp.path().join("glue/RP9_XCOMMONS.FOR"))?;
    assert!(glue.contains("      N = 1\n"));
    assert!(glue.contains("OMP_GET_THREAD_NUM"));
    Ok(())
}

#[test]
fn test_relink_settings_file_and_overrides() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = TempDir::new()?;
    seed_sources(tmp.path())?;
    write_file(&tmp.path().join("relink.yaml"), "prefix: TH_\nsuffix: _TH\n")?;

    let output = relink_cmd(tmp.path())
        .args(["src", "work", "dest", "0", "--partial", "--suffix", "_CLI"])
        .output()?;

    assert!(
        output.status.success(),
        "relink failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let core = fs::read_to_string(tmp.path().join("dest/TH_CORE.FOR"))?;
    assert!(core.contains("      SUBROUTINE SETUP_CLI(X)\n"));
    assert!(core.contains("      INCLUDE 'TH_COMMONS.INC'\n"));
    Ok(())
}

#[test]
fn test_relink_reports_missing_source() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = TempDir::new()?;

    let output = relink_cmd(tmp.path())
        .args(["missing", "work", "dest", "0"])
        .output()?;

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("relink run failed"), "stderr:\n{stderr}");
    Ok(())
}
