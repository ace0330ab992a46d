//! End-to-end tests for the pipeline driver and stage sequencer.

use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

use relink_edit::{
    EditError, PipelineOptions, RelinkConfig, RelinkPipeline, SourceUnit, Stage, StageOutput,
    StageSequencer, generate_unified_diff,
};

const CORE: &str = "\
C     Core routines
      SUBROUTINE BAR(X)
      INCLUDE 'commons.for'
      DOUBLE PRECISION X
      print *, 'call BAR now'  ! trace
      X = CP0(X)
      END

      double precision function cp0(t)
      common /wrk/ q, r
      cp0 = t * q
      end
";

const COMMONS: &str = "\
c     Shared fluid state
      COMMON /FLD/ TC, PC,
     &  DC
      COMMON /CRT/ WM";

fn write(dir: &Path, name: &str, text: &str) {
    fs::write(dir.join(name), text).unwrap();
}

fn fixture() -> (TempDir, PipelineOptions) {
    let root = TempDir::new().unwrap();
    let src = root.path().join("src");
    fs::create_dir(&src).unwrap();
    write(&src, "CORE.FOR", CORE);
    write(&src, "COMMONS.FOR", COMMONS);
    write(&src, "NOTES.txt", "not a source file");

    let mut options = PipelineOptions::new(
        &src,
        root.path().join("work"),
        root.path().join("dest"),
    );
    options.glue_dir = root.path().join("glue");
    (root, options)
}

#[test]
fn test_full_run() {
    let (_root, options) = fixture();
    let report = RelinkPipeline::new(RelinkConfig::default())
        .run(&options)
        .unwrap();

    assert_eq!(report.blocks, vec!["CRT", "FLD", "WRK"]);
    assert_eq!(report.symbols, 5);
    assert!(!report.patched);

    let mut saved: Vec<_> = fs::read_dir(&options.dest_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    saved.sort();
    assert_eq!(saved, vec!["RP9_COMMONS.INC", "RP9_CORE.FOR"]);

    let core = fs::read_to_string(options.dest_dir.join("RP9_CORE.FOR")).unwrap();
    assert!(core.contains("      SUBROUTINE BAR_RP9(X)\n"));
    assert!(core.contains("      INCLUDE 'RP9_COMMONS.INC'\n"));
    assert!(core.contains("      PRINT *, 'call BAR now'  \n"));
    assert!(core.contains("      X = CP0_RP9(X)\n"));
    assert!(core.contains("      COMMON /WRK_RP9/ START_WRK,\n     & Q, R\n     & , END_WRK\n"));
    assert!(core.contains("C$OMP THREADPRIVATE(/WRK_RP9/)\n"));
    assert!(!core.contains("Core routines"));

    let commons = fs::read_to_string(options.dest_dir.join("RP9_COMMONS.INC")).unwrap();
    assert!(commons.ends_with("     & , END_CRT\nC$OMP THREADPRIVATE(/CRT_RP9/)\n\n"));

    let glue_file = report.glue_file.unwrap();
    assert_eq!(glue_file, options.glue_dir.join("RP9_XCOMMONS.FOR"));
    let glue = fs::read_to_string(glue_file).unwrap();
    assert!(glue.contains("      N = 2\n"));
    assert!(glue.contains("LOC(START_CRT)"));
    assert!(glue.contains("LOC(START_FLD)"));
    assert!(!glue.contains("WRK"));
    assert!(glue.contains("      INCLUDE 'RP9_COMMONS.INC'\n"));
    assert!(glue.contains("THREAD_NUM_RP9 = 0"));

    assert!(!options.work_dir.join("step_3").exists());
    let names: Vec<_> = report.timings.iter().map(|t| t.name).collect();
    assert_eq!(
        names,
        vec![
            "materialize",
            "normalize",
            "privatize",
            "list symbols",
            "rename",
            "save",
            "glue"
        ]
    );
}

#[test]
fn test_partial_run_skips_glue() {
    let (_root, mut options) = fixture();
    options.partial = true;
    let report = RelinkPipeline::default().run(&options).unwrap();

    assert!(report.glue_file.is_none());
    assert!(!options.glue_dir.join("RP9_XCOMMONS.FOR").exists());
    assert!(options.dest_dir.join("RP9_CORE.FOR").exists());
}

#[test]
fn test_missing_source_is_setup_error() {
    let root = TempDir::new().unwrap();
    let options = PipelineOptions::new(
        root.path().join("missing"),
        root.path().join("work"),
        root.path().join("dest"),
    );
    let err = RelinkPipeline::default().run(&options).unwrap_err();
    assert!(matches!(err, EditError::Setup(_)));
    assert!(!root.path().join("work").join("step_0").exists());
}

#[test]
fn test_missing_patch_is_setup_error() {
    let (_root, options) = fixture();
    let mut config = RelinkConfig::default();
    config.patch.file = Some(options.src_dir.join("absent.patch"));
    let err = RelinkPipeline::new(config).run(&options).unwrap_err();
    assert!(matches!(err, EditError::Setup(_)));
}

fn single_source(name: &str, content: &[u8]) -> (TempDir, PipelineOptions) {
    let root = TempDir::new().unwrap();
    let src = root.path().join("src");
    fs::create_dir(&src).unwrap();
    fs::write(src.join(name), content).unwrap();

    let mut options = PipelineOptions::new(
        &src,
        root.path().join("work"),
        root.path().join("dest"),
    );
    options.glue_dir = root.path().join("glue");
    (root, options)
}

fn patch_available() -> bool {
    Command::new("patch")
        .arg("--version")
        .output()
        .is_ok_and(|out| out.status.success())
}

#[test]
fn test_patch_applied_between_save_and_glue() {
    if !patch_available() {
        eprintln!("patch utility not installed; skipping");
        return;
    }
    let (root, options) = single_source(
        "FIX.FOR",
        b"      SUBROUTINE FIX(X)\n      X = 1\n      END\n",
    );
    let saved = "      SUBROUTINE FIX_RP9(X)\n      X = 1\n      END\n";
    let fixed = "      SUBROUTINE FIX_RP9(X)\n      X = 2\n      END\n";
    let patch_file = root.path().join("fix.patch");
    fs::write(&patch_file, generate_unified_diff("RP9_FIX.FOR", saved, fixed)).unwrap();

    let mut config = RelinkConfig::default();
    config.patch.file = Some(patch_file);
    let report = RelinkPipeline::new(config).run(&options).unwrap();

    assert!(report.patched);
    assert_eq!(
        fs::read_to_string(options.dest_dir.join("RP9_FIX.FOR")).unwrap(),
        fixed
    );
    let names: Vec<_> = report.timings.iter().map(|t| t.name).collect();
    assert_eq!(&names[names.len() - 3..], ["save", "patch", "glue"]);
    assert!(report.glue_file.is_some());
}

#[test]
fn test_latin1_source_round_trips() {
    let (_root, mut options) = single_source(
        "MSG.FOR",
        b"      SUBROUTINE MSG\n      PRINT *, 'Temp\xe9rature'\n      END\n",
    );
    options.partial = true;
    RelinkPipeline::default().run(&options).unwrap();

    assert_eq!(
        fs::read(options.dest_dir.join("RP9_MSG.FOR")).unwrap(),
        b"      SUBROUTINE MSG_RP9\n      PRINT *, 'Temp\xe9rature'\n      END\n".to_vec()
    );
}

struct Explode;

impl Stage for Explode {
    type Report = ();

    fn name(&self) -> &'static str {
        "explode"
    }

    fn apply(&self, _units: &[SourceUnit]) -> Result<StageOutput<()>, EditError> {
        Err(EditError::Pattern("boom".to_string()))
    }
}

#[test]
fn test_failed_stage_keeps_previous_snapshot() {
    let (_root, options) = fixture();
    let config = RelinkConfig::default();
    let mut sequencer =
        StageSequencer::materialize(&options.src_dir, &options.work_dir, &config).unwrap();
    assert_eq!(sequencer.load_current().unwrap().len(), 2);

    let err = sequencer.advance(&Explode).unwrap_err();
    assert_eq!(err.stage(), Some("explode"));
    assert!(options.work_dir.join("step_0").join("RP9_CORE.FOR").exists());
    assert!(!options.work_dir.join("step_1").exists());
    assert_eq!(sequencer.current_step(), 0);
}
