use std::{
    fs,
    path::PathBuf,
    process::{Command, Output},
};

const NARROW_PUZZLE: &str = "\
########
#..O.O.#
##@.O..#
#...O..#
#.#.O..#
#...O..#
#......#
########

<^^>>>vv<v>>v<<
";

const WIDE_PUZZLE: &str = "\
#######
#...#.#
#.....#
#..OO@#
#..O..#
#.....#
#######

<vvv<<^^<<^^
";

/// Puzzle written to the temporary directory and removed when dropped.
struct PuzzleFile {
    path: PathBuf,
}

impl PuzzleFile {
    fn new(name: &str, contents: &str) -> Self {
        let path = std::env::temp_dir().join(format!("boxpush-{}-{name}.txt", std::process::id()));
        fs::write(&path, contents).expect("failed to write puzzle file");
        Self { path }
    }

    fn arg(&self) -> &str {
        self.path.to_str().expect("utf-8 path")
    }
}

impl Drop for PuzzleFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn boxpush(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_boxpush"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run boxpush binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("utf-8 output")
}

#[test]
fn narrow_layout_prints_score() {
    let puzzle = PuzzleFile::new("narrow", NARROW_PUZZLE);
    let output = boxpush(&[puzzle.arg(), "--layout", "narrow"]);

    assert!(output.status.success(), "boxpush failed: {output:?}");
    assert_eq!(stdout(&output), "narrow: 2028\n");
}

#[test]
fn wide_layout_renders_final_grid() {
    let puzzle = PuzzleFile::new("wide", WIDE_PUZZLE);
    let output = boxpush(&[puzzle.arg(), "--layout", "wide", "--render"]);

    assert!(output.status.success(), "boxpush failed: {output:?}");
    assert_eq!(
        stdout(&output),
        "\
wide: 618
##############
##...[].##..##
##...@.[]...##
##....[]....##
##..........##
##..........##
##############
"
    );
}

#[test]
fn omitted_layout_solves_both_variants_as_json() {
    let puzzle = PuzzleFile::new("both", NARROW_PUZZLE);
    let output = boxpush(&[puzzle.arg(), "--format", "json"]);

    assert!(output.status.success(), "boxpush failed: {output:?}");
    let results: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("json output");
    let results = results.as_array().expect("array of results");

    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["layout"], "narrow");
    assert_eq!(results[0]["score"]["total"], 2028);
    assert_eq!(results[0]["score"]["shape"], "Single");
    assert_eq!(results[0]["instructions"], 15);
    assert_eq!(results[1]["layout"], "wide");
    assert_eq!(results[1]["score"]["shape"], "HorizontalPair");
    assert!(results[0].get("grid").is_none());
}

#[test]
fn missing_input_reports_context() {
    let path = std::env::temp_dir().join("boxpush-missing-input-does-not-exist.txt");
    let output = boxpush(&[path.to_str().expect("utf-8 path")]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read puzzle"), "stderr: {stderr}");
}

#[test]
fn puzzle_files_are_removed_after_use() {
    let path = {
        let puzzle = PuzzleFile::new("cleanup", NARROW_PUZZLE);
        let output = boxpush(&[puzzle.arg(), "--layout", "narrow"]);
        assert!(output.status.success(), "boxpush failed: {output:?}");
        puzzle.path.clone()
    };
    assert!(!path.exists());
}

#[test]
fn empty_instruction_section_scores_initial_layout() {
    let puzzle = PuzzleFile::new("idle", "#####\n#@.O#\n#####\n\n");
    let output = boxpush(&[puzzle.arg(), "--layout", "narrow"]);

    assert!(output.status.success(), "boxpush failed: {output:?}");
    assert_eq!(stdout(&output), "narrow: 103\n");
}

#[test]
fn malformed_puzzle_is_rejected() {
    let puzzle = PuzzleFile::new("malformed", "#@#\n\n<x");
    let output = boxpush(&[puzzle.arg()]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to parse puzzle"), "stderr: {stderr}");
}
