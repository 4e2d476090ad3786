//! Integration tests for directory processing and output files.

mod common;

use std::fs;

use common::{rgb_scene, save_png, GREEN_RGB, PURPLE_RGB};
use fruit_count_lib::output::{write_results, OutputFormat};
use fruit_count_lib::{run_batch, BatchOptions, Config, Detector};

fn create_sample_dir(root: &std::path::Path) {
    save_png(&rgb_scene(640, 360, GREEN_RGB, &[(20, 20, 80), (300, 200, 90)]), &root.join("b_green.png"));
    save_png(&rgb_scene(360, 640, PURPLE_RGB, &[(100, 100, 120)]), &root.join("a_purple.png"));
    fs::write(root.join("c_corrupt.jpg"), b"\xff\xd8\xff\xe0 this is not a jpeg").expect("write corrupt file");
    fs::write(root.join("notes.txt"), "ignored").expect("write notes");
}

#[test]
fn corrupt_file_is_skipped_and_others_are_counted() {
    let dir = tempfile::tempdir().expect("tempdir");
    create_sample_dir(dir.path());

    let config = Config::default();
    let detector = Detector::from_config(&config).unwrap();
    let options = BatchOptions { parallel: true, debug_dir: None };
    let report = run_batch(dir.path(), &config.extensions, &detector, &options).unwrap();

    assert_eq!(report.results.keys().collect::<Vec<_>>(), vec!["a_purple.png", "b_green.png"]);
    assert_eq!(report.results["b_green.png"].get("green"), Some(2));
    assert_eq!(report.results["a_purple.png"].get("purple"), Some(1));
    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].path.ends_with("c_corrupt.jpg"));

    let out = dir.path().join("out").join("results.json");
    write_results(&report.results, &config.labels(), OutputFormat::Json, &out).unwrap();

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    let object = value.as_object().unwrap();
    assert_eq!(object.len(), 2);
    assert!(!object.contains_key("c_corrupt.jpg"));
    assert_eq!(value["b_green.png"]["green"], 2);
    assert_eq!(value["b_green.png"]["red"], 0);
}

#[test]
fn sequential_and_parallel_batches_agree() {
    let dir = tempfile::tempdir().expect("tempdir");
    create_sample_dir(dir.path());

    let config = Config::default();
    let detector = Detector::from_config(&config).unwrap();

    let parallel = run_batch(dir.path(), &config.extensions, &detector, &BatchOptions { parallel: true, debug_dir: None }).unwrap();
    let sequential = run_batch(dir.path(), &config.extensions, &detector, &BatchOptions { parallel: false, debug_dir: None }).unwrap();

    assert_eq!(parallel.results, sequential.results);
    assert_eq!(parallel.skipped, sequential.skipped);
}

#[test]
fn empty_directory_gives_empty_results() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = Config::default();
    let detector = Detector::from_config(&config).unwrap();
    let report = run_batch(dir.path(), &config.extensions, &detector, &BatchOptions::default()).unwrap();
    assert!(report.results.is_empty());
    assert!(report.skipped.is_empty());
}
