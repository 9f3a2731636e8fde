use std::path::{Path, PathBuf};

use assert_cmd::Command;
use gridsight::fiducial::MarkerDetection;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;
use nalgebra::Point2;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

const MAT: Rgb<u8> = Rgb([230, 200, 40]);
const FELT: Rgb<u8> = Rgb([60, 110, 70]);
const BLACK: Rgb<u8> = Rgb([15, 15, 15]);
const WHITE: Rgb<u8> = Rgb([245, 245, 245]);

fn marker(id: u32, x: f64, y: f64) -> MarkerDetection {
    MarkerDetection::from_corners(
        id,
        [
            Point2::new(x, y),
            Point2::new(x + 40.0, y),
            Point2::new(x + 40.0, y + 40.0),
            Point2::new(x, y + 40.0),
        ],
    )
}

/// Board quad (100,100)-(540,440) on a yellow mat, black piece in cell 0,
/// white piece in cell 4 and one loose black piece right of the board.
fn write_scene(dir: &Path) -> (PathBuf, PathBuf) {
    let mut img = RgbImage::from_pixel(800, 480, MAT);
    draw_filled_rect_mut(&mut img, Rect::at(100, 100).of_size(441, 341), FELT);
    draw_filled_rect_mut(&mut img, Rect::at(143, 127).of_size(60, 60), BLACK);
    draw_filled_rect_mut(&mut img, Rect::at(290, 240).of_size(60, 60), WHITE);
    draw_filled_circle_mut(&mut img, (680, 250), 45, BLACK);
    let image_path = dir.join("frame.png");
    img.save(&image_path).unwrap();

    let markers = vec![
        marker(24, 100.0, 100.0),
        marker(26, 500.0, 100.0),
        marker(21, 500.0, 400.0),
        marker(29, 100.0, 400.0),
    ];
    let markers_path = dir.join("markers.json");
    std::fs::write(&markers_path, serde_json::to_string(&markers).unwrap()).unwrap();
    (image_path, markers_path)
}

fn gridsight() -> Command {
    Command::cargo_bin("gridsight").unwrap()
}

#[test]
fn reports_board_pieces_and_placement() {
    let dir = TempDir::new().unwrap();
    let (image, markers) = write_scene(dir.path());
    let out = dir.path().join("report.json");

    gridsight()
        .arg("--image")
        .arg(&image)
        .arg("--markers")
        .arg(&markers)
        .args(["--previous", "B........"])
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    let report: Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    let board = report["board"].as_array().unwrap();
    assert_eq!(board.len(), 9);
    assert_eq!(board[0], "black");
    assert_eq!(board[4], "white");
    assert_eq!(board[8], "empty");
    assert_eq!(report["to_move"], "human");
    assert_eq!(
        report["reconciliation"],
        serde_json::json!({ "kind": "single_placement", "cell": 4 })
    );

    let pieces = report["loose_pieces"].as_array().unwrap();
    assert_eq!(pieces.len(), 1);
    assert_eq!(pieces[0]["color"], "black");
    let robot = pieces[0]["robot"].as_array().unwrap();
    let (x, y) = (robot[0].as_f64().unwrap(), robot[1].as_f64().unwrap());
    assert!((x - 178.14).abs() < 0.5, "robot x {x}");
    assert!((y - 195.88).abs() < 0.5, "robot y {y}");
}

#[test]
fn ambiguous_change_asks_for_recheck() {
    let dir = TempDir::new().unwrap();
    let (image, markers) = write_scene(dir.path());

    gridsight()
        .arg("--image")
        .arg(&image)
        .arg("--markers")
        .arg(&markers)
        .args(["--previous", "........."])
        .assert()
        .success()
        .stdout(contains("\"ambiguous\""))
        .stderr(contains("cannot determine the move, please recheck the board"));
}

#[test]
fn missing_markers_mean_board_not_found() {
    let dir = TempDir::new().unwrap();
    let (image, _) = write_scene(dir.path());
    let markers = dir.path().join("none.json");
    std::fs::write(&markers, "[]").unwrap();

    gridsight()
        .arg("--image")
        .arg(&image)
        .arg("--markers")
        .arg(&markers)
        .assert()
        .code(2)
        .stdout(contains("\"to_move\": null"))
        .stderr(contains("board not found, retry"));
}

#[test]
fn malformed_previous_board_is_a_usage_error() {
    let dir = TempDir::new().unwrap();
    let (image, markers) = write_scene(dir.path());

    gridsight()
        .arg("--image")
        .arg(&image)
        .arg("--markers")
        .arg(&markers)
        .args(["--previous", "BW"])
        .assert()
        .failure()
        .stderr(contains("9 cells"));
}
