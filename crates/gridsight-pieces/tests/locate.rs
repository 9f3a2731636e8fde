use approx::assert_abs_diff_eq;
use gridsight_core::{Cell, RgbImageView};
use gridsight_pieces::{LoosePieceLocator, LoosePieceParams};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;
use nalgebra::Point2;

const MAT: Rgb<u8> = Rgb([230, 200, 40]);
const BLACK: Rgb<u8> = Rgb([15, 15, 15]);
const WHITE: Rgb<u8> = Rgb([245, 245, 245]);
const GREY: Rgb<u8> = Rgb([125, 125, 125]);

fn view(img: &RgbImage) -> RgbImageView<'_> {
    RgbImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

fn mat() -> RgbImage {
    RgbImage::from_pixel(640, 480, MAT)
}

fn assert_near(points: &[Point2<f64>], x: f64, y: f64) {
    assert_eq!(points.len(), 1, "expected one piece, got {points:?}");
    assert_abs_diff_eq!(points[0].x, x, epsilon = 1.0);
    assert_abs_diff_eq!(points[0].y, y, epsilon = 1.0);
}

#[test]
fn finds_black_and_white_discs() {
    let mut img = mat();
    draw_filled_circle_mut(&mut img, (150, 150), 45, BLACK);
    draw_filled_circle_mut(&mut img, (400, 300), 45, WHITE);

    let pieces = LoosePieceLocator::default().locate(&view(&img));
    assert_near(&pieces.black, 150.0, 150.0);
    assert_near(&pieces.white, 400.0, 300.0);
    assert_eq!(pieces.of(Cell::Empty).len(), 0);
}

#[test]
fn empty_mat_has_no_pieces() {
    let img = mat();
    assert!(LoosePieceLocator::default().locate(&view(&img)).is_empty());
}

#[test]
fn squares_bars_and_specks_are_rejected() {
    let mut img = mat();
    draw_filled_rect_mut(&mut img, Rect::at(60, 60).of_size(90, 90), BLACK);
    draw_filled_rect_mut(&mut img, Rect::at(250, 300).of_size(150, 60), WHITE);
    draw_filled_rect_mut(&mut img, Rect::at(500, 60).of_size(10, 10), BLACK);
    draw_filled_circle_mut(&mut img, (520, 380), 8, WHITE);

    let pieces = LoosePieceLocator::default().locate(&view(&img));
    assert!(pieces.is_empty(), "unexpected pieces {pieces:?}");
}

#[test]
fn grey_disc_is_measured_but_not_reported() {
    let mut img = mat();
    draw_filled_circle_mut(&mut img, (200, 240), 45, GREY);
    draw_filled_circle_mut(&mut img, (450, 240), 50, BLACK);

    let locator = LoosePieceLocator::default();
    let cands = locator.candidates(&view(&img));
    assert_eq!(cands.len(), 2);
    assert!(cands.iter().any(|c| c.color == Cell::Empty));

    let pieces = locator.locate(&view(&img));
    assert!(pieces.white.is_empty());
    assert_near(&pieces.black, 450.0, 240.0);
}

#[test]
fn smaller_pieces_need_a_lower_perimeter_bound() {
    let mut img = mat();
    draw_filled_circle_mut(&mut img, (320, 240), 20, WHITE);
    assert!(LoosePieceLocator::default().locate(&view(&img)).is_empty());

    let locator = LoosePieceLocator::new(LoosePieceParams {
        min_perimeter: 80.0,
        morph_radius: 3,
        ..LoosePieceParams::default()
    });
    assert_near(&locator.locate(&view(&img)).white, 320.0, 240.0);
}
