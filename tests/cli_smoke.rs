use std::path::PathBuf;
use std::process::Command;

use image::{Rgba, RgbaImage};

fn exe() -> PathBuf {
    return std::env::var_os("CARGO_BIN_EXE_laplace_filter")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("target").join("debug").join("laplace_filter"));
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("cli_smoke").join(name);
    std::fs::create_dir_all(&dir).unwrap();
    return dir;
}

/// Dark square on a light background, so the filter has edges to find.
fn write_square(path: &PathBuf, side: u32) {
    let image = RgbaImage::from_fn(side, side, |x, y| {
        let inside = (side / 4..3 * side / 4).contains(&x) && (side / 4..3 * side / 4).contains(&y);
        if inside {
            Rgba([20, 20, 20, 255])
        } else {
            Rgba([220, 220, 220, 255])
        }
    });
    image.save(path).unwrap();
}

#[test]
fn cli_filters_a_png() {
    let dir = scratch_dir("png");
    let input = dir.join("in.png");
    let output = dir.join("out.png");
    let _ = std::fs::remove_file(&output);
    write_square(&input, 64);

    let status = Command::new(exe())
        .arg(&input)
        .arg(&output)
        .args(["--kernel", "straight", "--threads", "2", "--progress-scale", "fraction"])
        .status()
        .unwrap();
    assert!(status.success());

    let filtered = image::open(&output).unwrap().to_rgba8();
    assert_eq!(filtered.dimensions(), (64, 64));
    assert_eq!(filtered.get_pixel(0, 0), &Rgba([0, 0, 0, 0]));
    // Uniform regions cancel out; the light side of the square's edge does not.
    assert_eq!(filtered.get_pixel(5, 5).0[..3], [0, 0, 0]);
    assert!(filtered.get_pixel(15, 32).0[0] > 0);
}

#[test]
fn cli_accepts_custom_weights() {
    let dir = scratch_dir("weights");
    let input = dir.join("in.png");
    let output = dir.join("out.bmp");
    let _ = std::fs::remove_file(&output);
    write_square(&input, 50);

    let status = Command::new(exe())
        .arg(&input)
        .arg(&output)
        .args(["--weights", "-1,-1,-1,-1,8,-1,-1,-1,-1", "--alpha", "preserve"])
        .status()
        .unwrap();
    assert!(status.success());
    assert!(output.exists());
}

#[test]
fn cli_rejects_small_images() {
    let dir = scratch_dir("small");
    let input = dir.join("in.png");
    let output = dir.join("out.png");
    write_square(&input, 20);
    let _ = std::fs::remove_file(&output);

    let status = Command::new(exe()).arg(&input).arg(&output).status().unwrap();
    assert_eq!(status.code(), Some(2));
    assert!(!output.exists());
}

#[test]
fn cli_reports_missing_input_as_failure() {
    let dir = scratch_dir("missing");
    let input = dir.join("does-not-exist.png");
    let output = dir.join("out.png");

    let status = Command::new(exe()).arg(&input).arg(&output).status().unwrap();
    assert_eq!(status.code(), Some(1));
}
