// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;
use tempfile::tempdir;

fn escapebrot() -> Command {
    Command::cargo_bin("escapebrot").unwrap()
}

#[test]
fn renders_a_mandelbrot_png() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("mandelbrot.png");
    escapebrot()
        .args(&["--width", "48", "--real=-2,1", "--imag=-1.5,1.5", "--threads", "1"])
        .args(&["--boxes", "0.2", "--depth", "8"])
        .arg("--output")
        .arg(&out)
        .assert()
        .success();
    let image = image::open(&out).unwrap();
    assert_eq!(image.color(), image::ColorType::L8);
    assert_eq!(image::image_dimensions(&out).unwrap(), (48, 48));
}

#[test]
fn renders_a_sixteen_bit_julia_png() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("julia.png");
    escapebrot()
        .args(&["--kind", "julia", "--width", "40", "--imag=-1,1", "--constant=-0.8,0.156"])
        .args(&["--oversample", "2", "--threads", "1"])
        .arg("--output")
        .arg(&out)
        .assert()
        .success();
    let image = image::open(&out).unwrap();
    assert_eq!(image.color(), image::ColorType::L16);
    assert_eq!(image::image_dimensions(&out).unwrap(), (40, 20));
}

#[test]
fn renders_a_seeded_buddhabrot() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("buddha.png");
    escapebrot()
        .args(&["--kind", "buddhabrot", "--width", "32", "--settle", "0"])
        .args(&["--iterations", "50", "--seed", "11", "--threads", "1"])
        .arg("--output")
        .arg(&out)
        .assert()
        .success();
    assert!(out.exists());
}

#[test]
fn unsupported_depth_is_refused() {
    let dir = tempdir().unwrap();
    escapebrot()
        .args(&["--width", "8", "--depth", "12"])
        .arg("--output")
        .arg(dir.path().join("nope.png"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("8 or 16"));
}

#[test]
fn a_view_with_nothing_in_it_fails() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("empty.png");
    escapebrot()
        .args(&["--width", "3", "--real=-0.1,0.1", "--imag=-0.1,0.1", "--iterations", "10"])
        .arg("--output")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no data"));
    assert!(!out.exists());
}

#[test]
fn cubic_buddhabrot_samples_the_quadratic_bulb() {
    // The whole view lies in the quadratic period-2 disk, where cubic
    // orbits still escape.
    let dir = tempdir().unwrap();
    let out = dir.path().join("cubic.png");
    escapebrot()
        .args(&["--kind", "buddhabrot", "--degree", "3", "--width", "16"])
        .args(&["--real=-1.2,-0.8", "--imag=-0.1,0.1", "--settle", "0"])
        .args(&["--iterations", "20", "--seed", "3", "--threads", "1"])
        .arg("--output")
        .arg(&out)
        .assert()
        .success();
    assert_eq!(image::image_dimensions(&out).unwrap(), (16, 8));
}
