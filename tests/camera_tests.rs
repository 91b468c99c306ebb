// SPDX-License-Identifier: MPL-2.0

//! Integration tests for opening cameras that do not exist

use barcode_scanner::backends::camera::V4l2Camera;
use barcode_scanner::errors::{CameraError, EXIT_CAMERA_UNAVAILABLE};
use barcode_scanner::{AppError, ScannerConfig, scanner};
use std::process::Command;

const MISSING_INDEX: usize = 9999;

#[test]
fn test_open_missing_camera_is_not_found() {
    let Err(err) = V4l2Camera::open(MISSING_INDEX) else {
        panic!("/dev/video{} should not exist", MISSING_INDEX);
    };
    assert!(matches!(err, CameraError::NotFound(MISSING_INDEX)));
    assert!(err.is_open_failure());
    assert_eq!(AppError::from(err).exit_code(), EXIT_CAMERA_UNAVAILABLE);
}

#[test]
fn test_run_with_missing_camera_fails_before_scanning() {
    let config = ScannerConfig {
        camera_index: MISSING_INDEX,
        beep: false,
        preview: false,
        ..Default::default()
    };

    let err = scanner::run(&config).unwrap_err();
    assert!(matches!(
        err,
        AppError::Camera(CameraError::NotFound(MISSING_INDEX))
    ));
    assert_eq!(err.exit_code(), EXIT_CAMERA_UNAVAILABLE);
}

#[test]
fn test_binary_exits_with_camera_unavailable_code() {
    let output = Command::new(env!("CARGO_BIN_EXE_barcode-scanner"))
        .args([&MISSING_INDEX.to_string(), "0", "--no-preview"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(EXIT_CAMERA_UNAVAILABLE as i32));
    assert!(output.stdout.is_empty(), "nothing should be printed on stdout");
}
