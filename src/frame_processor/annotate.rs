// SPDX-License-Identifier: GPL-3.0-only

//! Draw decoded symbols back into the frame
//!
//! Each symbol gets its axis-aligned bounding box and its corner polygon.
//! Drawing is clipped to the frame, so out-of-range geometry from a decoder
//! can never fail or panic here. Text labels are drawn by the display.

use super::types::{DecodedSymbol, Point};
use crate::constants::detection::ANNOTATION_THICKNESS;
use image::{Rgba, RgbaImage};

/// Bounding box color
pub const BOX_COLOR: Rgba<u8> = Rgba([0, 255, 0, 255]);
/// Corner polygon color
pub const POLYGON_COLOR: Rgba<u8> = Rgba([0, 0, 255, 255]);

/// Annotate every symbol in place
pub fn annotate_frame(image: &mut RgbaImage, symbols: &[DecodedSymbol]) {
    for symbol in symbols {
        let rect = symbol.bounding_box();
        let (x0, y0) = (rect.x, rect.y);
        let (x1, y1) = (rect.x + rect.width, rect.y + rect.height);
        let box_corners = [
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ];
        draw_closed_polygon(image, &box_corners, BOX_COLOR);
        draw_closed_polygon(image, &symbol.corners, POLYGON_COLOR);
    }
}

fn draw_closed_polygon(image: &mut RgbaImage, points: &[Point], color: Rgba<u8>) {
    for (i, from) in points.iter().enumerate() {
        let to = points[(i + 1) % points.len()];
        draw_line(image, *from, to, color);
    }
}

/// Bresenham line with a square brush of `ANNOTATION_THICKNESS`
fn draw_line(image: &mut RgbaImage, from: Point, to: Point, color: Rgba<u8>) {
    if !(from.x.is_finite() && from.y.is_finite() && to.x.is_finite() && to.y.is_finite()) {
        return;
    }

    // Far-off coordinates are clamped first so the walk stays short
    let limit = (image.width().max(image.height()) as f32) * 2.0;
    let clamp = |v: f32| v.clamp(-limit, limit).round() as i64;

    let (mut x, mut y) = (clamp(from.x), clamp(from.y));
    let (x_end, y_end) = (clamp(to.x), clamp(to.y));
    let dx = (x_end - x).abs();
    let dy = -(y_end - y).abs();
    let sx = if x < x_end { 1 } else { -1 };
    let sy = if y < y_end { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        stamp(image, x, y, color);
        if x == x_end && y == y_end {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

fn stamp(image: &mut RgbaImage, cx: i64, cy: i64, color: Rgba<u8>) {
    let half = ANNOTATION_THICKNESS as i64 / 2;
    let (width, height) = (image.width() as i64, image.height() as i64);

    for y in cy - half..cy - half + ANNOTATION_THICKNESS as i64 {
        for x in cx - half..cx - half + ANNOTATION_THICKNESS as i64 {
            if x >= 0 && y >= 0 && x < width && y < height {
                image.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}
