// Copyright 2025 the Specview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end viewport scenarios on the reference raster surface.

use std::cell::RefCell;
use std::rc::Rc;

use peniko::Color;
use specview_surface::{PixelRect, Primitive, SurfaceError, SurfaceOp};
use specview_surface_ref::pack_color;
use specview_viewport::{
    Borders, ButtonState, Conditions, Crossing, Palette, ViewMode, ViewportConfig, ViewportError,
};

mod common;

use common::{
    RecordingScrollbar, background, flush, spectrum, spectrum_color, viewport, widget_width,
};

#[test]
fn show_all_fits_whole_spectrum() {
    let mut vp = viewport(widget_width(999), 300, ViewportConfig::default());
    vp.load_spectrum(spectrum(1000, |i| i as f64)).unwrap();
    vp.show_all().unwrap();
    flush(&mut vp);

    assert_eq!(vp.state().offset, 0.0);
    assert_eq!(vp.state().x_visible, 999.0);

    let p = vp.painter();
    let right = p.base_x() + p.width();
    let top = p.baseline() - p.height();
    assert_eq!(vp.coordinate_map().pixel_x_to_energy(f64::from(right)), 999.0);
    // The highest bin carries the maximum, so its column reaches the top.
    assert_eq!(vp.surface().pixel(right, top), Some(spectrum_color()));
    assert_eq!(vp.surface().pixel(right + 1, p.baseline()), Some(background()));
}

#[test]
fn zoom_keeps_energy_under_cursor() {
    let config = ViewportConfig::default().with_x_region(0.0, 1000.0);
    let mut vp = viewport(widget_width(1000), 300, config);
    vp.load_spectrum(spectrum(2000, |_| 5.0)).unwrap();
    flush(&mut vp);

    let cx = vp.painter().base_x() + 500;
    vp.on_motion(cx, 100).unwrap();
    assert_eq!(vp.cursor_energy(), 500.0);

    vp.x_zoom_around_cursor(2.0).unwrap();
    assert_eq!(vp.state().offset, 250.0);
    assert_eq!(vp.state().x_visible, 500.0);
    assert_eq!(vp.coordinate_map().pixel_x_to_energy(f64::from(cx)), 500.0);
    assert_eq!(vp.cursor_energy(), 500.0);
}

#[test]
fn whole_pixel_pans_scroll_incrementally() {
    let config = ViewportConfig::default().with_x_region(0.0, 1000.0);
    let mut vp = viewport(widget_width(500), 300, config);
    vp.load_spectrum(spectrum(4000, |i| (i % 11) as f64)).unwrap();
    flush(&mut vp);
    assert_eq!(vp.state().y_visible, 20.0);
    assert_eq!(vp.coordinate_map().de_to_dx(10.0), 5.0);

    let requests = vp.surface().redraw_requests();
    vp.surface_mut().clear_ops();
    vp.set_offset(10.0).unwrap();
    vp.set_offset(20.0).unwrap();

    assert_eq!(vp.surface().count(Primitive::CopyArea), 2);
    assert_eq!(vp.surface().redraw_requests(), requests, "no full redraw");
    assert!(!vp.state().need_clear);

    let plot = vp.painter().plot_rect();
    let first = vp
        .surface()
        .ops()
        .iter()
        .find(|op| matches!(op, SurfaceOp::CopyArea { .. }));
    assert_eq!(
        first,
        Some(&SurfaceOp::CopyArea {
            gc: vp.painter().gcs().clear,
            src: PixelRect::new(plot.x + 5, plot.y, plot.width - 5, plot.height),
            dst: (plot.x, plot.y),
        })
    );
}

#[test]
fn sub_pixel_pan_forces_redraw() {
    let config = ViewportConfig::default().with_x_region(0.0, 1000.0);
    let mut vp = viewport(widget_width(500), 300, config);
    vp.load_spectrum(spectrum(4000, |_| 3.0)).unwrap();
    flush(&mut vp);
    assert!(!vp.state().need_clear);

    vp.surface_mut().clear_ops();
    vp.set_offset(0.8).unwrap();
    assert!(vp.state().need_clear);
    assert!(vp.surface().redraw_pending());
    assert_eq!(vp.surface().count(Primitive::CopyArea), 0);
}

#[test]
fn auto_scale_on_load() {
    let mut vp = viewport(widget_width(100), 200, ViewportConfig::default());
    vp.load_spectrum(spectrum(100, |i| if i == 10 { 42.0 } else { 1.0 }))
        .unwrap();
    assert_eq!(vp.state().y_visible, 42.0);

    vp.load_spectrum(spectrum(100, |i| if i == 10 { 7.0 } else { 1.0 }))
        .unwrap();
    assert_eq!(vp.state().y_visible, 20.0);
}

#[test]
fn log_floor_puts_empty_bins_on_baseline() {
    let config = ViewportConfig::default().with_log_scale(true);
    let mut vp = viewport(widget_width(100), 200, config);
    vp.load_spectrum(spectrum(100, |i| if i == 50 { 1.0 } else { 0.0 }))
        .unwrap();
    flush(&mut vp);

    let p = vp.painter();
    let (x0, y0) = (p.base_x(), p.baseline());
    assert_eq!(p.count_to_row(0.0), y0);
    assert!(p.count_to_row(1.0) < y0);

    assert_eq!(vp.surface().pixel(x0 + 10, y0), Some(spectrum_color()));
    assert_eq!(vp.surface().pixel(x0 + 10, y0 - 1), Some(background()));
    assert_eq!(vp.surface().pixel(x0 + 50, y0 - 1), Some(spectrum_color()));
}

#[test]
fn log_axis_labels_decades() {
    let config = ViewportConfig::default().with_log_scale(true);
    let mut vp = viewport(widget_width(100), 200, config);
    vp.load_spectrum(spectrum(100, |i| i as f64 * 3.0)).unwrap();
    flush(&mut vp);

    let texts: Vec<&str> = vp
        .surface()
        .labels()
        .iter()
        .map(|l| l.text.as_str())
        .collect();
    assert!(texts.contains(&"1"), "{texts:?}");
    assert!(texts.contains(&"10"), "{texts:?}");
    assert!(texts.contains(&"100"), "{texts:?}");
    assert!(!texts.contains(&"1000"), "{texts:?}");
}

#[test]
fn drag_pans_with_pointer() {
    let config = ViewportConfig::default().with_x_region(100.0, 1000.0);
    let mut vp = viewport(widget_width(500), 300, config);
    vp.load_spectrum(spectrum(4000, |_| 2.0)).unwrap();
    flush(&mut vp);

    vp.on_motion(300, 100).unwrap();
    vp.on_button(ButtonState::Press);
    vp.surface_mut().clear_ops();
    vp.on_motion(296, 100).unwrap();
    assert_eq!(vp.state().offset, 108.0);
    assert_eq!(vp.surface().count(Primitive::CopyArea), 1);

    vp.on_button(ButtonState::Release);
    vp.on_motion(250, 100).unwrap();
    assert_eq!(vp.state().offset, 108.0);
    assert_eq!(vp.state().cursor, (250, 100));
}

#[test]
fn y_zoom_disables_auto_scale() {
    let mut vp = viewport(widget_width(100), 200, ViewportConfig::default());
    vp.load_spectrum(spectrum(100, |_| 80.0)).unwrap();
    assert_eq!(vp.state().y_visible, 80.0);

    vp.y_zoom_around_cursor(2.0).unwrap();
    assert!(!vp.state().y_auto_scale);
    assert_eq!(vp.state().y_visible, 40.0);

    vp.y_zoom_around_cursor(10.0).unwrap();
    assert_eq!(vp.state().y_visible, 20.0, "floored at the minimum");

    vp.set_y_auto_scale(true).unwrap();
    assert_eq!(vp.state().y_visible, 80.0);
}

#[test]
fn region_setters_validate_input() {
    let mut vp = viewport(widget_width(100), 200, ViewportConfig::default());
    vp.set_x_visible_region(-5.0).unwrap();
    vp.set_offset(f64::INFINITY).unwrap();
    assert_eq!(vp.state().x_visible, 100.0);
    assert_eq!(vp.state().offset, 0.0);
    assert_eq!(vp.conditions(), Conditions::NUMERIC_DEGENERATE);

    vp.set_y_min_visible_region(50.0).unwrap();
    assert_eq!(vp.state().y_visible, 50.0);
    vp.set_y_visible_region(30.0).unwrap();
    assert_eq!(vp.state().y_visible, 50.0);
    assert!(!vp.state().y_auto_scale);

    flush(&mut vp);
    assert!(vp.conditions().is_empty(), "a full redraw clears conditions");
}

#[test]
fn to_begin_and_to_end() {
    let config = ViewportConfig::default().with_x_region(300.0, 200.0);
    let mut vp = viewport(widget_width(200), 200, config);
    vp.load_spectrum(spectrum(1001, |_| 1.0)).unwrap();
    vp.to_end().unwrap();
    assert_eq!(vp.state().offset, 800.0);
    vp.to_begin().unwrap();
    assert_eq!(vp.state().offset, 0.0);
    assert_eq!(vp.state().x_visible, 200.0);
}

#[test]
fn commands_need_a_spectrum() {
    let mut vp = viewport(widget_width(100), 200, ViewportConfig::default());
    vp.load_spectrum(spectrum(100, |_| 1.0)).unwrap();
    vp.unload_spectrum().unwrap();
    assert!(vp.spectrum().is_none());

    vp.x_zoom_around_cursor(2.0).unwrap();
    vp.y_zoom_around_cursor(2.0).unwrap();
    vp.to_end().unwrap();
    vp.on_scrollbar(10).unwrap();
    assert_eq!(vp.conditions(), Conditions::NO_SPECTRUM);
    assert_eq!(vp.state().x_visible, 100.0);
    assert_eq!(vp.state().offset, 0.0);
}

#[test]
fn reference_joins_auto_scale() {
    let mut vp = viewport(widget_width(100), 200, ViewportConfig::default());
    vp.load_spectrum(spectrum(100, |_| 30.0)).unwrap();
    vp.load_reference(spectrum(100, |_| 80.0)).unwrap();
    assert_eq!(vp.state().y_visible, 80.0);
    flush(&mut vp);

    let p = vp.painter();
    let reference = pack_color(Palette::default().reference);
    let x = p.base_x() + 20;
    // Reference shows above the foreground, which is drawn over it lower down.
    assert_eq!(vp.surface().pixel(x, p.count_to_row(70.0)), Some(reference));
    assert_eq!(vp.surface().pixel(x, p.count_to_row(20.0)), Some(spectrum_color()));

    vp.clear_reference().unwrap();
    assert_eq!(vp.state().y_visible, 30.0);
}

#[test]
fn markers_repaint_single_columns() {
    let mut vp = viewport(widget_width(100), 200, ViewportConfig::default());
    vp.load_spectrum(spectrum(100, |i| (i % 7) as f64)).unwrap();
    flush(&mut vp);
    let before = vp.surface().pixels().to_vec();

    vp.surface_mut().clear_ops();
    let id = vp.add_marker(40.0).unwrap();
    assert_eq!(vp.surface().ops().len(), 1);
    assert_eq!(vp.markers().len(), 1);
    let x = vp.painter().base_x() + 40;
    let marker = pack_color(Palette::default().marker);
    assert_eq!(vp.surface().pixel(x, vp.painter().baseline() - 1), Some(marker));

    assert!(vp.remove_marker(id).unwrap());
    assert!(!vp.remove_marker(id).unwrap());
    assert_eq!(vp.surface().pixels(), before.as_slice());
    assert!(vp.markers().is_empty());
}

#[test]
fn markers_share_columns_with_the_bins_they_mark() {
    // Two bins per pixel: the peak at bin 101 falls into plot column 50.
    let config = ViewportConfig::default().with_x_region(0.0, 1000.0);
    let mut vp = viewport(widget_width(500), 200, config);
    vp.load_spectrum(spectrum(1000, |i| if i == 101 { 100.0 } else { 0.0 }))
        .unwrap();
    flush(&mut vp);

    let (x0, w, row) = {
        let p = vp.painter();
        (p.base_x(), p.width(), p.baseline() - 1)
    };
    let peak: Vec<i32> = (x0..=x0 + w)
        .filter(|&x| vp.surface().pixel(x, row) == Some(spectrum_color()))
        .collect();
    assert_eq!(peak, vec![x0 + 50]);
    assert_eq!(vp.painter().energy_to_column(101.0), Some(x0 + 50));

    vp.add_marker(101.0).unwrap();
    let marker = pack_color(Palette::default().marker);
    assert_eq!(vp.surface().pixel(x0 + 50, row), Some(marker));
    assert_eq!(vp.surface().pixel(x0 + 51, row), Some(background()));
}

#[test]
fn custom_borders_and_palette() {
    let borders = Borders {
        left: 40,
        right: 10,
        top: 10,
        bottom: 20,
    };
    let palette = Palette {
        spectrum: Color::from_rgba8(0xff, 0x00, 0x80, 0xff),
        ..Palette::default()
    };
    let config = ViewportConfig::default()
        .with_borders(borders)
        .with_palette(palette);
    let mut vp = viewport(200, 150, config);
    vp.load_spectrum(spectrum(100, |_| 10.0)).unwrap();
    flush(&mut vp);

    let p = vp.painter();
    assert_eq!(p.base_x(), 42);
    assert_eq!(p.baseline(), 128);
    assert_eq!(p.width(), 200 - 40 - 10 - 4);
    let axis = pack_color(palette.axis);
    assert_eq!(vp.surface().pixel(40, 10), Some(axis), "frame corner");
    assert_eq!(
        vp.surface().pixel(p.base_x() + 3, p.baseline()),
        Some(pack_color(palette.spectrum))
    );
}

#[test]
fn view_mode_change_clears() {
    let mut vp = viewport(widget_width(100), 200, ViewportConfig::default());
    vp.load_spectrum(spectrum(100, |_| 10.0)).unwrap();
    flush(&mut vp);

    vp.set_view_mode(ViewMode::Filled).unwrap();
    assert!(!vp.surface().redraw_pending(), "same mode is a no-op");
    vp.set_view_mode(ViewMode::Dots).unwrap();
    assert!(vp.state().need_clear);
    flush(&mut vp);

    let p = vp.painter();
    let x = p.base_x() + 30;
    assert_eq!(vp.surface().pixel(x, p.baseline()), Some(background()));
    assert_eq!(vp.surface().pixel(x, p.count_to_row(10.0)), Some(spectrum_color()));
}

#[test]
fn scrollbar_follows_view_and_may_go_away() {
    let config = ViewportConfig::default().with_x_region(0.0, 1000.0);
    let mut vp = viewport(widget_width(500), 300, config);
    let bar = Rc::new(RefCell::new(RecordingScrollbar::default()));
    vp.set_scrollbar(&bar);
    assert_eq!(bar.borrow().range, Some((500, 500)));

    vp.load_spectrum(spectrum(5001, |_| 1.0)).unwrap();
    assert_eq!(bar.borrow().range, Some((2500, 500)));
    assert_eq!(bar.borrow().position, Some(0));

    vp.on_scrollbar(100).unwrap();
    assert_eq!(vp.state().offset, 200.0);
    assert_eq!(bar.borrow().position, Some(100));

    vp.on_scrollbar(10_000).unwrap();
    assert_eq!(vp.state().offset, 4000.0, "clamped to the end");

    drop(bar);
    vp.on_scrollbar(0).unwrap();
    assert_eq!(vp.state().offset, 0.0);
}

#[test]
fn degenerate_layout_suppresses_drawing() {
    let mut vp = viewport(40, 30, ViewportConfig::default());
    assert!(vp.conditions().contains(Conditions::LAYOUT_DEGENERATE));
    vp.load_spectrum(spectrum(100, |_| 1.0)).unwrap();
    vp.on_crossing(Crossing::Enter { x: 5, y: 5 }).unwrap();
    flush(&mut vp);
    assert!(
        vp.surface().ops().iter().all(|op| op.primitive().is_none()),
        "only redraw requests, no drawing"
    );
    assert!(!vp.state().cursor_visible);

    vp.surface_mut().resize(200, 150);
    vp.on_layout(200, 150).unwrap();
    assert!(!vp.conditions().contains(Conditions::LAYOUT_DEGENERATE));
    assert!(vp.state().cursor_visible, "crosshair restored for a hovering pointer");
    flush(&mut vp);
    assert!(vp.surface().count(Primitive::DrawRect) > 0);
    assert!(vp.state().cursor_visible);
}

#[test]
fn surface_failure_propagates_and_recovers() {
    let config = ViewportConfig::default().with_x_region(0.0, 1000.0);
    let mut vp = viewport(widget_width(500), 300, config);
    vp.load_spectrum(spectrum(4000, |_| 4.0)).unwrap();
    flush(&mut vp);
    vp.on_crossing(Crossing::Enter { x: 200, y: 100 }).unwrap();
    assert!(vp.state().cursor_visible);

    vp.surface_mut().fail_next(Primitive::CopyArea);
    let err = vp.set_offset(10.0).unwrap_err();
    assert_eq!(
        err,
        ViewportError::Surface(SurfaceError::Failed(Primitive::CopyArea))
    );
    assert!(vp.state().need_clear);
    assert!(vp.surface().redraw_pending());
    assert!(!vp.state().cursor_visible, "erased before the failed copy");

    flush(&mut vp);
    assert!(vp.state().cursor_visible);
    assert!(!vp.state().need_clear);
}

#[test]
fn failed_cursor_erase_keeps_parity() {
    let mut vp = viewport(widget_width(100), 200, ViewportConfig::default());
    vp.load_spectrum(spectrum(100, |_| 4.0)).unwrap();
    flush(&mut vp);
    vp.on_motion(90, 60).unwrap();
    let before = vp.surface().pixels().to_vec();

    vp.surface_mut().fail_next(Primitive::DrawLine);
    assert!(vp.on_motion(95, 70).is_err());
    assert!(vp.state().cursor_visible);
    assert_eq!(vp.surface().pixels(), before.as_slice());
    assert_eq!(vp.state().cursor, (90, 60));

    vp.on_motion(95, 70).unwrap();
    assert_eq!(vp.state().cursor, (95, 70));
    assert!(vp.state().cursor_visible);
}

#[test]
fn crossing_toggles_crosshair() {
    let mut vp = viewport(widget_width(100), 200, ViewportConfig::default());
    flush(&mut vp);
    let clean = vp.surface().pixels().to_vec();

    vp.on_crossing(Crossing::Enter { x: 70, y: 50 }).unwrap();
    assert!(vp.state().cursor_visible);
    assert_ne!(vp.surface().pixels(), clean.as_slice());

    vp.on_crossing(Crossing::Leave).unwrap();
    assert!(!vp.state().cursor_visible);
    assert_eq!(vp.surface().pixels(), clean.as_slice());
}

#[test]
fn cursor_data_reads_both_axes() {
    let config = ViewportConfig::default().with_y_auto_scale(false);
    let mut vp = viewport(widget_width(100), 204, config);
    let p = vp.painter();
    let (x0, y0, h) = (p.base_x(), p.baseline(), p.height());
    vp.on_motion(x0 + 25, y0 - h / 2).unwrap();
    let data = vp.cursor_data();
    assert_eq!(data.x, 25.0);
    assert_eq!(data.y, 50.0);
}
