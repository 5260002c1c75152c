// Copyright 2025 the Specview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use specview_surface_ref::RasterSurface;
use specview_viewport::{
    CoordinateMap, DisplaySpectrum, Histogram, Spectrum, Viewport, ViewportConfig,
};

#[derive(Clone)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u32(&mut self) -> u32 {
        // Numerical Recipes LCG parameters.
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 32) as u32
    }
}

fn random_spectrum(bins: usize, seed: u64) -> Arc<dyn Spectrum> {
    let mut rng = Lcg::new(seed);
    Arc::new(Histogram::from_counts(
        (0..bins).map(|_| f64::from(rng.next_u32() % 10_000)),
    ))
}

/// Laid-out, fully drawn viewport with `plot_width` pixels over `2 · plot_width` energy units.
fn drawn_viewport(plot_width: u32, data: &Arc<dyn Spectrum>) -> Viewport<RasterSurface> {
    let (width, height) = (plot_width + 67, 400);
    let config = ViewportConfig::default()
        .with_x_region(0.0, 2.0 * f64::from(plot_width))
        .with_y_region(10_000.0, 20.0)
        .with_y_auto_scale(false);
    let mut vp = Viewport::new(RasterSurface::new(width, height), config);
    vp.on_layout(width, height).expect("layout");
    vp.load_spectrum(data.clone()).expect("load");
    while vp.surface_mut().take_redraw_request() {
        vp.on_expose().expect("expose");
    }
    vp.surface_mut().clear_ops();
    vp
}

fn bench_viewport(c: &mut Criterion) {
    let mut group = c.benchmark_group("specview_viewport");
    group.sample_size(50);

    for &plot_width in &[256_u32, 1024_u32] {
        let data = random_spectrum(16_384, 0x5bec_0000_0000_0001);

        // Whole-pixel pans take the block-copy path.
        for &shift in &[4_i32, 64_i32] {
            group.bench_function(format!("pan_shift(w={plot_width},dx={shift})"), |b| {
                b.iter_batched(
                    || drawn_viewport(plot_width, &data),
                    |mut vp| {
                        let step = 2.0 * f64::from(shift);
                        for i in 0..8 {
                            let dir = if i % 2 == 0 { 1.0 } else { -1.0 };
                            vp.set_offset(vp.state().offset + dir * step)
                                .expect("pan");
                        }
                        black_box(vp.surface().ops().len());
                    },
                    BatchSize::LargeInput,
                );
            });
        }

        group.bench_function(format!("full_redraw(w={plot_width})"), |b| {
            b.iter_batched(
                || drawn_viewport(plot_width, &data),
                |mut vp| {
                    vp.update(true).expect("update");
                    vp.on_expose().expect("expose");
                    black_box(vp.surface().ops().len());
                },
                BatchSize::LargeInput,
            );
        });

        group.bench_function(format!("display_rebuild(w={plot_width})"), |b| {
            let mut disp = DisplaySpectrum::new(data.clone());
            let mut map = CoordinateMap::new(0.0, 16_384.0, 100.0);
            map.set_size(plot_size(plot_width));
            b.iter(|| {
                disp.invalidate();
                black_box(disp.y_auto_zoom(&map));
            });
        });
    }

    group.finish();
}

fn plot_size(plot_width: u32) -> kurbo::Size {
    kurbo::Size::new(f64::from(plot_width), 300.0)
}

criterion_group!(benches, bench_viewport);
criterion_main!(benches);
