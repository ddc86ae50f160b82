//! Tests for the curve sampler.

use std::sync::Arc;

use super::*;
use crate::curve::CurvePiece;
use crate::generator::CurveGenerator;
use crate::intercept::Intercept;
use crate::mesh::{CellPath, MeshCell, MorphAxis, MorphPosition};
use crate::params::{DeformMode, RasterizerParameters, ScalingType};
use crate::path::{NoiseContext, PathProvider};
use crate::positioner::{position, PositionContext, Positioner};
use crate::tables::{CurveletTable, TransferTable};
use pretty_assertions::assert_eq;

/// Jitter equal to progress plus the noise seed.
#[derive(Debug)]
struct RampPath;

impl PathProvider for RampPath {
    fn jitter(&self, _channel: usize, progress: f64, noise: NoiseContext) -> f64 {
        progress + noise.seed as f64
    }
}

fn raw(points: &[(f64, f64, f64)]) -> Vec<Intercept> {
    points
        .iter()
        .map(|&(x, y, shp)| Intercept::new(x, y, shp))
        .collect()
}

fn pieces_for(params: &RasterizerParameters, points: Vec<Intercept>) -> (Vec<Intercept>, Vec<CurvePiece>) {
    let ctx = PositionContext::new(params, MorphPosition::default());
    let positioned = position(points, &Positioner::default_chain(params), &ctx);
    let pieces = CurveGenerator::from_params(params).generate(&positioned, &CurveletTable::shared());
    (positioned, pieces)
}

fn sampler_for(
    params: &RasterizerParameters,
    points: Vec<Intercept>,
    paths: Option<Arc<dyn PathProvider>>,
) -> CurveSampler {
    let (_, pieces) = pieces_for(params, points);
    let mut sampler = CurveSampler::new(params, TransferTable::shared(), paths);
    sampler.build_from_curves(&pieces);
    sampler
}

fn fold(x: f64) -> f64 {
    let r = x.rem_euclid(1.0);
    if r >= 1.0 {
        0.0
    } else {
        r
    }
}

fn triangle() -> Vec<Intercept> {
    raw(&[(0.0, 0.0, 0.0), (0.5, 1.0, 0.0), (1.0, 0.0, 0.0)])
}

#[test]
fn test_triangle_envelope() {
    let params = RasterizerParameters::envelope(None);
    let sampler = sampler_for(&params, triangle(), None);

    assert!(sampler.is_sampleable());
    assert!((sampler.sample_at(0.0) - 0.0).abs() < 1e-9);
    assert!((sampler.sample_at(0.25) - 0.5).abs() < 1e-9);
    assert!((sampler.sample_at(0.5) - 1.0).abs() < 1e-9);
    assert!((sampler.sample_at(0.75) - 0.5).abs() < 1e-9);
    assert!((sampler.slope_at_phase(0.2) - 2.0).abs() < 1e-6);
    assert!((sampler.slope_at_phase(0.8) + 2.0).abs() < 1e-6);

    // Outside the padded range the ends are held.
    assert!(sampler.sample_at(-4.0).abs() < 1e-12);
    assert!(sampler.sample_at(4.0).abs() < 1e-12);
}

#[test]
fn test_sample_layout() {
    let params = RasterizerParameters::envelope(None);
    let (_, pieces) = pieces_for(&params, triangle());
    let mut sampler = CurveSampler::new(&params, TransferTable::shared(), None);
    sampler.build_from_curves(&pieces);

    let starts = sampler.segment_starts();
    assert_eq!(starts.len(), pieces.len() + 2);
    assert_eq!(starts[0], 0);
    assert_eq!(*starts.last().unwrap(), sampler.wave_x().len());
    assert!(sampler.wave_x().windows(2).all(|w| w[0] < w[1]));
    assert_eq!(sampler.slopes().len(), sampler.wave_x().len() - 1);

    assert!(sampler.wave_x()[sampler.zero_index()].abs() < 1e-9);
    assert!((sampler.wave_x()[sampler.one_index()] - 1.0).abs() < 1e-9);
}

#[test]
fn test_zero_sharpness_is_linear() {
    let params = RasterizerParameters::envelope(None);
    let pts = [(0.0, 0.1, 0.0), (0.2, 0.9, 0.0), (0.45, 0.4, 0.0), (0.8, 0.6, 0.0), (1.0, 0.0, 0.0)];
    let sampler = sampler_for(&params, raw(&pts), None);

    for pair in pts.windows(2) {
        let (x0, y0, _) = pair[0];
        let (x1, y1, _) = pair[1];
        for t in [0.1, 0.5, 0.9] {
            let x = x0 + t * (x1 - x0);
            let expected = y0 + t * (y1 - y0);
            assert!(
                (sampler.sample_at(x) - expected).abs() < 1e-9,
                "x = {x}: {} vs {expected}",
                sampler.sample_at(x)
            );
        }
    }
}

#[test]
fn test_sharp_points_bulge() {
    let params = RasterizerParameters::envelope(None);
    let soft = sampler_for(&params, triangle(), None);
    let sharp = sampler_for(
        &params,
        raw(&[(0.0, 0.0, 0.0), (0.5, 1.0, 1.0), (1.0, 0.0, 0.0)]),
        None,
    );
    // A sharp peak holds its level longer on both sides.
    assert!(sharp.sample_at(0.3) > soft.sample_at(0.3));
    assert!(sharp.sample_at(0.7) > soft.sample_at(0.7));
}

#[test]
fn test_cyclic_period() {
    let params = RasterizerParameters::oscillator(ScalingType::Bipolar);
    let sampler = sampler_for(
        &params,
        raw(&[(0.1, 0.2, 0.5), (0.4, 0.9, 0.8), (0.7, 0.3, 0.2)]),
        None,
    );

    for x in [0.0, 0.05, 0.33, 0.61, 0.95] {
        let a = sampler.sample_at(x);
        let b = sampler.sample_at(x + 1.0);
        let c = sampler.sample_at(x - 3.0);
        assert!((a - b).abs() < 1e-9, "x = {x}");
        assert!((a - c).abs() < 1e-9, "x = {x}");
        assert!((sampler.slope_at_phase(x) - sampler.slope_at_phase(x + 1.0)).abs() < 1e-6);
    }
    // Bipolar scaling maps the 0.9 peak to 0.8.
    assert!((sampler.sample_at(0.4) - 0.8).abs() < 1e-9);
}

#[test]
fn test_buffer_matches_random_access() {
    let mut params = RasterizerParameters::oscillator(ScalingType::Unipolar);
    params.osc_phase = 0.3;
    let mut sampler = sampler_for(
        &params,
        raw(&[(0.0, 0.5, 0.0), (0.3, 1.0, 0.6), (0.6, 0.0, 0.9), (0.9, 0.4, 0.1)]),
        None,
    );

    let delta = 0.013;
    let mut phase = 0.3;
    let expected: Vec<f64> = (0..300)
        .map(|_| {
            let value = sampler.sample_at(phase);
            phase = fold(phase + delta);
            value
        })
        .collect();

    let mut buffer = vec![0.0; 300];
    sampler.sample_to_buffer(&mut buffer[..120], delta);
    sampler.sample_to_buffer(&mut buffer[120..], delta);
    assert_eq!(buffer, expected);
    assert_eq!(sampler.phase(), phase);
}

#[test]
fn test_buffer_walks_backwards() {
    let params = RasterizerParameters::oscillator(ScalingType::HalfBipolar);
    let mut sampler = sampler_for(
        &params,
        raw(&[(0.2, 0.1, 0.3), (0.5, 0.8, 0.3), (0.8, 0.5, 0.7)]),
        None,
    );
    sampler.set_phase(0.9);

    let delta = -0.021;
    let mut phase = 0.9;
    let expected: Vec<f64> = (0..200)
        .map(|_| {
            let value = sampler.sample_at(phase);
            phase = fold(phase + delta);
            value
        })
        .collect();

    let mut buffer = vec![0.0; 200];
    sampler.sample_to_buffer(&mut buffer, delta);
    assert_eq!(buffer, expected);
}

#[test]
fn test_envelope_buffer_runs_past_end() {
    let params = RasterizerParameters::envelope(None);
    let mut sampler = sampler_for(&params, triangle(), None);

    let mut buffer = vec![0.0; 150];
    sampler.sample_to_buffer(&mut buffer, 0.01);

    let mut phase = 0.0;
    for value in &buffer {
        assert_eq!(*value, sampler.sample_at(phase));
        phase += 0.01;
    }
    assert!(buffer[149].abs() < 1e-12);
}

#[test]
fn test_unsampleable_is_neutral() {
    let params = RasterizerParameters::default();
    let mut sampler = CurveSampler::new(&params, TransferTable::shared(), None);
    assert!(!sampler.is_sampleable());
    assert_eq!(sampler.sample_at(0.5), NEUTRAL_VALUE);

    let (_, pieces) = pieces_for(&RasterizerParameters::envelope(None), triangle());
    sampler.build_from_curves(&pieces[..1]);
    assert!(!sampler.is_sampleable());

    let mut buffer = vec![1.0; 16];
    sampler.sample_to_buffer(&mut buffer, 0.1);
    assert!(buffer.iter().all(|&v| v == NEUTRAL_VALUE));
}

#[test]
fn test_rebuild_window_matches_full_build() {
    let params = RasterizerParameters::envelope(None);
    let generator = CurveGenerator::from_params(&params);
    let table = CurveletTable::shared();
    let (mut points, mut pieces) = pieces_for(
        &params,
        raw(&[
            (0.0, 0.0, 0.2),
            (0.15, 0.7, 0.9),
            (0.3, 0.2, 0.5),
            (0.45, 0.9, 0.0),
            (0.6, 0.4, 0.3),
            (0.75, 1.0, 0.6),
            (0.9, 0.1, 0.4),
            (1.0, 0.3, 0.0),
        ]),
    );
    let mut sampler = CurveSampler::new(&params, TransferTable::shared(), None);
    sampler.build_from_curves(&pieces);

    // Edit positioned point 4 (raw point 3), which sits in pieces 2..=4.
    points[4].y = 0.1;
    points[4].shp = 1.0;
    points[4].adjusted_x += 0.02;
    generator.regenerate_window(&points, &mut pieces, 2..5, &table);
    sampler.rebuild_window(&pieces, 2..5);

    let mut full = CurveSampler::new(&params, TransferTable::shared(), None);
    full.build_from_curves(&generator.generate(&points, &table));

    assert_eq!(sampler.segment_starts(), full.segment_starts());
    assert_eq!(sampler.wave_x(), full.wave_x());
    assert_eq!(sampler.wave_y(), full.wave_y());
    assert_eq!(sampler.slopes(), full.slopes());
    assert_eq!(sampler.sample_at(0.47), full.sample_at(0.47));
}

fn deformed_points() -> (Arc<MeshCell>, Vec<Intercept>) {
    let cell = Arc::new(
        MeshCell::uniform(
            MorphPosition::new(0.0, 0.0, 0.0),
            MorphPosition::new(1.0, 1.0, 1.0),
            0.5,
            0.6,
            0.0,
        )
        .with_path(CellPath {
            channel: 2,
            axis: MorphAxis::Time,
            phase_gain: 0.0,
            amp_gain: 0.5,
        }),
    );
    let points = vec![
        Intercept::new(0.0, 0.2, 0.0),
        Intercept::new(0.5, 0.6, 0.0).with_cell(&cell),
        Intercept::new(1.0, 0.2, 0.0),
    ];
    (cell, points)
}

#[test]
fn test_lazy_deformation_regions() {
    let (_cell, points) = deformed_points();
    let params = RasterizerParameters {
        deform_mode: DeformMode::Lazy,
        ..RasterizerParameters::envelope(None)
    };
    let plain = sampler_for(&params, points.clone(), None);
    let mut lazy = sampler_for(&params, points, Some(Arc::new(RampPath)));

    assert_eq!(lazy.regions().len(), 1);
    let region = lazy.regions()[0];
    assert_eq!(region.channel, 2);
    assert_eq!(region.amplitude, 0.5);
    assert!(!region.is_empty());

    let base = lazy.sample_at(0.5) - plain.sample_at(0.5);
    assert!(base > 0.0);
    // Pad segment lies outside the region.
    assert_eq!(lazy.sample_at(-0.1), plain.sample_at(-0.1));

    lazy.set_noise(NoiseContext { seed: 3, amount: 0.0 });
    let reseeded = lazy.sample_at(0.5) - plain.sample_at(0.5);
    assert!((reseeded - base - 1.5).abs() < 1e-9);
}

#[test]
fn test_inline_deformation_is_baked() {
    let (_cell, points) = deformed_points();
    let params = RasterizerParameters::envelope(None);
    let plain = sampler_for(&params, points.clone(), None);
    let mut inline = sampler_for(&params, points, Some(Arc::new(RampPath)));

    let before = inline.sample_at(0.5);
    assert!(before > plain.sample_at(0.5));

    // Baked jitter does not follow later noise changes.
    inline.set_noise(NoiseContext { seed: 3, amount: 0.0 });
    assert_eq!(inline.sample_at(0.5), before);
}
