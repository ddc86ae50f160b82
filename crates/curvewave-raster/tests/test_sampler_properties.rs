//! Sampling properties across configurations.

use curvewave_raster::tables::CURVELET_RESOLUTION;
use curvewave_raster::{
    CurveletTable, Intercept, MorphPosition, Rasterizer, RasterizerParameters, ScalingType, TransferTable,
};

fn raw(points: &[(f64, f64, f64)]) -> Vec<Intercept> {
    points
        .iter()
        .map(|&(x, y, shp)| Intercept::new(x, y, shp))
        .collect()
}

fn wobbly() -> Vec<Intercept> {
    raw(&[
        (0.0, 0.5, 0.0),
        (0.12, 0.9, 0.7),
        (0.3, 0.1, 0.2),
        (0.52, 0.8, 1.0),
        (0.7, 0.3, 0.5),
        (0.88, 0.6, 0.9),
    ])
}

fn oscillator(scaling: ScalingType, points: Vec<Intercept>) -> Rasterizer {
    let mut rasterizer = Rasterizer::new(RasterizerParameters::oscillator(scaling));
    rasterizer.rasterize(points, MorphPosition::default(), None);
    rasterizer
}

#[test]
fn test_cyclic_waveform_is_periodic() {
    for scaling in [ScalingType::Unipolar, ScalingType::Bipolar, ScalingType::HalfBipolar] {
        let rasterizer = oscillator(scaling, wobbly());
        let sampler = rasterizer.sampler();
        for i in 0..50 {
            let x = i as f64 / 50.0 + 0.003;
            assert!((sampler.sample_at(x) - sampler.sample_at(x + 1.0)).abs() < 1e-9);
            assert!((sampler.sample_at(x) - sampler.sample_at(x - 2.0)).abs() < 1e-9);
            assert!((sampler.slope_at_phase(x) - sampler.slope_at_phase(x + 1.0)).abs() < 1e-6);
        }
    }
}

#[test]
fn test_cyclic_seam_is_continuous() {
    let rasterizer = oscillator(ScalingType::Bipolar, wobbly());
    let before = rasterizer.sample_at(1.0 - 1e-9);
    let after = rasterizer.sample_at(0.0);
    assert!((before - after).abs() < 1e-6);
}

#[test]
fn test_buffer_matches_random_access() {
    let mut params = RasterizerParameters::oscillator(ScalingType::Bipolar);
    params.osc_phase = 0.61;
    let mut rasterizer = Rasterizer::new(params);
    rasterizer.rasterize(wobbly(), MorphPosition::default(), None);

    let delta = 440.0 / 44_100.0;
    let mut phase: f64 = 0.61;
    let mut expected = Vec::with_capacity(1024);
    for _ in 0..1024 {
        expected.push(rasterizer.sample_at(phase));
        phase = (phase + delta).rem_euclid(1.0);
        if phase >= 1.0 {
            phase = 0.0;
        }
    }

    let mut buffer = vec![0.0; 1024];
    for block in buffer.chunks_mut(64) {
        rasterizer.sample_to_buffer(block, delta);
    }
    assert_eq!(buffer, expected);
}

#[test]
fn test_output_stays_within_control_range_for_soft_points() {
    // Zero sharpness is piecewise linear, so it never overshoots.
    let points = raw(&[(0.0, 0.2, 0.0), (0.25, 0.9, 0.0), (0.5, 0.4, 0.0), (0.75, 0.7, 0.0)]);
    let rasterizer = oscillator(ScalingType::Unipolar, points);
    for i in 0..200 {
        let v = rasterizer.sample_at(i as f64 / 200.0);
        assert!((0.2 - 1e-9..=0.9 + 1e-9).contains(&v), "{v}");
    }
    assert!((rasterizer.sample_at(0.125) - 0.55).abs() < 1e-9);
}

#[test]
fn test_shared_tables() {
    let a = CurveletTable::shared();
    let b = CurveletTable::shared();
    assert!(std::sync::Arc::ptr_eq(&a, &b));

    let identity = a.row(0, 0);
    assert_eq!(identity.len(), CURVELET_RESOLUTION);
    assert_eq!(identity[0], 0.0);
    assert_eq!(identity[CURVELET_RESOLUTION - 1], 1.0);

    let transfer = TransferTable::shared();
    assert_eq!(transfer.weight(0.0), 0.0);
    assert_eq!(transfer.weight(1.0), 1.0);
    assert!((transfer.weight(0.5) - 0.5).abs() < 1e-3);
}
