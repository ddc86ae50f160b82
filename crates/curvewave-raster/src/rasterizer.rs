//! The rasterizer pipeline.
//!
//! `mesh -> Interpolator -> positioner stages -> CurveGenerator -> CurveSampler`
//!
//! A [`Rasterizer`] owns every intermediate product of the last run so the
//! editor can move a single control point and rebuild only the pieces and
//! samples that depend on it.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::curve::{CurvePiece, NUDGE_EPSILON};
use crate::error::{RasterError, RasterResult};
use crate::generator::CurveGenerator;
use crate::intercept::{Intercept, DEDUP_EPSILON};
use crate::mesh::{Interpolator, MeshCell, MeshProvider, MorphPosition};
use crate::params::RasterizerParameters;
use crate::path::{NoiseContext, PathProvider};
use crate::positioner::{position, PositionContext, Positioner, PreviousRunState};
use crate::sampler::CurveSampler;
use crate::tables::{CurveletTable, TransferTable};

/// Phase at which a run hands over to the next chained run.
pub const CHAIN_SEAM: f64 = 1.0;

/// Turns a mesh snapshot at a morph position into a sampleable waveform.
#[derive(Debug, Clone)]
pub struct Rasterizer {
    params: RasterizerParameters,
    stages: Vec<Positioner>,
    interpolator: Interpolator,
    generator: CurveGenerator,
    curvelets: Arc<CurveletTable>,
    paths: Option<Arc<dyn PathProvider>>,
    morph: MorphPosition,
    // Points only hold weak references to their cells.
    cells: Vec<Arc<MeshCell>>,
    points: Vec<Intercept>,
    pieces: Vec<CurvePiece>,
    sampler: CurveSampler,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new(RasterizerParameters::default())
    }
}

impl Rasterizer {
    /// Creates a rasterizer without path deformation.
    pub fn new(params: RasterizerParameters) -> Self {
        Self {
            stages: Positioner::default_chain(&params),
            interpolator: Interpolator::new(),
            generator: CurveGenerator::from_params(&params),
            curvelets: CurveletTable::shared(),
            paths: None,
            morph: MorphPosition::default(),
            cells: Vec::new(),
            points: Vec::new(),
            pieces: Vec::new(),
            sampler: CurveSampler::new(&params, TransferTable::shared(), None),
            params,
        }
    }

    /// Creates a rasterizer that deforms points and regions with `paths`.
    pub fn with_paths(params: RasterizerParameters, paths: Arc<dyn PathProvider>) -> Self {
        let mut rasterizer = Self::new(params);
        rasterizer.set_paths(Some(paths));
        rasterizer
    }

    /// Current parameters.
    pub fn params(&self) -> &RasterizerParameters {
        &self.params
    }

    /// Applies new parameters. Geometry is rebuilt on the next run.
    pub fn configure(&mut self, params: RasterizerParameters) {
        self.stages = Positioner::default_chain(&params);
        self.generator = CurveGenerator::from_params(&params);
        self.sampler.configure(&params);
        self.params = params;
    }

    /// Replaces the positioning stages used by later runs.
    pub fn set_stages(&mut self, stages: Vec<Positioner>) {
        self.stages = stages;
    }

    /// Positioning stages in order.
    pub fn stages(&self) -> &[Positioner] {
        &self.stages
    }

    /// Replaces the path provider.
    pub fn set_paths(&mut self, paths: Option<Arc<dyn PathProvider>>) {
        self.sampler.set_paths(paths.clone());
        self.paths = paths;
    }

    /// Changes lazy-deformation noise without rebuilding geometry.
    pub fn set_noise(&mut self, noise: NoiseContext) {
        self.params.noise_seed = noise.seed;
        self.params.noise_amount = noise.amount;
        self.sampler.set_noise(noise);
    }

    /// Evaluates `mesh` at `morph` and rebuilds the waveform.
    pub fn run<M: MeshProvider + ?Sized>(&mut self, mesh: &M, morph: MorphPosition) {
        self.run_chained(mesh, morph, None);
    }

    /// Like [`Rasterizer::run`], continuing from a previous run's seam.
    pub fn run_chained<M: MeshProvider + ?Sized>(
        &mut self,
        mesh: &M,
        morph: MorphPosition,
        previous: Option<&PreviousRunState>,
    ) {
        let cells = mesh.cells_at(&morph);
        let raw = self.interpolator.interpolate_cells(&cells, &morph);
        self.rasterize(raw, morph, previous);
        self.cells = cells;
    }

    /// Rebuilds the waveform from raw control points.
    ///
    /// Fewer than two points leave the waveform unsampleable. Cells the
    /// points refer to must be kept alive by the caller for path deformation
    /// to see them.
    pub fn rasterize(
        &mut self,
        points: Vec<Intercept>,
        morph: MorphPosition,
        previous: Option<&PreviousRunState>,
    ) {
        self.morph = morph;
        self.cells.clear();
        if points.len() < 2 {
            debug!("rasterize: {} control points, unsampleable", points.len());
            self.points.clear();
            self.pieces.clear();
            self.sampler.build_from_curves(&self.pieces);
            return;
        }

        let raw_count = points.len();
        let ctx = PositionContext {
            params: &self.params,
            morph,
            paths: self.paths.as_deref(),
            previous,
        };
        self.points = position(points, &self.stages, &ctx);
        self.pieces = self.generator.generate(&self.points, &self.curvelets);
        self.sampler.build_from_curves(&self.pieces);

        debug!(
            "rasterize: {} raw -> {} positioned points, {} pieces, {} samples",
            raw_count,
            self.points.len(),
            self.pieces.len(),
            self.sampler.wave_x().len()
        );
    }

    /// Replaces positioned point `index` and rebuilds the pieces that depend
    /// on it.
    ///
    /// The new phase is clamped between the neighboring points so the list
    /// stays sorted. Pad and wrap flags of the replaced point are kept. In
    /// cyclic mode every periodic copy of the point receives the same edit,
    /// shifted by its whole number of periods.
    ///
    /// # Arguments
    /// * `index` - Index into [`Rasterizer::points`], pads and copies included
    /// * `point` - Replacement phase, amplitude and sharpness
    ///
    /// # Errors
    /// [`RasterError::IndexOutOfRange`] when `index` is past the last point
    pub fn update_curve(&mut self, index: usize, point: Intercept) -> RasterResult<()> {
        let len = self.points.len();
        if index >= len {
            return Err(RasterError::IndexOutOfRange { index, len });
        }

        let copies = if self.params.cyclic {
            self.periodic_copies(index)
        } else {
            Vec::new()
        };
        let edited = self.replace_point(index, point);
        for (copy, periods) in copies {
            self.replace_point(copy, edited.shifted(periods));
        }
        Ok(())
    }

    /// Indices of the wrapped copies of `points[index]` and their offsets in
    /// periods.
    fn periodic_copies(&self, index: usize) -> Vec<(usize, f64)> {
        let source = &self.points[index];
        self.points
            .iter()
            .enumerate()
            .filter_map(|(j, p)| {
                let periods = (p.adjusted_x - source.adjusted_x).round();
                let copy = j != index
                    && periods != 0.0
                    && (p.adjusted_x - (source.adjusted_x + periods)).abs() < DEDUP_EPSILON
                    && (p.x - (source.x + periods)).abs() < DEDUP_EPSILON
                    && p.y == source.y
                    && p.shp == source.shp;
                copy.then_some((j, periods))
            })
            .collect()
    }

    /// Stores `point` at `index` and rebuilds its dirty window. Returns the
    /// point as stored.
    fn replace_point(&mut self, index: usize, point: Intercept) -> Intercept {
        let old = &self.points[index];
        let mut point = Intercept {
            pad_before: old.pad_before,
            pad_after: old.pad_after,
            is_wrapped: old.is_wrapped,
            ..point
        };
        if !point.adjusted_x.is_finite() {
            point.adjusted_x = old.adjusted_x;
        }
        if let Some(prev) = index.checked_sub(1).map(|i| &self.points[i]) {
            point.adjusted_x = point.adjusted_x.max(prev.adjusted_x + NUDGE_EPSILON);
        }
        if let Some(next) = self.points.get(index + 1) {
            point.adjusted_x = point.adjusted_x.min(next.adjusted_x - NUDGE_EPSILON);
        }
        point.shp = if point.shp.is_finite() {
            point.shp.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.points[index] = point.clone();

        if self.pieces.is_empty() {
            return point;
        }
        let window = self.generator.dirty_window(&self.points, &self.pieces, index);
        self.generator
            .regenerate_window(&self.points, &mut self.pieces, window.clone(), &self.curvelets);
        self.sampler.rebuild_window(&self.pieces, window.clone());

        trace!("update_curve: point {} -> pieces {:?}", index, window);
        point
    }

    /// Value at phase `x`.
    pub fn sample_at(&self, x: f64) -> f64 {
        self.sampler.sample_at(x)
    }

    /// Fills `buffer`, advancing the oscillator phase by `delta` per sample.
    pub fn sample_to_buffer(&mut self, buffer: &mut [f64], delta: f64) {
        self.sampler.sample_to_buffer(buffer, delta);
    }

    /// Whether the last run produced a usable waveform.
    pub fn is_sampleable(&self) -> bool {
        self.sampler.is_sampleable()
    }

    /// Seam state for the next chained run.
    pub fn run_state(&self) -> PreviousRunState {
        PreviousRunState::capture(&self.points, CHAIN_SEAM)
    }

    /// Morph position of the last run.
    pub fn morph(&self) -> MorphPosition {
        self.morph
    }

    /// Positioned control points of the last run.
    pub fn points(&self) -> &[Intercept] {
        &self.points
    }

    /// Curve pieces of the last run.
    pub fn pieces(&self) -> &[CurvePiece] {
        &self.pieces
    }

    /// Sampler holding the current waveform.
    pub fn sampler(&self) -> &CurveSampler {
        &self.sampler
    }

    /// Mutable sampler access for phase control.
    pub fn sampler_mut(&mut self) -> &mut CurveSampler {
        &mut self.sampler
    }
}
