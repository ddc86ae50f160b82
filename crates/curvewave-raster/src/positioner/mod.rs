//! Control-point positioning stages.
//!
//! Positioning turns the raw interpolated points into the list handed to the
//! curve generator. Each stage takes ownership of the list and returns the
//! adjusted list plus a flag asking for a re-sort; [`position`] folds the
//! stages and re-sorts between them when asked.
//!
//! The set of stages is closed, so they are variants of [`Positioner`]
//! chosen when the pipeline is configured.

mod chaining;
mod cyclic;
mod deform;
mod padding;
mod sustain;


pub use chaining::PreviousRunState;
pub use cyclic::MIN_WRAP_ITERATIONS;
pub use sustain::{SUSTAIN_HOLD, SUSTAIN_THRESHOLD};

use crate::intercept::{sort_and_dedup, Intercept};
use crate::mesh::MorphPosition;
use crate::params::RasterizerParameters;
use crate::path::PathProvider;

/// Inputs shared by every stage of one pipeline run.
#[derive(Debug, Clone, Copy)]
pub struct PositionContext<'a> {
    /// Pipeline configuration.
    pub params: &'a RasterizerParameters,
    /// Morph position the points were evaluated at.
    pub morph: MorphPosition,
    /// Path jitter source for deformation.
    pub paths: Option<&'a dyn PathProvider>,
    /// State carried over from the previous run, for chaining.
    pub previous: Option<&'a PreviousRunState>,
}

impl<'a> PositionContext<'a> {
    /// Context with no paths and no previous run.
    pub fn new(params: &'a RasterizerParameters, morph: MorphPosition) -> Self {
        Self {
            params,
            morph,
            paths: None,
            previous: None,
        }
    }
}

/// Output of one stage.
#[derive(Debug, Clone)]
pub struct Positioned {
    /// Adjusted points.
    pub points: Vec<Intercept>,
    /// The list may be out of order or contain duplicates.
    pub needs_resort: bool,
}

impl Positioned {
    /// Points that need no re-sort.
    pub fn sorted(points: Vec<Intercept>) -> Self {
        Self {
            points,
            needs_resort: false,
        }
    }

    /// Points that must be re-sorted before use.
    pub fn unsorted(points: Vec<Intercept>) -> Self {
        Self {
            points,
            needs_resort: true,
        }
    }
}

/// One positioning stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Positioner {
    /// Flat boundary copies beyond each end (clamped curves).
    Padding,
    /// Whole-period copies from the opposite end (periodic curves).
    CyclicWrap,
    /// Path jitter on points whose cell references a path.
    PathDeform,
    /// Seam continuity with the previous run.
    Chaining,
    /// Hold point after the envelope's sustain point.
    EnvelopeSustain,
}

impl Positioner {
    /// Applies this stage.
    pub fn adjust(self, points: Vec<Intercept>, ctx: &PositionContext<'_>) -> Positioned {
        match self {
            Positioner::Padding => padding::adjust(points, ctx.params.effective_padding()),
            Positioner::CyclicWrap => cyclic::adjust(points, ctx.params.effective_padding()),
            Positioner::PathDeform => deform::adjust(points, ctx),
            Positioner::Chaining => chaining::adjust(points, ctx.previous),
            Positioner::EnvelopeSustain => sustain::adjust(points, ctx.params),
        }
    }

    /// Default stage order for a configuration.
    pub fn default_chain(params: &RasterizerParameters) -> Vec<Positioner> {
        if params.cyclic {
            vec![Positioner::PathDeform, Positioner::CyclicWrap]
        } else {
            vec![
                Positioner::PathDeform,
                Positioner::EnvelopeSustain,
                Positioner::Padding,
                Positioner::Chaining,
            ]
        }
    }
}

/// Runs `stages` over `points` in order, re-sorting whenever a stage asks.
pub fn position(
    points: Vec<Intercept>,
    stages: &[Positioner],
    ctx: &PositionContext<'_>,
) -> Vec<Intercept> {
    stages.iter().fold(points, |points, stage| {
        let Positioned {
            mut points,
            needs_resort,
        } = stage.adjust(points, ctx);
        if needs_resort {
            sort_and_dedup(&mut points);
        }
        points
    })
}
