//! Terrain shaping configuration.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// An opaque `f32 -> f32` remapping applied to normalized heights before
/// the height multiplier.
///
/// The curve is evaluated once per vertex during mesh construction. It is
/// expected to map `[0, 1]` into a sensible height fraction but is not
/// required to be monotonic. The default curve is the identity.
#[derive(Clone)]
pub struct HeightCurve(Arc<dyn Fn(f32) -> f32 + Send + Sync>);

impl HeightCurve {
    /// Wraps an arbitrary remapping function.
    pub fn new(curve: impl Fn(f32) -> f32 + Send + Sync + 'static) -> Self {
        Self(Arc::new(curve))
    }

    /// The identity curve: heights pass through unchanged.
    pub fn identity() -> Self {
        Self::new(|t| t)
    }

    /// A curve that flattens low terrain into plains below `floor`,
    /// keeping everything above it.
    pub fn plains_floor(floor: f32) -> Self {
        Self::new(move |t| if t < floor { 0.0 } else { (t - floor) / (1.0 - floor) })
    }

    /// Evaluates the curve at `t`.
    pub fn evaluate(&self, t: f32) -> f32 {
        (self.0)(t)
    }
}

impl Default for HeightCurve {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Debug for HeightCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HeightCurve(..)")
    }
}

/// Configuration for terrain shaping and material forwarding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainConfig {
    /// Vertical exaggeration applied after the height curve.
    pub height_multiplier: f32,
    /// Remapping applied to normalized heights before the multiplier.
    /// Not serialized; deserialized configs get the identity curve.
    #[serde(skip)]
    pub height_curve: HeightCurve,
    /// Subtract a falloff mask from the height grid (island terrain).
    pub use_falloff: bool,
    /// Uniform world-space scale the host applies to the finished mesh.
    pub uniform_scale: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            height_multiplier: 20.0,
            height_curve: HeightCurve::identity(),
            use_falloff: false,
            uniform_scale: 1.0,
        }
    }
}

impl TerrainConfig {
    /// Creates an island configuration (falloff enabled).
    pub fn island() -> Self {
        Self {
            use_falloff: true,
            ..Default::default()
        }
    }

    /// The lowest world-space height this configuration can produce.
    ///
    /// Forwarded to the material collaborator whenever a new height grid
    /// is generated, so its height-to-color ramp can be rescaled.
    pub fn min_height(&self) -> f32 {
        self.uniform_scale * self.height_multiplier * self.height_curve.evaluate(0.0)
    }

    /// The highest world-space height this configuration can produce.
    pub fn max_height(&self) -> f32 {
        self.uniform_scale * self.height_multiplier * self.height_curve.evaluate(1.0)
    }
}
