//! Material layer parameters forwarded to the host's material system.
//!
//! The core does not interpret these values; it carries them to whatever
//! binds shader parameters on the host side, and keeps the height-range
//! scalars that the host's height-to-color ramp is rescaled with each
//! time a new height grid is generated.

use image::RgbImage;

/// One texture layer of the terrain material, opaque to this crate.
#[derive(Debug, Clone, Default)]
pub struct TextureLayer {
    /// Base tint color (linear RGB).
    pub tint: [f32; 3],
    /// How strongly the tint overrides the texture, in [0, 1].
    pub tint_strength: f32,
    /// Normalized height at which this layer starts, in [0, 1].
    pub start_height: f32,
    /// Blend band width into the next layer, in [0, 1].
    pub blend_strength: f32,
    /// World-space tiling scale of the layer texture.
    pub texture_scale: f32,
    /// Gradient lookup value, in [0, 1].
    pub gradient_value: f32,
    /// The layer texture, if any.
    pub texture: Option<RgbImage>,
}

/// Receives forwarded material parameters on the host side.
pub trait MaterialBinder {
    /// Binds the ordered layer stack.
    fn bind_layers(&mut self, layers: &[TextureLayer]);

    /// Binds the world-space height range of the current terrain.
    fn set_height_range(&mut self, min_height: f32, max_height: f32);
}

/// The terrain material parameter set.
///
/// Remembers the last forwarded height range so a full re-bind (e.g.
/// after the host recreates its material) can restore it without a new
/// generation run.
#[derive(Debug, Clone, Default)]
pub struct MaterialSettings {
    pub layers: Vec<TextureLayer>,
    saved_min_height: f32,
    saved_max_height: f32,
}

impl MaterialSettings {
    /// Creates settings from an ordered layer stack.
    pub fn new(layers: Vec<TextureLayer>) -> Self {
        Self {
            layers,
            saved_min_height: 0.0,
            saved_max_height: 0.0,
        }
    }

    /// Forwards the layer stack and the saved height range to the host.
    pub fn apply_to(&self, binder: &mut dyn MaterialBinder) {
        binder.bind_layers(&self.layers);
        binder.set_height_range(self.saved_min_height, self.saved_max_height);
    }

    /// Saves and forwards a new height range.
    ///
    /// Called with the scalars of each freshly generated map data.
    pub fn update_mesh_heights(
        &mut self,
        binder: &mut dyn MaterialBinder,
        min_height: f32,
        max_height: f32,
    ) {
        self.saved_min_height = min_height;
        self.saved_max_height = max_height;
        binder.set_height_range(min_height, max_height);
    }

    /// The last forwarded (min, max) height range.
    pub fn saved_height_range(&self) -> (f32, f32) {
        (self.saved_min_height, self.saved_max_height)
    }
}
