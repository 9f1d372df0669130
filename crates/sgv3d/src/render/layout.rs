//! Resolved uniform locations
//!
//! Uniform names come from [`UniformNames`]; [`BindingLayout::resolve`] turns
//! them into locations once per program at setup, so traversal never does a
//! string lookup.

use crate::config::UniformNames;
use crate::render::device::{GraphicsDevice, ProgramId, UniformLocation};
use crate::render::RenderError;

/// Uniform locations a frame needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingLayout {
    /// Model matrix; geometry nodes write the accumulated transform here
    pub model: UniformLocation,
    /// View matrix
    pub view: Option<UniformLocation>,
    /// Projection matrix
    pub projection: Option<UniformLocation>,
    /// Camera position
    pub camera_position: Option<UniformLocation>,
    /// Camera direction
    pub camera_direction: Option<UniformLocation>,
    /// Colour scheme selector
    pub color_scheme: Option<UniformLocation>,
    /// Subgraph minimum corner
    pub minimum: Option<UniformLocation>,
    /// Subgraph maximum corner
    pub maximum: Option<UniformLocation>,
}

impl BindingLayout {
    /// Layout with only a model matrix location
    pub fn with_model(model: UniformLocation) -> Self {
        Self {
            model,
            view: None,
            projection: None,
            camera_position: None,
            camera_direction: None,
            color_scheme: None,
            minimum: None,
            maximum: None,
        }
    }

    /// Look every configured name up in `program`
    ///
    /// The model matrix is required; anything else the program lacks is left
    /// unset.
    pub fn resolve(
        names: &UniformNames,
        program: ProgramId,
        device: &dyn GraphicsDevice,
    ) -> Result<Self, RenderError> {
        let lookup = |name: &str| {
            let location = device.uniform_location(program, name);
            if location.is_none() {
                log::debug!("Program {program:?} has no uniform \"{name}\"");
            }
            location
        };

        let model = lookup(&names.model_matrix).ok_or_else(|| RenderError::MissingUniform {
            program,
            name: names.model_matrix.clone(),
        })?;

        let layout = Self {
            model,
            view: lookup(&names.view_matrix),
            projection: lookup(&names.projection_matrix),
            camera_position: lookup(&names.camera_position),
            camera_direction: lookup(&names.camera_direction),
            color_scheme: lookup(&names.color_scheme),
            minimum: lookup(&names.minimum),
            maximum: lookup(&names.maximum),
        };
        log::info!("Resolved binding layout for {program:?}: model at {:?}", layout.model);
        Ok(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::recording::RecordingDevice;

    #[test]
    fn test_resolve_default_names() {
        let mut device = RecordingDevice::new();
        let program = device.register_program(&["projection", "view", "model", "camPos"]);

        let layout = BindingLayout::resolve(&UniformNames::default(), program, &device).unwrap();
        assert_eq!(layout.model, UniformLocation(2));
        assert_eq!(layout.projection, Some(UniformLocation(0)));
        assert_eq!(layout.camera_position, Some(UniformLocation(3)));
        assert_eq!(layout.camera_direction, None);
    }

    #[test]
    fn test_missing_model_uniform_fails() {
        let mut device = RecordingDevice::new();
        let program = device.register_program(&["view"]);

        let err = BindingLayout::resolve(&UniformNames::default(), program, &device).unwrap_err();
        assert!(matches!(err, RenderError::MissingUniform { ref name, .. } if name == "model"));
    }

    #[test]
    fn test_renamed_model_uniform() {
        let mut device = RecordingDevice::new();
        let program = device.register_program(&["mMat"]);
        let names = UniformNames {
            model_matrix: "mMat".to_string(),
            ..UniformNames::default()
        };

        let layout = BindingLayout::resolve(&names, program, &device).unwrap();
        assert_eq!(layout, BindingLayout::with_model(UniformLocation(0)));
    }
}
