//! Desktop background colour resource.
use anyhow::Result;

use super::color::{Color, SystemColors};
use super::registry::{HKEY_CURRENT_USER, REG_SZ, RegistryAccessor, RegistryValue};
use super::{Applicable, Resource, ResourceState};

/// Registry key holding the per-user system colours.
const COLORS_KEY: &str = r"Control Panel\Colors";

/// Registry value for the desktop colour.
const BACKGROUND_VALUE: &str = "Background";

/// The desktop background colour.
///
/// Applying writes the registry value (durable, honoured at next login) and
/// changes the live system colour (immediate, lost at logout).
pub struct BackgroundColorResource<'a> {
    color: Color,
    registry: RegistryAccessor<'a>,
    colors: &'a dyn SystemColors,
}

impl std::fmt::Debug for BackgroundColorResource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundColorResource")
            .field("color", &self.color)
            .finish_non_exhaustive()
    }
}

impl<'a> BackgroundColorResource<'a> {
    /// Create a resource for `color`.
    #[must_use]
    pub fn new(color: Color, registry: RegistryAccessor<'a>, colors: &'a dyn SystemColors) -> Self {
        Self {
            color,
            registry,
            colors,
        }
    }

    fn target(&self) -> RegistryValue {
        RegistryValue::string(self.color.to_string())
    }
}

impl Applicable for BackgroundColorResource<'_> {
    fn description(&self) -> String {
        format!("background color {}", self.color)
    }

    fn apply(&self) -> Result<()> {
        let written = self.registry.set(
            HKEY_CURRENT_USER,
            COLORS_KEY,
            BACKGROUND_VALUE,
            &self.target(),
        );
        self.colors.set_desktop_color(self.color);
        written.map_err(Into::into)
    }
}

impl Resource for BackgroundColorResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        let Some(current) = self
            .registry
            .get(HKEY_CURRENT_USER, COLORS_KEY, BACKGROUND_VALUE)
        else {
            return Ok(ResourceState::Missing);
        };
        if current.data_type == REG_SZ && current == self.target() {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect {
                current: current.data,
            })
        }
    }
}
