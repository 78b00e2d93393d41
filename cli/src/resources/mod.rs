//! Idempotent primitives the tasks are built from.
//!
//! A resource knows how to apply one change to the host. Resources that can
//! read back the host's current value also implement [`Resource`], which lets
//! a task skip the write when nothing would change.
pub mod background;
pub mod color;
pub mod error;
pub mod font;
pub mod fs;
pub mod registry;
pub mod registry_file;

use anyhow::Result;

/// A change that can be described and applied.
///
/// `.reg` imports are applied unconditionally and implement only this trait.
pub trait Applicable {
    /// What is being changed, for log lines.
    fn description(&self) -> String;

    /// Apply the change.
    ///
    /// # Errors
    ///
    /// Returns an error if a registry write, file operation or subprocess
    /// fails.
    fn apply(&self) -> Result<()>;
}

/// Host state of a resource relative to its desired value.
///
/// # Examples
///
/// ```
/// use dotfiles_windows::resources::ResourceState;
///
/// let stale = ResourceState::Incorrect { current: "255 255 255".into() };
/// assert_ne!(stale, ResourceState::Correct);
/// assert_ne!(ResourceState::Missing, ResourceState::Correct);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Nothing is stored yet, or it could not be read.
    Missing,
    /// Matches the desired value.
    Correct,
    /// Holds some other value.
    Incorrect {
        /// The value found on the host.
        current: String,
    },
}

/// A change whose current state can be inspected before applying it.
pub trait Resource: Applicable {
    /// Read the host's current state.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be determined.
    fn current_state(&self) -> Result<ResourceState>;
}
