//! Utility functions for images, stacks, and artifact naming.

pub mod image;

pub use image::{guess_rgb, read_stack, slice_to_rgb};

/// Sanitises a name for use in artifact filenames.
pub fn sanitise_name(name: &str) -> String {
    name.replace(' ', "-")
}
