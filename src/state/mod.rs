/// State management module
///
/// This module handles all application state, including:
/// - The pictures directory (store.rs)
/// - Shared data structures (data.rs)
/// - The gallery screen and its photo list (gallery.rs)
/// - The capture lifecycle (capture.rs)
/// - Runtime permissions (permissions.rs)
/// - The photo screen (photo.rs)

pub mod capture;
pub mod data;
pub mod gallery;
pub mod permissions;
pub mod photo;
pub mod store;
