//! Asset loading: CPU-side mesh data from OBJ files.

pub mod error;
pub mod mesh;

pub use error::{AssetError, AssetResult};
pub use mesh::MeshData;
