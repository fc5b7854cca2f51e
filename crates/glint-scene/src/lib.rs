//! Scene representation: transforms, cameras, and renderable objects.

pub mod camera;
pub mod object;
pub mod transform;

pub use camera::Camera;
pub use object::{ModelHandle, ObjectId, ObjectStore, SceneObject};
pub use transform::Transform;
