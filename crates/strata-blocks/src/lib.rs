//! Block ids, shape categories, and the face-visibility material classifier.
#![forbid(unsafe_code)]

pub mod ids;
pub mod material;
pub mod shape;
pub mod types;

pub use material::{MaterialClassifier, MaterialIndex, VisibilityPolicy};
pub use shape::{ShapeCategory, ShapeConfigError, ShapeTable};
pub use types::{Block, BlockId, ID_LIMIT};
