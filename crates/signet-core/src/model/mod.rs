pub mod body;
pub mod document;
pub mod relation;
pub mod signature;

pub use body::DocumentBody;
pub use document::{Attached, Document};
pub use relation::{Relation, RelationKind};
pub use signature::Signature;
