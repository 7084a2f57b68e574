//! Deterministic tile terrain and depletable resource nodes.

pub mod field;
pub mod node;
pub mod noise;
pub mod resource;
pub mod session;
pub mod terrain;

pub use field::*;
pub use node::*;
pub use resource::*;
pub use session::*;
pub use terrain::*;
