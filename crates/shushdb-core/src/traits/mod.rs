pub mod collection;

pub use collection::{ReadCollection, WriteCollection};
