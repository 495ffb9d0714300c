pub mod category;
pub mod common;
pub mod world;

pub use category::Category;
pub use common::{Displayable, Identifiable, NamedEntity};
pub use world::World;
