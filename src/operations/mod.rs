// Operations module - snapshot, ship actions and the procurement decision engine

pub mod procurement;
pub mod ship;
pub mod world;

pub use procurement::*;
pub use ship::*;
pub use world::*;
