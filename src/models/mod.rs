// Models module - Remote game data structures

pub mod ship;
pub mod contract;
pub mod waypoint;
pub mod transaction;
pub mod responses;

pub use ship::*;
pub use contract::*;
pub use waypoint::*;
pub use transaction::*;
pub use responses::*;
