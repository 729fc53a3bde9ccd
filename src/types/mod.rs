pub mod bar;
pub mod bridge;
pub mod control;
pub mod signals;

pub use bar::*;
pub use bridge::*;
pub use control::*;
pub use signals::*;
