pub use self::{board::*, color::*, layout::*};

pub mod board;
pub mod color;
pub mod layout;
