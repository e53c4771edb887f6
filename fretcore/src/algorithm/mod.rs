pub mod background;
pub mod utility;
