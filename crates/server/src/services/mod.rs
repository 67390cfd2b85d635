pub mod piston;
pub mod token;
