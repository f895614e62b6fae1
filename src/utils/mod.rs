pub mod fastx;
pub mod file;
pub mod sequence;
pub mod system;
