pub mod args;

use clap::Parser;
pub use args::{Arguments, CodecKind};

pub fn parse() -> Arguments {
    Arguments::parse()
}
