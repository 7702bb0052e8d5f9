//! Draw classified tracks onto maps
mod icons;
pub mod map;

pub use icons::{IconConfig, IconTable};
