// Domain and wire types shared by the engine and any facade built on top of it.

pub mod models;
pub mod utils;
