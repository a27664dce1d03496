pub mod geom;
pub mod search;
