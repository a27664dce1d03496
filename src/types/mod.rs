pub mod dto;
pub mod feature;
pub mod model;
pub mod places;
