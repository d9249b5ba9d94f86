// Do this because numerics calls for a lot of non-standard names
#![allow(non_snake_case)]
pub mod array;
pub mod chart;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod helper_traits;
pub mod mvdr;
pub mod noise;
pub mod normalize;
pub mod pipeline;
pub mod response;
pub mod steering;
