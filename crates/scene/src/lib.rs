pub mod camera;
pub mod components;
pub mod composer;
pub mod entity;
pub mod focus;
pub mod picking;
pub mod prefabs;
pub mod registry;
pub mod resources;
pub mod world;

pub use world::*;
