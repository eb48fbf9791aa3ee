pub mod map;

// Re-export transit from the transit crate
pub use ridemap_transit as transit;
