//! Canvas renderer for a [`Session`](crate::session::Session), driven by the
//! `force_graph` physics engine.

mod component;
mod render;
mod state;
mod types;

pub use component::ForceGraphCanvas;
