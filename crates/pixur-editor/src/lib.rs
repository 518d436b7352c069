//! Client-side engine of the Pixur ingest page: canonical state store,
//! render diff engine, drag input adapter, and the action layer that talks
//! to the server through a [`actions::Backend`].

pub mod actions;
pub mod input;
pub mod render;
pub mod store;
pub mod summary;

pub use actions::{Actions, Backend, HttpResponse};
pub use input::{DragAdapter, PointerInput, PointerSource};
pub use render::{DomPatch, DomSink, Node, render};
pub use store::{SharedStore, Store};
