pub mod config;
pub mod crop;
pub mod error;
pub mod metadata;
pub mod state;
pub mod view_model;

pub use config::IngestConfig;
pub use crop::{Axis, CropAction, CropError, CropSpan, CropState, Edge, Handle};
pub use error::{ErrorKind, Failure, RequestError};
pub use state::*;
pub use view_model::{Changed, CropView, ViewModel};
