pub mod compilation;
pub mod config;
pub mod error;
mod legacy;
pub mod platform;
pub mod project;
pub mod url;
pub mod xml;

pub use compilation::{Compilation, Compilations, ProjectSnapshot, Status};
pub use config::{Author, ConfigDocument, Environment, NodeFilter, NodeUpdate, Orientation, Plugin};
pub use error::CocoonError;
pub use platform::Platform;
pub use project::{Clock, PollOptions, Project, ProjectApi, TokioClock};
