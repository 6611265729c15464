pub mod command;
pub mod config;
pub mod console;
pub mod crypto;
pub mod paths;
pub mod robot;
pub mod session;
pub mod store;
pub mod sync;

// Re-export commonly used types
pub use command::{CommandEngine, CommandError, Feature, Parameters};
pub use session::InteractionLoop;
pub use store::EntityStore;
