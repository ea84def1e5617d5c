pub use call_log::{BackendCall, CallLog};

pub use scripted_backend::ScriptedBackend;

pub use setup::*;
