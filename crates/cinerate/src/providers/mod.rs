//! Provider/model registry, local model lifecycle and active-model switching.

pub mod credentials;
pub mod lifecycle;
pub mod registry;
pub mod state;
pub mod switch;

pub use credentials::validate_credential;
pub use lifecycle::LocalModelManager;
pub use registry::RegistryClient;
pub use state::{ProviderSnapshot, SessionState};
pub use switch::{check_switch_preconditions, SwitchController};
