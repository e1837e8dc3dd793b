//! External service integrations.

pub mod provider_client {
    pub use crate::provider_client::*;
}

pub mod provider_models {
    pub use crate::provider_models::*;
}
