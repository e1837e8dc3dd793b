// Domain-layer modules and shared errors/models
pub mod normalizer {
    pub use crate::normalizer::*;
}

pub mod classifier {
    pub use crate::classifier::*;
}

pub mod verification {
    pub use crate::verification::*;
}

pub mod errors {
    pub use crate::errors::*;
}
