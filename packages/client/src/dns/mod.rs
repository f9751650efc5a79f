//! Host resolution into connection candidates

pub use gai::GaiResolver;
pub use overrides::OverrideResolver;
pub use resolve::{Candidate, Name, Resolve};

mod gai;
mod overrides;
mod resolve;
