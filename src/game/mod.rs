//! Round engine and session loop

pub mod active;
pub mod difficulty;
pub mod palette;
pub mod ports;
pub mod round;
pub mod sampler;
pub mod session;
pub mod weighting;

#[cfg(test)]
pub(crate) mod test_support;

pub use active::ActiveSet;
pub use ports::PlayerId;
pub use session::SessionLoop;
