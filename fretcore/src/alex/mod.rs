pub mod period;
pub mod apply;

pub use apply::{apply_alternation, AlexPhotons, AlternationConfig};
pub use period::{alternation_histogram, classify, AlternationPeriod, ExcitationWindow};
