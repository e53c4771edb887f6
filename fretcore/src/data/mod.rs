pub mod bursts;
pub mod background;
pub mod dataset;

pub use background::{AlexBackground, Background};
pub use bursts::{AlexBursts, Bursts};
pub use dataset::{AcquisitionMode, AlexChannel, AlternatingExcitationData, Channel, Dataset, Photons, SingleExcitationData};
