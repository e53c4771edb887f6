use std::fmt::Display;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::alex::apply::{AlexPhotons, AlternationConfig};
use crate::data::background::{check_bins, AlexBackground, Background};
use crate::data::bursts::{AlexBursts, Bursts};
use crate::error::Fault;

/// Clock period of the acquisition boards, seconds per tick.
pub const DEFAULT_CLK_P: f64 = 12.5e-9;

/// Channel count of the 8-spot single-excitation setup.
pub const MULTISPOT_CHANNELS: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AcquisitionMode {
    SingleExcitation,
    AlternatingExcitation,
}

impl Display for AcquisitionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AcquisitionMode::SingleExcitation => write!(f, "single-excitation"),
            AcquisitionMode::AlternatingExcitation => write!(f, "ALEX"),
        }
    }
}

/// Photon stream of a single-excitation channel. Donor emission is the complement of `acceptor_em`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Photons {
    pub times: Vec<u64>,
    pub acceptor_em: Vec<bool>,
}

impl Photons {
    pub fn donor_em(&self) -> Vec<bool> {
        self.acceptor_em.iter().map(|a| !a).collect()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    #[serde(default)]
    pub photons: Photons,
    pub bursts: Bursts,
    pub background: Background,
}

impl Channel {
    pub fn validate(&self) -> Result<(), Fault> {
        Fault::check_len("acceptor_em", self.photons.times.len(), self.photons.acceptor_em.len())?;
        self.bursts.validate()?;
        self.background.validate()?;
        check_bins(&self.bursts.bp, self.background.bins())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AlexChannel {
    #[serde(default)]
    pub photons: AlexPhotons,
    pub bursts: Bursts,
    pub alex_bursts: AlexBursts,
    pub background: Background,
    pub alex_background: AlexBackground,
}

impl AlexChannel {
    pub fn validate(&self) -> Result<(), Fault> {
        self.photons.validate()?;
        self.bursts.validate()?;
        self.alex_bursts.validate(self.bursts.len())?;
        self.background.validate()?;
        self.alex_background.validate(self.background.bins())?;
        check_bins(&self.bursts.bp, self.background.bins())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SingleExcitationData {
    pub clk_p: f64,
    pub channels: Vec<Channel>,
}

impl SingleExcitationData {
    pub fn new(clk_p: f64, channels: Vec<Channel>) -> Result<Self, Fault> {
        let data = SingleExcitationData { clk_p, channels };
        for ch in &data.channels {
            ch.validate()?;
        }
        Ok(data)
    }

    /// 8-spot setup with the default clock.
    pub fn multispot8(channels: Vec<Channel>) -> Result<Self, Fault> {
        Fault::check_len("channels", MULTISPOT_CHANNELS, channels.len())?;
        SingleExcitationData::new(DEFAULT_CLK_P, channels)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlternatingExcitationData {
    pub clk_p: f64,
    #[serde(default)]
    pub alternation: AlternationConfig,
    pub channels: Vec<AlexChannel>,
}

impl AlternatingExcitationData {
    pub fn new(clk_p: f64, alternation: AlternationConfig, channels: Vec<AlexChannel>) -> Result<Self, Fault> {
        let data = AlternatingExcitationData { clk_p, alternation, channels };
        for ch in &data.channels {
            ch.validate()?;
        }
        Ok(data)
    }
}

/// Photons, bursts and background of one acquisition.
///
/// The alternating-excitation arrays (`naa`, S, `bg_aa`, excitation masks)
/// only exist in the `AlternatingExcitation` variant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Dataset {
    SingleExcitation(SingleExcitationData),
    AlternatingExcitation(AlternatingExcitationData),
}

impl From<SingleExcitationData> for Dataset {
    fn from(data: SingleExcitationData) -> Self {
        Dataset::SingleExcitation(data)
    }
}

impl From<AlternatingExcitationData> for Dataset {
    fn from(data: AlternatingExcitationData) -> Self {
        Dataset::AlternatingExcitation(data)
    }
}

impl Dataset {
    pub fn mode(&self) -> AcquisitionMode {
        match self {
            Dataset::SingleExcitation(_) => AcquisitionMode::SingleExcitation,
            Dataset::AlternatingExcitation(_) => AcquisitionMode::AlternatingExcitation,
        }
    }

    pub fn is_alex(&self) -> bool {
        matches!(self, Dataset::AlternatingExcitation(_))
    }

    pub fn clk_p(&self) -> f64 {
        match self {
            Dataset::SingleExcitation(d) => d.clk_p,
            Dataset::AlternatingExcitation(d) => d.clk_p,
        }
    }

    pub fn nch(&self) -> usize {
        match self {
            Dataset::SingleExcitation(d) => d.channels.len(),
            Dataset::AlternatingExcitation(d) => d.channels.len(),
        }
    }

    fn check_channel(&self, ich: usize) -> Result<(), Fault> {
        let nch = self.nch();
        if ich < nch {
            Ok(())
        } else {
            Err(Fault::ChannelOutOfRange { ich, nch })
        }
    }

    pub fn bursts(&self, ich: usize) -> Result<&Bursts, Fault> {
        self.check_channel(ich)?;
        Ok(match self {
            Dataset::SingleExcitation(d) => &d.channels[ich].bursts,
            Dataset::AlternatingExcitation(d) => &d.channels[ich].bursts,
        })
    }

    pub fn background(&self, ich: usize) -> Result<&Background, Fault> {
        self.check_channel(ich)?;
        Ok(match self {
            Dataset::SingleExcitation(d) => &d.channels[ich].background,
            Dataset::AlternatingExcitation(d) => &d.channels[ich].background,
        })
    }

    /// ALEX-only burst arrays; `what` names the caller in the fault.
    pub fn alex_bursts(&self, ich: usize, what: &'static str) -> Result<&AlexBursts, Fault> {
        self.check_channel(ich)?;
        match self {
            Dataset::SingleExcitation(_) => Err(Fault::RequiresAlternation(what)),
            Dataset::AlternatingExcitation(d) => Ok(&d.channels[ich].alex_bursts),
        }
    }

    pub fn alex_background(&self, ich: usize, what: &'static str) -> Result<&AlexBackground, Fault> {
        self.check_channel(ich)?;
        match self {
            Dataset::SingleExcitation(_) => Err(Fault::RequiresAlternation(what)),
            Dataset::AlternatingExcitation(d) => Ok(&d.channels[ich].alex_background),
        }
    }

    pub fn n_bursts(&self, ich: usize) -> Result<usize, Fault> {
        Ok(self.bursts(ich)?.len())
    }

    pub fn validate(&self) -> Result<(), Fault> {
        match self {
            Dataset::SingleExcitation(d) => d.channels.iter().try_for_each(Channel::validate)?,
            Dataset::AlternatingExcitation(d) => d.channels.iter().try_for_each(AlexChannel::validate)?,
        }
        for ich in 0..self.nch() {
            if self.n_bursts(ich)? == 0 {
                warn!("channel {} has no bursts", ich);
            }
        }
        Ok(())
    }

    /// Narrow every burst-level array of channel `ich` to the bursts in `mask`.
    pub fn retain_bursts(&mut self, ich: usize, mask: &[bool]) -> Result<(), Fault> {
        self.check_channel(ich)?;
        match self {
            Dataset::SingleExcitation(d) => {
                let ch = &mut d.channels[ich];
                ch.bursts = ch.bursts.select(mask)?;
            }
            Dataset::AlternatingExcitation(d) => {
                let ch = &mut d.channels[ich];
                let alex_bursts = ch.alex_bursts.select(mask)?;
                ch.bursts = ch.bursts.select(mask)?;
                ch.alex_bursts = alex_bursts;
            }
        }
        Ok(())
    }
}
