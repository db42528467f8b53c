use std::{
    fmt::{self, Display},
    str::FromStr,
};

use jetty::{anti_kt_f, cambridge_aachen_f, kt_f, Cluster, PseudoJet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::four_vector::FourVector;
use crate::object::{sort_by_pt, PhysicsObject, PID_JET};

/// Default maximum ΔR between a b parton and a b-tagged jet
pub const BTAG_MAX_DR: f64 = 0.4;

/// Placeholder for an unknown jet algorithm
#[derive(Debug, Clone, Error)]
pub struct UnknownJetAlgorithm(String);

impl Display for UnknownJetAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown jet algorithm: {}", self.0)
    }
}

impl FromStr for JetAlgorithm {
    type Err = UnknownJetAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "anti_kt" | "antikt" | "anti-kt" => Ok(Self::AntiKt),
            "kt" => Ok(Self::Kt),
            "Cambridge/Aachen" | "Cambridge-Aachen" | "Cambridge_Aachen"
            | "cambridge/aachen" | "cambridge-aachen" | "cambridge_aachen" => {
                Ok(Self::CambridgeAachen)
            }
            _ => Err(UnknownJetAlgorithm(s.to_string())),
        }
    }
}

/// Jet clustering algorithms
#[derive(Deserialize, Serialize, Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum JetAlgorithm {
    /// The [anti-kt](https://arxiv.org/abs/0802.1189) algorithm
    #[default]
    AntiKt,
    /// The [Cambridge](https://arxiv.org/abs/hep-ph/9707323)/[Aachen](https://arxiv.org/abs/hep-ph/9907280) algorithm
    CambridgeAachen,
    /// The [kt](https://arxiv.org/abs/hep-ph/9305266) algorithm
    Kt,
}

/// Definition of a jet
#[derive(Deserialize, Serialize, Debug, Copy, Clone, PartialEq)]
pub struct JetDefinition {
    /// Jet algorithm
    pub algorithm: JetAlgorithm,
    /// Jet radius parameter
    pub radius: f64,
    /// Minimum jet transverse momentum
    pub min_pt: f64,
}

impl Default for JetDefinition {
    fn default() -> Self {
        Self {
            algorithm: JetAlgorithm::AntiKt,
            radius: 0.4,
            min_pt: 0.,
        }
    }
}

/// Cluster the given momenta into jets
///
/// Jets are returned with decreasing transverse momentum. Only jets
/// with a transverse momentum above `jet_def.min_pt` are kept. All
/// jets start out untagged.
pub fn cluster<I>(inputs: I, jet_def: &JetDefinition) -> Vec<PhysicsObject>
where
    I: IntoIterator<Item = FourVector>,
{
    let partons: Vec<PseudoJet> = inputs.into_iter().map(PseudoJet::from).collect();
    let minpt2 = jet_def.min_pt * jet_def.min_pt;
    let cut = |jet: PseudoJet| jet.pt2() > minpt2;
    let r = jet_def.radius;
    let jets = match jet_def.algorithm {
        JetAlgorithm::AntiKt => partons.cluster_if(anti_kt_f(r), cut),
        JetAlgorithm::Kt => partons.cluster_if(kt_f(r), cut),
        JetAlgorithm::CambridgeAachen => {
            partons.cluster_if(cambridge_aachen_f(r), cut)
        }
    };
    let mut jets: Vec<_> = jets
        .into_iter()
        .map(|jet| PhysicsObject::new(PID_JET, jet.into()))
        .collect();
    sort_by_pt(&mut jets);
    jets
}

/// Tag the jet closest to `parton`
///
/// The closest jet in ΔR gets the tag 1 if it is closer than
/// `max_dr`. Returns the position of the tagged jet.
pub fn btag_closest(
    jets: &mut [PhysicsObject],
    parton: &FourVector,
    max_dr: f64,
) -> Option<usize> {
    let (closest, dr) = jets
        .iter()
        .enumerate()
        .map(|(n, jet)| (n, jet.p.delta_r(parton)))
        .min_by(|a, b| a.1.total_cmp(&b.1))?;
    if dr < max_dr {
        jets[closest].tag = 1;
        Some(closest)
    } else {
        None
    }
}
