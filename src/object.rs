use std::collections::BTreeMap;

use particle_id::ParticleID;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::four_vector::FourVector;
use crate::particle::{Lineage, Particle};

/// Internal particle ID for missing transverse momentum
pub const PID_MET: ParticleID = ParticleID::new(80);
/// Internal particle ID for jets
pub const PID_JET: ParticleID = ParticleID::new(81);

/// A reconstructed physics object
///
/// Dressed leptons, jets, and missing momentum are all represented by
/// this type. Objects are values: reconstruction creates new objects
/// instead of modifying the particles in the event record.
#[derive(Deserialize, Serialize, Copy, Clone, Debug, PartialEq)]
pub struct PhysicsObject {
    /// Particle type
    pub pid: ParticleID,
    /// Four-momentum
    pub p: FourVector,
    /// Integer tag, e.g. 1 for b-tagged jets
    pub tag: i32,
    /// Index of the underlying particle in the event record, if any
    pub origin: Option<usize>,
}

impl PhysicsObject {
    /// A new object not associated with any particle in the event
    pub fn new(pid: ParticleID, p: FourVector) -> Self {
        Self {
            pid,
            p,
            tag: 0,
            origin: None,
        }
    }

    pub fn abs_pid(&self) -> i32 {
        self.pid.id().abs()
    }

    /// Whether the object is a b-tagged jet
    pub fn is_btagged(&self) -> bool {
        self.tag > 0
    }
}

impl From<&Particle> for PhysicsObject {
    fn from(p: &Particle) -> Self {
        Self {
            pid: p.pid,
            p: p.p,
            tag: p.tag,
            origin: Some(p.id),
        }
    }
}

impl Lineage for PhysicsObject {
    fn pid(&self) -> ParticleID {
        self.pid
    }

    fn origin(&self) -> Option<usize> {
        self.origin
    }
}

/// Object categories in a selection
#[derive(
    Display,
    EnumIter,
    EnumString,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Debug,
    Deserialize,
    Serialize,
)]
#[strum(serialize_all = "kebab-case")]
pub enum Category {
    Lepton,
    Neutrino,
    Photon,
    Jet,
    BJet,
    PromptLepton,
    LooseLepton,
    #[strum(serialize = "MET")]
    MissingEnergy,
}

/// Physics objects selected for an analysis, grouped by category
///
/// Each category holds an ordered list of objects. Categories that
/// were never filled are empty. The selection also keeps the central
/// weight of the event it was taken from.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectedObjects {
    objects: BTreeMap<Category, Vec<PhysicsObject>>,
    weight: f64,
}

impl Default for SelectedObjects {
    fn default() -> Self {
        Self {
            objects: BTreeMap::new(),
            weight: 1.,
        }
    }
}

impl SelectedObjects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty selection from an event with the given weight
    pub fn with_weight(weight: f64) -> Self {
        Self {
            objects: BTreeMap::new(),
            weight,
        }
    }

    /// Central weight of the originating event
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// The objects in the given category
    pub fn get(&self, cat: Category) -> &[PhysicsObject] {
        self.objects.get(&cat).map(|v| v.as_slice()).unwrap_or_default()
    }

    /// Append an object to the given category
    pub fn push(&mut self, cat: Category, obj: PhysicsObject) {
        self.objects.entry(cat).or_default().push(obj)
    }

    /// Append several objects to the given category
    pub fn extend<I>(&mut self, cat: Category, objs: I)
    where
        I: IntoIterator<Item = PhysicsObject>,
    {
        self.objects.entry(cat).or_default().extend(objs)
    }

    /// Replace the objects in the given category
    pub fn insert(
        &mut self,
        cat: Category,
        objs: Vec<PhysicsObject>,
    ) -> Option<Vec<PhysicsObject>> {
        self.objects.insert(cat, objs)
    }

    /// Remove a category, returning its objects
    pub fn remove(&mut self, cat: Category) -> Vec<PhysicsObject> {
        self.objects.remove(&cat).unwrap_or_default()
    }

    pub fn len(&self, cat: Category) -> usize {
        self.get(cat).len()
    }

    pub fn is_empty(&self, cat: Category) -> bool {
        self.get(cat).is_empty()
    }

    /// Sort the objects in each category by decreasing transverse momentum
    pub fn sort_by_pt(&mut self) {
        for objs in self.objects.values_mut() {
            sort_by_pt(objs)
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &[PhysicsObject])> {
        self.objects.iter().map(|(cat, objs)| (*cat, objs.as_slice()))
    }
}

impl FromIterator<(Category, PhysicsObject)> for SelectedObjects {
    fn from_iter<I: IntoIterator<Item = (Category, PhysicsObject)>>(
        iter: I,
    ) -> Self {
        let mut res = Self::new();
        for (cat, obj) in iter {
            res.push(cat, obj);
        }
        res
    }
}

/// Sort objects by decreasing transverse momentum
pub fn sort_by_pt(objs: &mut [PhysicsObject]) {
    objs.sort_by(|a, b| b.p.pt().total_cmp(&a.p.pt()))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn obj(pt: f64) -> PhysicsObject {
        PhysicsObject::new(
            ParticleID::new(11),
            FourVector::from_pt_eta_phi_m(pt, 0., 0., 0.),
        )
    }

    #[test]
    fn categories() {
        let mut sel = SelectedObjects::new();
        assert!(sel.is_empty(Category::Jet));
        sel.push(Category::Lepton, obj(10.));
        sel.extend(Category::Lepton, [obj(30.), obj(20.)]);
        sel.sort_by_pt();
        let pts: Vec<_> =
            sel.get(Category::Lepton).iter().map(|l| l.p.pt()).collect();
        assert_eq!(pts, [30., 20., 10.]);
        assert_eq!(sel.remove(Category::Lepton).len(), 3);
        assert!(sel.is_empty(Category::Lepton));
        assert_eq!(sel.weight(), 1.);
        assert_eq!(SelectedObjects::with_weight(0.5).weight(), 0.5);
    }

    #[test]
    fn category_names() {
        assert_eq!(Category::BJet.to_string(), "b-jet");
        assert_eq!(Category::PromptLepton.to_string(), "prompt-lepton");
        assert_eq!(Category::from_str("MET").unwrap(), Category::MissingEnergy);
    }
}
