use std::{
    collections::HashMap,
    fmt,
    ops::{Add, AddAssign, Index, Mul, MulAssign},
    sync::Arc,
};

use serde::{ser::SerializeMap, Serialize, Serializer};
use thiserror::Error;

use crate::traits::{Fill, Observable, Template};

/// Invalid histogram binning
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BinningError {
    #[error("Need at least two bin edges, got {0}")]
    TooFewEdges(usize),
    #[error("Bin edge {0} is NaN")]
    NaN(usize),
    #[error("Bin edges are not strictly increasing: {0} is followed by {1}")]
    NotIncreasing(f64, f64),
}

/// Strictly increasing bin edges
///
/// Bin `i` covers the half-open interval `[edges[i], edges[i + 1])`.
/// There are no underflow or overflow bins. Edges are shared between
/// all histograms booked with the same binning.
#[derive(Clone, Debug, PartialEq)]
pub struct BinEdges(Arc<Vec<f64>>);

impl BinEdges {
    pub fn new(edges: Vec<f64>) -> Result<Self, BinningError> {
        if edges.len() < 2 {
            return Err(BinningError::TooFewEdges(edges.len()));
        }
        if let Some(pos) = edges.iter().position(|e| e.is_nan()) {
            return Err(BinningError::NaN(pos));
        }
        for pair in edges.windows(2) {
            if pair[0] >= pair[1] {
                return Err(BinningError::NotIncreasing(pair[0], pair[1]));
            }
        }
        Ok(Self(Arc::new(edges)))
    }

    /// Equidistant bin edges `start, start + step, ...` up to and
    /// excluding `end`
    pub fn range(start: f64, end: f64, step: f64) -> Result<Self, BinningError> {
        let mut edges = Vec::new();
        if step > 0. {
            let mut n = 0;
            loop {
                let edge = start + n as f64 * step;
                if edge >= end {
                    break;
                }
                edges.push(edge);
                n += 1;
            }
        }
        Self::new(edges)
    }

    /// Number of bins
    pub fn nbins(&self) -> usize {
        self.0.len() - 1
    }

    pub fn as_slice(&self) -> &[f64] {
        self.0.as_slice()
    }

    /// The index of the bin containing `value`
    ///
    /// Returns `None` for NaN and for values outside
    /// `[edges[0], edges[n])`.
    pub fn bin_index(&self, value: f64) -> Option<usize> {
        if value.is_nan() {
            return None;
        }
        let pos = self.0.partition_point(|&edge| edge <= value);
        if pos == 0 || pos == self.0.len() {
            None
        } else {
            Some(pos - 1)
        }
    }
}

impl TryFrom<Vec<f64>> for BinEdges {
    type Error = BinningError;

    fn try_from(edges: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(edges)
    }
}

impl<const N: usize> TryFrom<[f64; N]> for BinEdges {
    type Error = BinningError;

    fn try_from(edges: [f64; N]) -> Result<Self, Self::Error> {
        Self::new(edges.to_vec())
    }
}

/// Accumulated bin contents for a fixed binning
#[derive(Clone, Debug, PartialEq)]
pub struct Bins {
    edges: BinEdges,
    values: Vec<f64>,
}

impl Bins {
    /// All-zero bins
    pub fn zeros(edges: BinEdges) -> Self {
        let values = vec![0.; edges.nbins()];
        Self { edges, values }
    }

    pub fn edges(&self) -> &BinEdges {
        &self.edges
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Add `weight` to the bin containing `value`
    ///
    /// Returns whether `value` was inside the histogram range.
    pub fn fill(&mut self, value: f64, weight: f64) -> bool {
        match self.edges.bin_index(value) {
            Some(idx) => {
                self.values[idx] += weight;
                true
            }
            None => false,
        }
    }

    /// Add `weight` to the bin with the given index
    pub fn fill_bin(&mut self, idx: usize, weight: f64) {
        self.values[idx] += weight;
    }

    /// Set all bins to zero
    pub fn clear(&mut self) {
        self.values.iter_mut().for_each(|v| *v = 0.);
    }
}

impl Index<usize> for Bins {
    type Output = f64;

    fn index(&self, idx: usize) -> &Self::Output {
        &self.values[idx]
    }
}

/// Elementwise addition
///
/// # Panics
///
/// Panics if the bin edges differ.
impl AddAssign<&Bins> for Bins {
    fn add_assign(&mut self, rhs: &Bins) {
        assert_eq!(self.edges, rhs.edges, "Adding histograms with different binning");
        for (v, r) in self.values.iter_mut().zip(&rhs.values) {
            *v += r;
        }
    }
}

impl AddAssign for Bins {
    fn add_assign(&mut self, rhs: Bins) {
        *self += &rhs
    }
}

impl Add for Bins {
    type Output = Bins;

    fn add(mut self, rhs: Bins) -> Self::Output {
        self += &rhs;
        self
    }
}

impl MulAssign<f64> for Bins {
    fn mul_assign(&mut self, rhs: f64) {
        self.values.iter_mut().for_each(|v| *v *= rhs);
    }
}

impl Mul<f64> for Bins {
    type Output = Bins;

    fn mul(mut self, rhs: f64) -> Self::Output {
        self *= rhs;
        self
    }
}

impl Mul<Bins> for f64 {
    type Output = Bins;

    fn mul(self, rhs: Bins) -> Self::Output {
        rhs * self
    }
}

impl Serialize for Bins {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.values)
    }
}

type SharedObservable<E> = Arc<dyn Observable<E> + Send + Sync>;
type WeightFn<E> = Arc<dyn Fn(&E) -> f64 + Send + Sync>;
type NamedWeightsFn<E> = Arc<dyn Fn(&E) -> HashMap<String, f64> + Send + Sync>;

/// Unit weight for every event
pub fn unit_weight<E>(_: &E) -> f64 {
    1.
}

/// Immutable histogram recipe: binning, observable, and event weight
pub struct HistogramSpec<E> {
    edges: BinEdges,
    observable: SharedObservable<E>,
    weight: WeightFn<E>,
}

impl<E> Clone for HistogramSpec<E> {
    fn clone(&self) -> Self {
        Self {
            edges: self.edges.clone(),
            observable: self.observable.clone(),
            weight: self.weight.clone(),
        }
    }
}

impl<E> fmt::Debug for HistogramSpec<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistogramSpec")
            .field("edges", &self.edges)
            .finish_non_exhaustive()
    }
}

impl<E: 'static> HistogramSpec<E> {
    /// Histogram of `observable` with unit event weights
    pub fn new<O>(edges: BinEdges, observable: O) -> Self
    where
        O: Observable<E> + Send + Sync + 'static,
    {
        Self {
            edges,
            observable: Arc::new(observable),
            weight: Arc::new(unit_weight::<E>),
        }
    }

    /// Use `weight` to determine the weight of each event
    pub fn with_weight<F>(mut self, weight: F) -> Self
    where
        F: Fn(&E) -> f64 + Send + Sync + 'static,
    {
        self.weight = Arc::new(weight);
        self
    }
}

impl<E> HistogramSpec<E> {
    pub fn edges(&self) -> &BinEdges {
        &self.edges
    }

    /// A new zero-filled histogram following this recipe
    pub fn book(&self) -> ObservableHistogram<E> {
        ObservableHistogram {
            spec: self.clone(),
            bins: Bins::zeros(self.edges.clone()),
        }
    }
}

/// Histogram of a single observable with a single event weight
pub struct ObservableHistogram<E> {
    spec: HistogramSpec<E>,
    bins: Bins,
}

impl<E> ObservableHistogram<E> {
    pub fn spec(&self) -> &HistogramSpec<E> {
        &self.spec
    }

    pub fn bins(&self) -> &Bins {
        &self.bins
    }

    pub fn into_bins(self) -> Bins {
        self.bins
    }

    pub fn values(&self) -> &[f64] {
        self.bins.values()
    }
}

impl<E> Clone for ObservableHistogram<E> {
    fn clone(&self) -> Self {
        Self {
            spec: self.spec.clone(),
            bins: self.bins.clone(),
        }
    }
}

impl<E> fmt::Debug for ObservableHistogram<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableHistogram")
            .field("bins", &self.bins)
            .finish()
    }
}

impl<E> Fill<E> for ObservableHistogram<E> {
    fn fill(&mut self, objects: &E) {
        let value = self.spec.observable.value(objects);
        if let Some(idx) = self.spec.edges.bin_index(value) {
            let weight = (self.spec.weight)(objects);
            self.bins.fill_bin(idx, weight);
        }
    }
}

impl<E> Template for ObservableHistogram<E> {
    fn empty_clone(&self) -> Self {
        self.spec.book()
    }
}

/// One histogram per named event weight
///
/// All histograms share the binning and the observable. For each event
/// `weights` returns a mapping from names to weights; histograms whose
/// name is missing from the mapping are filled with weight 1.
pub struct WeightedHistograms<E> {
    edges: BinEdges,
    observable: SharedObservable<E>,
    weights: NamedWeightsFn<E>,
    hists: Vec<(String, Bins)>,
}

impl<E: 'static> WeightedHistograms<E> {
    pub fn new<O, W>(
        edges: BinEdges,
        observable: O,
        weights: W,
        names: impl IntoIterator<Item = String>,
    ) -> Self
    where
        O: Observable<E> + Send + Sync + 'static,
        W: Fn(&E) -> HashMap<String, f64> + Send + Sync + 'static,
    {
        let hists = names
            .into_iter()
            .map(|name| (name, Bins::zeros(edges.clone())))
            .collect();
        Self {
            edges,
            observable: Arc::new(observable),
            weights: Arc::new(weights),
            hists,
        }
    }
}

impl<E> WeightedHistograms<E> {
    pub fn edges(&self) -> &BinEdges {
        &self.edges
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.hists.iter().map(|(name, _)| name.as_str())
    }

    /// The histogram for the given weight name, if booked
    pub fn get(&self, name: &str) -> Option<&Bins> {
        self.hists
            .iter()
            .find_map(|(n, bins)| if n == name { Some(bins) } else { None })
    }

    /// The histogram for the given weight name
    ///
    /// Returns all-zero bins if no histogram with that name was booked.
    pub fn get_or_zero(&self, name: &str) -> Bins {
        self.get(name)
            .cloned()
            .unwrap_or_else(|| Bins::zeros(self.edges.clone()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Bins)> {
        self.hists.iter().map(|(name, bins)| (name.as_str(), bins))
    }
}

impl<E> Clone for WeightedHistograms<E> {
    fn clone(&self) -> Self {
        Self {
            edges: self.edges.clone(),
            observable: self.observable.clone(),
            weights: self.weights.clone(),
            hists: self.hists.clone(),
        }
    }
}

impl<E> fmt::Debug for WeightedHistograms<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeightedHistograms")
            .field("hists", &self.hists)
            .finish_non_exhaustive()
    }
}

impl<E> Fill<E> for WeightedHistograms<E> {
    fn fill(&mut self, objects: &E) {
        let value = self.observable.value(objects);
        let Some(idx) = self.edges.bin_index(value) else {
            return;
        };
        let weights = (self.weights)(objects);
        for (name, bins) in &mut self.hists {
            let weight = weights.get(name).copied().unwrap_or(1.);
            bins.fill_bin(idx, weight);
        }
    }
}

impl<E> Template for WeightedHistograms<E> {
    fn empty_clone(&self) -> Self {
        let mut res = self.clone();
        for (_, bins) in &mut res.hists {
            bins.clear();
        }
        res
    }
}

/// Named collection of histograms filled with the same events
pub struct HistogramCompound<E> {
    hists: Vec<(String, Histogram<E>)>,
}

impl<E> HistogramCompound<E> {
    pub fn new() -> Self {
        Self { hists: Vec::new() }
    }

    /// Add a histogram under the given name
    pub fn with(mut self, name: impl Into<String>, hist: impl Into<Histogram<E>>) -> Self {
        self.hists.push((name.into(), hist.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Histogram<E>> {
        self.hists
            .iter()
            .find_map(|(n, hist)| if n == name { Some(hist) } else { None })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Histogram<E>)> {
        self.hists.iter().map(|(name, hist)| (name.as_str(), hist))
    }

    pub fn len(&self) -> usize {
        self.hists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hists.is_empty()
    }
}

impl<E> Default for HistogramCompound<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for HistogramCompound<E> {
    fn clone(&self) -> Self {
        Self {
            hists: self.hists.clone(),
        }
    }
}

impl<E> fmt::Debug for HistogramCompound<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.hists.iter().map(|(n, h)| (n, h)))
            .finish()
    }
}

impl<E> Fill<E> for HistogramCompound<E> {
    fn fill(&mut self, objects: &E) {
        for (_, hist) in &mut self.hists {
            hist.fill(objects)
        }
    }
}

impl<E> Template for HistogramCompound<E> {
    fn empty_clone(&self) -> Self {
        let hists = self
            .hists
            .iter()
            .map(|(name, hist)| (name.clone(), hist.empty_clone()))
            .collect();
        Self { hists }
    }
}

/// Any of the supported histogram kinds
///
/// Cloning with [Clone] copies the accumulated contents. Use
/// [Template::empty_clone] to obtain a zero-filled histogram with the
/// same binning, observable, and weights.
pub enum Histogram<E> {
    Observable(ObservableHistogram<E>),
    Weighted(WeightedHistograms<E>),
    Compound(HistogramCompound<E>),
}

impl<E> Histogram<E> {
    /// The bins of a single-observable histogram
    pub fn bins(&self) -> Option<&Bins> {
        match self {
            Self::Observable(h) => Some(h.bins()),
            _ => None,
        }
    }

    pub fn as_weighted(&self) -> Option<&WeightedHistograms<E>> {
        match self {
            Self::Weighted(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_compound(&self) -> Option<&HistogramCompound<E>> {
        match self {
            Self::Compound(h) => Some(h),
            _ => None,
        }
    }

    fn bins_mut(&mut self) -> Box<dyn Iterator<Item = &mut Bins> + '_> {
        match self {
            Self::Observable(h) => Box::new(std::iter::once(&mut h.bins)),
            Self::Weighted(h) => Box::new(h.hists.iter_mut().map(|(_, b)| b)),
            Self::Compound(h) => {
                Box::new(h.hists.iter_mut().flat_map(|(_, h)| h.bins_mut()))
            }
        }
    }
}

impl<E> Clone for Histogram<E> {
    fn clone(&self) -> Self {
        match self {
            Self::Observable(h) => Self::Observable(h.clone()),
            Self::Weighted(h) => Self::Weighted(h.clone()),
            Self::Compound(h) => Self::Compound(h.clone()),
        }
    }
}

impl<E> fmt::Debug for Histogram<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Observable(h) => fmt::Debug::fmt(h, f),
            Self::Weighted(h) => fmt::Debug::fmt(h, f),
            Self::Compound(h) => fmt::Debug::fmt(h, f),
        }
    }
}

impl<E> From<ObservableHistogram<E>> for Histogram<E> {
    fn from(h: ObservableHistogram<E>) -> Self {
        Self::Observable(h)
    }
}

impl<E> From<WeightedHistograms<E>> for Histogram<E> {
    fn from(h: WeightedHistograms<E>) -> Self {
        Self::Weighted(h)
    }
}

impl<E> From<HistogramCompound<E>> for Histogram<E> {
    fn from(h: HistogramCompound<E>) -> Self {
        Self::Compound(h)
    }
}

impl<E> From<HistogramSpec<E>> for Histogram<E> {
    fn from(spec: HistogramSpec<E>) -> Self {
        Self::Observable(spec.book())
    }
}

impl<E> Fill<E> for Histogram<E> {
    fn fill(&mut self, objects: &E) {
        match self {
            Self::Observable(h) => h.fill(objects),
            Self::Weighted(h) => h.fill(objects),
            Self::Compound(h) => h.fill(objects),
        }
    }
}

impl<E> Template for Histogram<E> {
    fn empty_clone(&self) -> Self {
        match self {
            Self::Observable(h) => Self::Observable(h.empty_clone()),
            Self::Weighted(h) => Self::Weighted(h.empty_clone()),
            Self::Compound(h) => Self::Compound(h.empty_clone()),
        }
    }
}

/// Elementwise addition
///
/// # Panics
///
/// Panics if the histograms were not booked from the same template.
impl<E> AddAssign<&Histogram<E>> for Histogram<E> {
    fn add_assign(&mut self, rhs: &Histogram<E>) {
        match (self, rhs) {
            (Self::Observable(l), Self::Observable(r)) => l.bins += &r.bins,
            (Self::Weighted(l), Self::Weighted(r)) => {
                assert_eq!(l.hists.len(), r.hists.len());
                for ((lname, l), (rname, r)) in l.hists.iter_mut().zip(&r.hists) {
                    assert_eq!(lname, rname);
                    *l += r;
                }
            }
            (Self::Compound(l), Self::Compound(r)) => {
                assert_eq!(l.hists.len(), r.hists.len());
                for ((lname, l), (rname, r)) in l.hists.iter_mut().zip(&r.hists) {
                    assert_eq!(lname, rname);
                    *l += r;
                }
            }
            _ => panic!("Adding histograms of different kinds"),
        }
    }
}

impl<E> Add for Histogram<E> {
    type Output = Histogram<E>;

    fn add(mut self, rhs: Histogram<E>) -> Self::Output {
        self += &rhs;
        self
    }
}

impl<E> MulAssign<f64> for Histogram<E> {
    fn mul_assign(&mut self, rhs: f64) {
        for bins in self.bins_mut() {
            *bins *= rhs;
        }
    }
}

impl<E> Mul<f64> for Histogram<E> {
    type Output = Histogram<E>;

    fn mul(mut self, rhs: f64) -> Self::Output {
        self *= rhs;
        self
    }
}

impl<E> Mul<Histogram<E>> for f64 {
    type Output = Histogram<E>;

    fn mul(self, rhs: Histogram<E>) -> Self::Output {
        rhs * self
    }
}

impl<E> Serialize for Histogram<E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Observable(h) => h.bins.serialize(serializer),
            Self::Weighted(h) => {
                let mut map = serializer.serialize_map(Some(h.hists.len()))?;
                for (name, bins) in &h.hists {
                    map.serialize_entry(name, bins)?;
                }
                map.end()
            }
            Self::Compound(h) => {
                let mut map = serializer.serialize_map(Some(h.hists.len()))?;
                for (name, hist) in &h.hists {
                    map.serialize_entry(name, hist)?;
                }
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(x: &f64) -> f64 {
        *x
    }

    fn spec(edges: &[f64]) -> HistogramSpec<f64> {
        HistogramSpec::new(BinEdges::new(edges.to_vec()).unwrap(), identity)
    }

    #[test]
    fn invalid_edges() {
        assert_eq!(BinEdges::new(vec![1.]), Err(BinningError::TooFewEdges(1)));
        assert_eq!(BinEdges::new(vec![0., f64::NAN]), Err(BinningError::NaN(1)));
        assert!(matches!(
            BinEdges::new(vec![0., 2., 2.]),
            Err(BinningError::NotIncreasing(_, _))
        ));
        assert!(BinEdges::new(vec![0., f64::INFINITY]).is_ok());
    }

    #[test]
    fn bin_law() {
        let edges = BinEdges::new(vec![0., 10., 20.]).unwrap();
        assert_eq!(edges.bin_index(0.), Some(0));
        assert_eq!(edges.bin_index(9.999), Some(0));
        assert_eq!(edges.bin_index(10.), Some(1));
        assert_eq!(edges.bin_index(20.), None);
        assert_eq!(edges.bin_index(-0.1), None);
        assert_eq!(edges.bin_index(f64::NAN), None);

        let mut h = spec(&[0., 10., 20.]).book();
        h.fill(&15.);
        assert_eq!(h.values(), [0., 1.]);
        h.fill(&25.);
        assert_eq!(h.values(), [0., 1.]);
    }

    #[test]
    fn range() {
        let edges = BinEdges::range(0., 7200., 200.).unwrap();
        assert_eq!(edges.nbins(), 35);
        assert_eq!(edges.as_slice().last(), Some(&7000.));
        assert!(BinEdges::range(0., 10., 0.).is_err());
    }

    #[test]
    fn event_weight() {
        let spec = spec(&[0., 1., 2.]).with_weight(|x: &f64| 2. * x);
        let mut h = spec.book();
        h.fill(&1.5);
        assert_eq!(h.values(), [0., 3.]);
    }

    #[test]
    fn clone_independence() {
        let template: Histogram<f64> = spec(&[0., 10., 20.]).into();
        let mut first = template.empty_clone();
        let second = template.empty_clone();
        first.fill(&5.);
        assert_eq!(first.bins().unwrap().values(), [1., 0.]);
        assert_eq!(second.bins().unwrap().values(), [0., 0.]);
        assert_eq!(template.bins().unwrap().values(), [0., 0.]);

        let copy = first.clone();
        first.fill(&5.);
        assert_eq!(copy.bins().unwrap().values(), [1., 0.]);
        assert_eq!(first.empty_clone().bins().unwrap().values(), [0., 0.]);
    }

    #[test]
    fn arithmetic() {
        let template: Histogram<f64> = spec(&[0., 1., 2., 3.]).into();
        let mut h1 = template.empty_clone();
        let mut h2 = template.empty_clone();
        let mut h3 = template.empty_clone();
        for x in [0.5, 1.5, 1.5] {
            h1.fill(&x);
        }
        for x in [2.5, 0.1] {
            h2.fill(&x);
        }
        h3.fill(&2.9);

        let left = (h1.clone() + h2.clone()) + h3.clone();
        let right = h1.clone() + (h2.clone() + h3.clone());
        assert_eq!(left.bins(), right.bins());
        assert_eq!(left.bins().unwrap().values(), [2., 2., 2.]);

        let c = 0.25;
        let scaled_sum = c * (h1.clone() + h2.clone());
        let sum_scaled = c * h1 + c * h2;
        assert_eq!(scaled_sum.bins(), sum_scaled.bins());
    }

    #[test]
    #[should_panic]
    fn add_different_binning() {
        let mut h1 = spec(&[0., 1.]).book().into_bins();
        let h2 = spec(&[0., 2.]).book().into_bins();
        h1 += h2;
    }

    fn weighted() -> WeightedHistograms<(f64, HashMap<String, f64>)> {
        WeightedHistograms::new(
            BinEdges::new(vec![0., 10., 20.]).unwrap(),
            |e: &(f64, HashMap<String, f64>)| e.0,
            |e: &(f64, HashMap<String, f64>)| e.1.clone(),
            ["a".to_string(), "b".to_string()],
        )
    }

    #[test]
    fn named_weights() {
        let mut h = weighted();
        let weights = HashMap::from([("a".to_string(), 0.5)]);
        h.fill(&(5., weights.clone()));
        h.fill(&(15., weights.clone()));
        h.fill(&(25., weights));
        assert_eq!(h.get("a").unwrap().values(), [0.5, 0.5]);
        assert_eq!(h.get("b").unwrap().values(), [1., 1.]);
        assert!(h.get("c").is_none());
        assert_eq!(h.get_or_zero("c").values(), [0., 0.]);

        let empty = h.empty_clone();
        assert_eq!(empty.get("a").unwrap().values(), [0., 0.]);
        assert_eq!(h.get("a").unwrap().values(), [0.5, 0.5]);
    }

    #[test]
    fn compound() {
        let template = Histogram::from(
            HistogramCompound::new()
                .with("fine", spec(&[0., 5., 10., 15., 20.]))
                .with("coarse", spec(&[0., 10., 20.])),
        );
        let mut h = template.empty_clone();
        h.fill(&7.);
        h *= 2.;
        let compound = h.as_compound().unwrap();
        assert_eq!(compound.len(), 2);
        assert_eq!(
            compound.get("fine").unwrap().bins().unwrap().values(),
            [0., 2., 0., 0.]
        );
        assert_eq!(
            compound.get("coarse").unwrap().bins().unwrap().values(),
            [2., 0.]
        );
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, r#"{"fine":[0.0,2.0,0.0,0.0],"coarse":[2.0,0.0]}"#);
    }
}
