use std::fmt;

use log::{info, trace};

use crate::traits::Select;

type CutFn<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// A named event selection cut
pub struct Cut<T> {
    name: String,
    pass: CutFn<T>,
}

impl<T> Cut<T> {
    pub fn new<F>(name: impl Into<String>, pass: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            pass: Box::new(pass),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn passes(&self, objects: &T) -> bool {
        (self.pass)(objects)
    }
}

impl<T> fmt::Debug for Cut<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cut").field(&self.name).finish()
    }
}

/// Number of events passing each cut
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CutFlow {
    seen: u64,
    passed: Vec<(String, u64)>,
}

impl CutFlow {
    fn new<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            seen: 0,
            passed: names.into_iter().map(|n| (n.to_owned(), 0)).collect(),
        }
    }

    /// Number of events that entered the cut sequence
    pub fn seen(&self) -> u64 {
        self.seen
    }

    /// Cut names and the number of events passing that cut and all
    /// cuts before it
    pub fn passed(&self) -> &[(String, u64)] {
        &self.passed
    }

    /// Number of events passing all cuts
    pub fn selected(&self) -> u64 {
        self.passed.last().map(|(_, n)| *n).unwrap_or(self.seen)
    }

    fn reset(&mut self) {
        self.seen = 0;
        for (_, n) in &mut self.passed {
            *n = 0;
        }
    }

    pub fn log(&self) {
        info!("Cut flow: {} events", self.seen);
        for (name, n) in &self.passed {
            info!("  {name}: {n}");
        }
    }
}

/// Analysis of a single event
///
/// An event is first reduced to the objects needed in the analysis by
/// the selection. Then the cuts are applied in the order in which they
/// were added. An event is selected if it passes all cuts. Evaluation
/// stops at the first failed cut.
pub struct EventAnalysis<S, T> {
    selection: S,
    cuts: Vec<Cut<T>>,
    cutflow: CutFlow,
}

impl<S, T> EventAnalysis<S, T> {
    pub fn new(selection: S) -> Self {
        Self {
            selection,
            cuts: Vec::new(),
            cutflow: CutFlow::default(),
        }
    }

    /// Add a cut
    pub fn cut<F>(mut self, name: impl Into<String>, pass: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.cuts.push(Cut::new(name, pass));
        self.cutflow = CutFlow::new(self.cuts.iter().map(|c| c.name()));
        self
    }

    pub fn cuts(&self) -> &[Cut<T>] {
        &self.cuts
    }

    pub fn cutflow(&self) -> &CutFlow {
        &self.cutflow
    }

    /// Return the current cut flow and start a new one
    pub fn take_cutflow(&mut self) -> CutFlow {
        let res = self.cutflow.clone();
        self.cutflow.reset();
        res
    }

    /// Run the analysis on an event
    ///
    /// Returns whether the event passes all cuts together with the
    /// selected objects.
    pub fn evaluate<E>(&mut self, event: E) -> Result<(bool, T), S::Error>
    where
        S: Select<E, Output = T>,
    {
        let objects = self.selection.select(event)?;
        self.cutflow.seen += 1;
        for (cut, (_, passed)) in self.cuts.iter().zip(&mut self.cutflow.passed) {
            if !cut.passes(&objects) {
                trace!("Event fails cut {}", cut.name());
                return Ok((false, objects));
            }
            *passed += 1;
        }
        Ok((true, objects))
    }
}

impl<S: fmt::Debug, T> fmt::Debug for EventAnalysis<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventAnalysis")
            .field("selection", &self.selection)
            .field("cuts", &self.cuts)
            .field("cutflow", &self.cutflow)
            .finish()
    }
}
