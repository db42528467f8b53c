pub use crate::{
    analysis::{CutFlow, EventAnalysis},
    combine::{Combination, Normalisation},
    config::AnalysisConfig,
    event::{Event, EventBuilder},
    event_loop::EventLoop,
    four_vector::FourVector,
    histogram::{BinEdges, Histogram, HistogramSpec, WeightedHistograms},
    object::{Category, PhysicsObject, SelectedObjects},
    particle::Particle,
    reader::{make_reader, make_reader_with_weights},
    run::run_samples,
    traits::{Fill, Observable, Select},
};
