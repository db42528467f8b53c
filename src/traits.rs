/// Reduce an event to the objects an analysis works with
pub trait Select<E> {
    type Output;
    type Error;

    fn select(&mut self, event: E) -> Result<Self::Output, Self::Error>;
}

impl<E, O, Err, F> Select<E> for F
where
    F: FnMut(E) -> Result<O, Err>,
{
    type Output = O;
    type Error = Err;

    fn select(&mut self, event: E) -> Result<O, Err> {
        self(event)
    }
}

/// Pass events on unchanged
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct NoSelection {}

/// Perform no object selection
pub const NO_SELECTION: NoSelection = NoSelection {};

impl<E> Select<E> for NoSelection {
    type Output = E;
    type Error = std::convert::Infallible;

    fn select(&mut self, event: E) -> Result<E, Self::Error> {
        Ok(event)
    }
}

/// A number computed from selected objects
pub trait Observable<E> {
    fn value(&self, objects: &E) -> f64;
}

impl<E, F> Observable<E> for F
where
    F: Fn(&E) -> f64,
{
    fn value(&self, objects: &E) -> f64 {
        self(objects)
    }
}

/// Accumulate selected events
pub trait Fill<E> {
    fn fill(&mut self, objects: &E);
}

/// Create an empty copy with the same configuration
pub trait Template {
    fn empty_clone(&self) -> Self;
}
