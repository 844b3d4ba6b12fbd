//! # Finish predicates
//!
//! A controller's run finishes when any one of a list of named conditions
//! holds. Conditions are either convergence of the controller itself or
//! overrides from an outside source (e.g. a vision sensor) which end the run
//! early. Sources are checked in the order they were added.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{info, warn};
use serde::Serialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A source which can finish a run.
pub struct FinishSource<T: ?Sized> {
    pub name: &'static str,
    pub kind: FinishKind,
    check: Box<dyn Fn(&T) -> bool + Send>,
}

/// Any-of combination of finish sources.
pub struct FinishPredicate<T: ?Sized> {
    sources: Vec<FinishSource<T>>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum FinishKind {
    /// The controller reached its target.
    Converged,

    /// An outside source ended the run before convergence.
    Override,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<T: ?Sized> FinishPredicate<T> {
    /// A predicate which never finishes.
    pub fn never() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// A predicate with a single convergence source.
    pub fn converged<F>(name: &'static str, check: F) -> Self
    where
        F: Fn(&T) -> bool + Send + 'static,
    {
        Self::never().or(name, FinishKind::Converged, check)
    }

    /// Add another source to the predicate.
    pub fn or<F>(mut self, name: &'static str, kind: FinishKind, check: F) -> Self
    where
        F: Fn(&T) -> bool + Send + 'static,
    {
        self.sources.push(FinishSource {
            name,
            kind,
            check: Box::new(check),
        });
        self
    }

    /// Add an override source to the predicate.
    pub fn or_override<F>(self, name: &'static str, check: F) -> Self
    where
        F: Fn(&T) -> bool + Send + 'static,
    {
        self.or(name, FinishKind::Override, check)
    }

    /// Return the first source which holds for the input, if any.
    pub fn evaluate(&self, input: &T) -> Option<&FinishSource<T>> {
        let source = self.sources.iter().find(|s| (s.check)(input))?;

        match source.kind {
            FinishKind::Converged => info!("Finished: {}", source.name),
            FinishKind::Override => warn!("Finish overridden by {}", source.name),
        }

        Some(source)
    }

    pub fn num_sources(&self) -> usize {
        self.sources.len()
    }
}
