//! Internal implementation details.

pub(crate) mod circular;
pub(crate) mod map;

pub(crate) use circular::ResolutionStack;
pub(crate) use map::FastMap;
