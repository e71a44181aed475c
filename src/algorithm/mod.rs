/// Window dissimilarity metrics
pub mod distance;
/// Direct sampling engine and its lazy realization sequence
pub mod sampler;
/// Greedy random search for matching candidate windows
pub mod search;
