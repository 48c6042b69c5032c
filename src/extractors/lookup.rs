// src/extractors/lookup.rs

/// An accessor that may or may not resolve a value from `S`.
pub type Accessor<S, T> = fn(&S) -> Option<T>;

/// Tries each accessor in order and returns the first value that resolves.
/// Callers supply their own default for the `None` case.
pub fn first_resolved<S, T>(source: &S, accessors: &[Accessor<S, T>]) -> Option<T> {
    accessors.iter().find_map(|accessor| accessor(source))
}
