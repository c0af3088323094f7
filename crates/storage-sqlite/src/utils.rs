//! Utility functions for SQLite storage operations.

/// Maximum number of parameters bound in a single `IN (...)` clause.
///
/// SQLite limits bound parameters per statement (SQLITE_MAX_VARIABLE_NUMBER,
/// often 999), so large id lists are split into chunks of this size.
pub const SQLITE_MAX_PARAMS_CHUNK: usize = 500;

/// Chunk a slice into slices of at most `SQLITE_MAX_PARAMS_CHUNK` items.
pub fn chunk_for_sqlite<T>(items: &[T]) -> impl Iterator<Item = &[T]> {
    items.chunks(SQLITE_MAX_PARAMS_CHUNK)
}

/// Builds a `%term%` LIKE pattern with `%`, `_` and `\` escaped by `\`.
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
