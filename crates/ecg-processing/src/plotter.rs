//! Serial-plotter style text rendering
//!
//! One comma-separated line per sample containing only the active columns.
//! Pacing and cancellation belong to the caller.

use crate::filter_bank::FilterSnapshot;
use ecg_core::{EcgError, EcgResult, FilterActivation, FilterKind};

/// Default upper bound on rendered lines
pub const DEFAULT_LINE_LIMIT: usize = 300;

/// Column titles of the active streams
pub fn header(activation: FilterActivation) -> String {
    activation
        .enabled_kinds()
        .map(|kind| kind.column_name())
        .collect::<Vec<_>>()
        .join(",")
}

/// Render up to `limit` lines, truncated to the shortest stream
pub fn lines(
    snapshot: &FilterSnapshot,
    activation: FilterActivation,
    limit: usize,
) -> EcgResult<Vec<String>> {
    if snapshot.raw.is_empty() {
        return Err(EcgError::EmptyData { operation: "plotter" });
    }

    let count = snapshot.aligned_len().min(limit);
    let lines = (0..count)
        .map(|i| {
            activation
                .enabled_kinds()
                .map(|kind| match kind {
                    FilterKind::Raw => snapshot.raw[i].to_string(),
                    FilterKind::MovingAverage => format!("{:?}", snapshot.average[i]),
                    FilterKind::Median => snapshot.median[i].to_string(),
                    FilterKind::Exponential => format!("{:?}", snapshot.exponential[i]),
                })
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect();

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter_bank::FilterBank;

    fn snapshot_of(count: i32) -> FilterSnapshot {
        let mut bank = FilterBank::default();
        for sample in 0..count {
            bank.process(sample * 10, FilterActivation::all_on());
        }
        bank.snapshot()
    }

    #[test]
    fn test_header_follows_activation() {
        assert_eq!(header(FilterActivation::all_on()), "Crudo,Promedio,Mediana,Exponencial");
        assert_eq!(header(FilterActivation::raw_only()), "Crudo");

        let mut activation = FilterActivation::all_off();
        activation.set(FilterKind::Median, true);
        activation.set(FilterKind::Exponential, true);
        assert_eq!(header(activation), "Mediana,Exponencial");
    }

    #[test]
    fn test_lines_subset_of_columns() {
        let snapshot = snapshot_of(6);
        let mut activation = FilterActivation::all_off();
        activation.set(FilterKind::Raw, true);
        activation.set(FilterKind::MovingAverage, true);

        let lines = lines(&snapshot, activation, DEFAULT_LINE_LIMIT).unwrap();
        assert_eq!(lines, vec!["0,20.0".to_string(), "10,30.0".to_string()]);
    }

    #[test]
    fn test_lines_respect_limit() {
        let snapshot = snapshot_of(400);
        let lines = lines(&snapshot, FilterActivation::all_on(), DEFAULT_LINE_LIMIT).unwrap();
        assert_eq!(lines.len(), 300);
        assert_eq!(lines[0].split(',').count(), 4);
    }

    #[test]
    fn test_no_data() {
        let result = lines(&FilterSnapshot::default(), FilterActivation::all_on(), 10);
        assert_eq!(result, Err(EcgError::EmptyData { operation: "plotter" }));
    }
}
