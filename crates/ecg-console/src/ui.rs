//! Text rendering for the console menus and reports

use ecg_acquisition::{EcgPattern, SchedulerState};
use ecg_core::{FilterActivation, FilterKind, SampleRate};
use ecg_processing::{AcquisitionStats, SensorDiagnosis, SignalLevel, StreamSummary};
use std::fmt::Debug;
use std::time::Duration;

const RULE: &str = "==================================================";

pub fn banner(source_name: &str, rate: SampleRate) -> String {
    format!(
        "{}\n  ECG acquisition console\n  Sensor: {}  |  Rate: {}\n{}",
        RULE, source_name, rate, RULE
    )
}

pub fn main_menu(state: SchedulerState, indicator_on: bool) -> String {
    let sampling = match state {
        SchedulerState::Running { rate, .. } => format!("sampling at {}", rate),
        SchedulerState::Stopped => "stopped".to_string(),
    };
    let led = if indicator_on { "ON" } else { "off" };
    format!(
        "\n--- Main menu ({} | activity {}) ---\n\
         1. Acquisition monitor\n\
         2. Set sample rate\n\
         3. Configure filters\n\
         4. Plotter view\n\
         5. Export data\n\
         6. Statistics\n\
         7. Sensor diagnostics\n\
         8. Clear buffers\n\
         9. Simulated sensor pattern\n\
         0. Quit",
        sampling, led
    )
}

pub fn pattern_menu(presets: &[(&str, EcgPattern)]) -> String {
    let mut out = String::from("\n--- Sensor pattern ---");
    for (i, (name, pattern)) in presets.iter().enumerate() {
        out.push_str(&format!("\n{}. {:<12} {}", i + 1, name, pattern.description()));
    }
    out
}

/// Current activation table plus the submenu choices
pub fn filter_menu(activation: FilterActivation) -> String {
    let mut out = String::from("\n--- Filters ---\n");
    for (i, kind) in FilterKind::ALL.iter().enumerate() {
        out.push_str(&format!(
            "{}. [{}] {:<12} {}\n",
            i + 1,
            if activation.is_enabled(*kind) { "x" } else { " " },
            kind.column_name(),
            kind.description()
        ));
    }
    out.push_str("5. Enable all\n6. Disable all\n7. Raw only\n0. Back");
    out
}

pub fn monitor_line(elapsed: Duration, samples: u64, indicator_on: bool) -> String {
    let secs = elapsed.as_secs_f64();
    let achieved = if secs > 0.0 { samples as f64 / secs } else { 0.0 };
    format!(
        "[{:>5.1}s] samples: {:>6}  rate: {:>6.1} Hz  activity: {}",
        secs,
        samples,
        achieved,
        if indicator_on { "ON" } else { "off" }
    )
}

fn field<T: Debug>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:?}", v))
}

fn summary_line<T: Copy + Debug>(kind: FilterKind, summary: &StreamSummary<T>) -> String {
    format!(
        "  {:<12} n={:<4} min={:<10} max={:<10} last={}",
        kind.column_name(),
        summary.count,
        field(summary.min),
        field(summary.max),
        field(summary.latest)
    )
}

pub fn stats(stats: &AcquisitionStats) -> String {
    let mut lines = vec![
        "\n--- Statistics ---".to_string(),
        format!("  Sample rate: {}", stats.sample_rate),
        summary_line(FilterKind::Raw, &stats.raw),
        summary_line(FilterKind::MovingAverage, &stats.average),
        summary_line(FilterKind::Median, &stats.median),
        summary_line(FilterKind::Exponential, &stats.exponential),
    ];

    if let Some(spread) = stats.variability() {
        lines.push(format!("  Raw variability: {}", spread));
    }

    let active: Vec<&str> = stats
        .activation
        .enabled_kinds()
        .map(|kind| kind.column_name())
        .collect();
    lines.push(format!(
        "  Active streams: {}",
        if active.is_empty() { "none".to_string() } else { active.join(", ") }
    ));

    lines.join("\n")
}

fn level_label(level: SignalLevel) -> &'static str {
    match level {
        SignalLevel::VeryLow => "very low",
        SignalLevel::Low => "low",
        SignalLevel::Normal => "normal",
        SignalLevel::Saturated => "saturated",
    }
}

pub fn diagnosis(diagnosis: &SensorDiagnosis) -> String {
    let readings: Vec<String> = diagnosis.readings.iter().map(|r| r.to_string()).collect();
    let mut lines = vec![
        "\n--- Sensor diagnostics ---".to_string(),
        format!("  Readings: {}", readings.join(" ")),
        format!(
            "  Min: {}  Max: {}  Mean: {:.1}  Range: {}",
            diagnosis.min,
            diagnosis.max,
            diagnosis.mean,
            diagnosis.range()
        ),
        format!("  Level: {}", level_label(diagnosis.level)),
    ];

    if diagnosis.is_flat() {
        lines.push("  Signal is flat: check the electrode leads".to_string());
    }
    for hint in diagnosis.level.advice() {
        lines.push(format!("  - {}", hint));
    }

    lines.join("\n")
}
