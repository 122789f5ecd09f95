/// Compute X (seconds) and Y (WPM) bounds for the results chart.
/// Both are at least 1 so the axes never collapse.
pub fn compute_chart_params(wpm_coords: &[(f64, f64)]) -> (f64, f64) {
    let highest_wpm = wpm_coords
        .iter()
        .map(|&(_, wpm)| wpm)
        .fold(0.0, f64::max);

    let overall_duration = wpm_coords.last().map_or(1.0, |x| x.0).max(1.0);

    (overall_duration, highest_wpm.round().max(1.0))
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}

/// Style bucket for a heatmap cell, 0 for untouched keys up to 3 for the worst
pub fn heat_level(count: u64, max: u64) -> u8 {
    if count == 0 || max == 0 {
        return 0;
    }
    let ratio = count as f64 / max as f64;
    if ratio > 2.0 / 3.0 {
        3
    } else if ratio > 1.0 / 3.0 {
        2
    } else {
        1
    }
}
