/// Compute X (seconds) and Y (WPM) upper bounds for the live chart
pub fn compute_chart_params(wpm_coords: &[(f64, f64)]) -> (f64, f64) {
    let highest_wpm = wpm_coords
        .iter()
        .map(|&(_, wpm)| wpm)
        .fold(0.0_f64, f64::max);

    let overall_duration = wpm_coords.last().map_or(1.0, |p| p.0).max(1.0);

    // a flat zero line still needs a non-empty y range
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
