pub const MIN_WPM_BASE: u32 = 10;
pub const MIN_WPM_STEP: u32 = 2;
pub const MIN_WPM_CAP: u32 = 40;

pub const MIN_ACCURACY_BASE: u32 = 80;
pub const MIN_ACCURACY_STEP: u32 = 1;
pub const MIN_ACCURACY_CAP: u32 = 95;

/// Words per minute needed to pass a stage. Non-decreasing, capped at 40.
pub fn min_wpm(stage: u32) -> u32 {
    let steps = stage.saturating_sub(1);
    MIN_WPM_BASE
        .saturating_add(steps.saturating_mul(MIN_WPM_STEP))
        .min(MIN_WPM_CAP)
}

/// Accuracy percentage needed to pass a stage. Non-decreasing, capped at 95.
pub fn min_accuracy(stage: u32) -> u32 {
    let steps = stage.saturating_sub(1);
    MIN_ACCURACY_BASE
        .saturating_add(steps.saturating_mul(MIN_ACCURACY_STEP))
        .min(MIN_ACCURACY_CAP)
}

pub fn passes(stage: u32, wpm: f64, accuracy: f64) -> bool {
    wpm >= f64::from(min_wpm(stage)) && accuracy >= f64::from(min_accuracy(stage))
}
