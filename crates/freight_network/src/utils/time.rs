/// Runs `$block` and logs how long it took at debug level.
#[macro_export]
macro_rules! timer_debug {
    ($msg:literal, $block:expr) => {{
        let now = jiff::Timestamp::now();
        let result = $block;
        let elapsed = jiff::Timestamp::now().duration_since(now);

        tracing::debug!("{}: took {:?}", $msg, elapsed);

        result
    }};
}

/// Converts a duration into fractional minutes, the unit used for planning costs.
pub fn as_minutes(duration: jiff::SignedDuration) -> f64 {
    duration.as_secs_f64() / 60.0
}
