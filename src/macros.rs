/// Timestamped phase logging.
/// Pass a starting time as the first argument to also report the elapsed time.
/// ```
/// use chrono::Local;
/// use revscrape::log_time;
///
/// log_time!("scraped {} pages", 12);
/// let started = Local::now();
/// log_time!(started, "scraped {} pages", 12);
/// ```
#[macro_export]
macro_rules! log_time {
    ($fmt:literal $(,)? $($arg:expr),*) => {{
        println!(
            "{} | {}",
            Local::now().format("%H:%M:%S%.3f"),
            format!($fmt, $($arg),*)
        );
    }};
    ($started:expr, $fmt:literal $(,)? $($arg:expr),*) => {{
        let elapsed = (Local::now() - $started).num_milliseconds() as f64 / 1000.0;
        println!(
            "{} | {} ({elapsed:.3}s)",
            Local::now().format("%H:%M:%S%.3f"),
            format!($fmt, $($arg),*)
        );
    }};
}
