use chrono::NaiveDateTime;

/// Reference clock used to split shows into past and upcoming.
///
/// Handlers receive it through the application state so listings can be
/// evaluated against a fixed instant in tests.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in the server's local time zone, matching how show times are entered.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}
