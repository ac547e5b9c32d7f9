use std::borrow::Cow;
use std::time::{Duration, Instant};

/// Scoped timer that logs its lifetime on drop. Use through the [`TIME!`]
/// macro, which compiles to nothing in release builds.
#[derive(Debug)]
pub struct Timing<'a> {
    started: Instant,
    level: log::Level,
    label: Cow<'a, str>,
}

impl<'a> Default for Timing<'a> {
    fn default() -> Self {
        Self {
            started: Instant::now(),
            level: log::Level::Trace,
            label: "TIME!".into(),
        }
    }
}

#[allow(unused)]
impl<'a> Timing<'a> {
    pub fn new<N>(label: N) -> Self
    where
        N: Into<Cow<'a, str>>,
    {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    #[inline]
    fn elapsed(&self) -> Duration {
        Instant::now().duration_since(self.started)
    }
}

impl<'a> Drop for Timing<'a> {
    fn drop(&mut self) {
        log::log!(self.level, "[{:?}] {}", self.elapsed(), self.label);
    }
}

#[macro_export]
#[cfg(debug_assertions)]
macro_rules! TIME {
    () => {
        let _x = $crate::debug::Timing::default();
    };
    ($label:expr) => {
        let _x = $crate::debug::Timing::new($label);
    };
    ($($arg:expr),*) => {
        let _x = $crate::debug::Timing::new(format!($($arg),*));
    };
}
#[macro_export]
#[cfg(not(debug_assertions))]
macro_rules! TIME {
    () => {
        ()
    };
    ($label: expr) => {
        ()
    };
    ($($arg:expr),*) => {
        ()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    const LABEL: &str = "timing";

    #[test]
    fn label_defaults_to_macro_name() {
        let t: Timing = Timing::default();
        assert_eq!(t.label, "TIME!");
    }

    #[test]
    fn label_from_str() {
        let t: Timing = Timing::new(LABEL);
        assert_eq!(t.label, LABEL);
    }

    #[test]
    fn label_from_string() {
        let t: Timing = Timing::new(String::from(LABEL));
        assert_eq!(t.label, LABEL);
    }

    #[test]
    fn label_from_cow() {
        let t: Timing = Timing::new(Cow::Borrowed(LABEL));
        assert_eq!(t.label, LABEL);

        let t: Timing = Timing::new(Cow::Owned(String::from(LABEL)));
        assert_eq!(t.label, LABEL);
    }
}
