use std::sync::atomic::{AtomicU8, Ordering};

/// How chatty terminal output is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Verbosity {
    Quiet = 0,
    Normal = 1,
    Verbose = 2,
}

static VERBOSITY: AtomicU8 = AtomicU8::new(Verbosity::Normal as u8);

impl Verbosity {
    /// `--quiet` wins over `--verbose`.
    pub fn from_flags(quiet: bool, verbose: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => Verbosity::Quiet,
            (false, true) => Verbosity::Verbose,
            (false, false) => Verbosity::Normal,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => Verbosity::Quiet,
            2 => Verbosity::Verbose,
            _ => Verbosity::Normal,
        }
    }
}

pub fn set_verbosity(level: Verbosity) {
    VERBOSITY.store(level as u8, Ordering::Relaxed);
}

pub fn verbosity() -> Verbosity {
    Verbosity::from_u8(VERBOSITY.load(Ordering::Relaxed))
}

pub fn is_quiet() -> bool {
    verbosity() == Verbosity::Quiet
}

pub fn is_verbose() -> bool {
    verbosity() == Verbosity::Verbose
}

/// Operator-facing progress line on stdout.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {{
        if !$crate::logger::is_quiet() {
            println!($($arg)*)
        }
    }};
}

/// Extra detail, only with `--verbose`.
#[macro_export]
macro_rules! verbose {
    ($($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            println!("🔍 {}", format!($($arg)*))
        }
    }};
}

/// Always printed, even in quiet mode.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {{
        eprintln!("❌ {}", format!($($arg)*))
    }};
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {{
        if !$crate::logger::is_quiet() {
            eprintln!("⚠️  {}", format!($($arg)*))
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Quiet);
    }

    #[test]
    fn test_macros_usable_as_expressions() {
        let outcome: Result<(), &str> = Err("boom");
        match outcome {
            Ok(()) => crate::info!("fine"),
            Err(e) => crate::error!("{}", e),
        }
        let _unit: () = crate::warn!("{}", 1);
        let _unit: () = crate::verbose!("{}", 2);
    }

    #[test]
    fn test_verbosity_round_trips() {
        for level in [Verbosity::Quiet, Verbosity::Verbose, Verbosity::Normal] {
            assert_eq!(Verbosity::from_u8(level as u8), level);
        }
    }
}
