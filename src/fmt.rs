// Logging shims. The backend is picked at compile time: `log` wins over `defmt`,
// and with neither feature enabled the arguments are only borrowed so that no
// unused-variable warnings leak into the callers.

#![macro_use]
#![allow(unused_macros)]

macro_rules! emit {
    ($level:ident, $s:literal $(, $x:expr)* $(,)?) => {
        {
            cfg_if::cfg_if! {
                if #[cfg(feature = "log")] {
                    ::log::$level!($s $(, $x)*);
                } else if #[cfg(feature = "defmt")] {
                    ::defmt::$level!($s $(, $x)*);
                } else {
                    let _ = ($( & $x ),*);
                }
            }
        }
    };
}

macro_rules! trace {
    ($($arg:tt)*) => {
        emit!(trace, $($arg)*)
    };
}

macro_rules! debug {
    ($($arg:tt)*) => {
        emit!(debug, $($arg)*)
    };
}

macro_rules! info {
    ($($arg:tt)*) => {
        emit!(info, $($arg)*)
    };
}

macro_rules! warn {
    ($($arg:tt)*) => {
        emit!(warn, $($arg)*)
    };
}

macro_rules! error {
    ($($arg:tt)*) => {
        emit!(error, $($arg)*)
    };
}
