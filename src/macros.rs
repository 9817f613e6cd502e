/// Unwrap a `Result` or `Option`, returning early with a formatted
/// message attached if it holds no value.
#[macro_export]
macro_rules! unwrap {
    ($value:expr, $($message:tt)+) => {{
        #[allow(unused_imports)]
        use eyre::{Context, ContextCompat};

        $value.wrap_err_with(|| format!($($message)+))?
    }};
}
