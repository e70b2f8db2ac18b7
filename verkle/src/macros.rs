//! Switches between rayon and plain iterators depending on the `parallel`
//! feature. Call sites need `rayon::prelude::*` in scope when it is enabled.

/// `par_iter()` with the `parallel` feature, `iter()` without.
macro_rules! use_iter {
    ($e: expr) => {{
        #[cfg(feature = "parallel")]
        {
            $e.par_iter()
        }

        #[cfg(not(feature = "parallel"))]
        {
            $e.iter()
        }
    }};
}
