/// Times a block through a [`Timer`](crate::metrics::Timer) and evaluates to
/// the block's value. The sample is recorded when the block is left, so an
/// early `?` return or an `.await` that never resumes still records one.
#[macro_export]
macro_rules! measure_block {
    ($timer:expr, $code:block) => {{
        let _guard = $timer.start();
        $code
    }};
}

#[macro_export]
macro_rules! measure {
    ($timer:expr, $code:block) => {
        $crate::measure_block!($timer, $code)
    };
}
