//! Tools for interrupting function flow unless some condition holds.

/// Early exit if given condition is not satisfied.
///
/// There are two variants:
/// * `ensure!(cond)` returns from the enclosing function with [`None`] if `cond` fails
/// * `ensure!(cond, err)` returns from the function with [`Err`]`(err)` if `cond` fails
///
/// Example with [Option]:
/// ```
/// # use utils::ensure;
/// fn difficulty_interval(timespan: u64, spacing: u64) -> Option<u64> {
///     ensure!(spacing != 0);
///     Some(timespan / spacing)
/// }
///
/// assert_eq!(difficulty_interval(302400, 150), Some(2016));
/// assert_eq!(difficulty_interval(60, 60), Some(1));
/// assert_eq!(difficulty_interval(60, 0), None);
/// ```
///
/// Example with [Result]:
/// ```
/// # use utils::ensure;
/// # #[derive(PartialEq, Eq, Debug)]
/// enum HeaderError {
///     UnknownVersion,
///     TimestampTooOld,
/// }
///
/// fn check_header(version: i32, time: u32, median_past: u32) -> Result<(), HeaderError> {
///     ensure!(version >= 1, HeaderError::UnknownVersion);
///     ensure!(time > median_past, HeaderError::TimestampTooOld);
///     Ok(())
/// }
///
/// assert_eq!(check_header(1, 100, 50), Ok(()));
/// assert_eq!(check_header(0, 100, 50), Err(HeaderError::UnknownVersion));
/// assert_eq!(check_header(2, 50, 50), Err(HeaderError::TimestampTooOld));
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr $(,)?) => {
        ::core::primitive::bool::then($cond, || ())?
    };
    ($cond:expr, $err:expr $(,)?) => {
        ::core::primitive::bool::then($cond, || ()).ok_or_else(|| $err)?
    };
}
