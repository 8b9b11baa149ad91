/// Trusted reference oracle: the standard Fibonacci sequence under the
/// 1-indexed convention, `Fib(1) = Fib(2) = 1`.
///
/// Terminates for all `n >= 1`. The recursive definition has no meaning for
/// `n <= 0` and callers are expected to validate before calling; the harness
/// rejects non-positive input at the read boundary.
pub fn reference_fib(n: i64) -> i64 {
    if n == 1 {
        return 1;
    }
    if n == 2 {
        return 1;
    }
    reference_fib(n - 1) + reference_fib(n - 2)
}

/// Independently written iterative computation of the same sequence.
///
/// Backs the built-in self-check candidate, so the default configuration
/// compares two distinct algorithms rather than one function against itself.
pub fn iterative_fib(n: i64) -> i64 {
    let mut k = n;
    let mut i = 1i64;
    let mut j = 1i64;
    while k > 2 {
        let next = i + j;
        j = i;
        i = next;
        k -= 1;
    }
    i
}
