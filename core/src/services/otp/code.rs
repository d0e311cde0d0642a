use rand::{rngs::OsRng, Rng};

/// Generate a zero-padded numeric code of `length` digits
///
/// Draws uniformly from `0..10^length` using the operating system CSPRNG.
/// `length` is clamped to 1..=18 so the range fits in a `u64`.
pub fn generate_code(length: usize) -> String {
    let length = length.clamp(1, 18);
    let upper = 10u64.pow(length as u32);
    let value = OsRng.gen_range(0..upper);
    format!("{:0width$}", value, width = length)
}
