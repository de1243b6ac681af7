//! Shared "skip-and-fill" permutation construction used by both [`crate::sbox`]
//! and [`crate::pbox`] — identical algorithm, different width.

/// Build mutually inverse `(encode_map, decode_map)` arrays of length
/// `key.len()` from `key`.
///
/// For `i` in `0..N`: walk forward from the cursor (wrapping mod `N`),
/// counting unfilled slots, until the `target`-th unfilled slot (1-based,
/// derived from `key[i]`) has been reached; assign `encode_map[cursor] = i`
/// there. The cursor counts its own slot before advancing — this exact
/// order is load-bearing for interoperability, not an implementation detail.
pub fn build_maps(key: &[u8]) -> (Vec<u16>, Vec<u16>) {
    let n = key.len();
    assert!(n > 0 && n <= u16::MAX as usize + 1, "permutation width out of range");

    let mut encode_map: Vec<i32> = vec![-1; n];
    let mut index = 0usize;

    for i in 0..n {
        let max_empty = n - i;
        let target = 1 + (key[i] as usize % max_empty);

        let mut empty_counter = 0usize;
        while empty_counter < target {
            if encode_map[index] == -1 {
                empty_counter += 1;
            }
            if empty_counter < target {
                index = (index + 1) % n;
            }
        }
        encode_map[index] = i as i32;
    }

    let encode_map: Vec<u16> = encode_map.into_iter().map(|v| v as u16).collect();
    let mut decode_map = vec![0u16; n];
    for (i, &e) in encode_map.iter().enumerate() {
        decode_map[e as usize] = i as u16;
    }
    (encode_map, decode_map)
}
