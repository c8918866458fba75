//! Note GUID generation.

const BASE91: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz!#$%&()*+,-./:;<=>?@[]^_`{|}~";

/// Source of fresh note GUIDs.
pub trait GuidSource {
    /// Produce a new GUID.
    fn next_guid(&mut self) -> String;
}

/// Random 64-bit GUIDs, base-91 encoded.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomGuid;

impl GuidSource for RandomGuid {
    fn next_guid(&mut self) -> String {
        guid64()
    }
}

/// A fresh random GUID.
pub fn guid64() -> String {
    base91(rand::random::<u64>())
}

/// Encode `n` in Anki's base-91 alphabet, least significant digit first.
pub fn base91(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut result = String::new();
    while n > 0 {
        result.push(BASE91[(n % 91) as usize] as char);
        n /= 91;
    }
    result
}
