// Random payload for junk files (not meant to be cryptographic)

use rand::RngCore;

pub trait RandomByteSource: Send {
    /// Overwrites all of `buf` with fresh bytes.
    fn fill(&mut self, buf: &mut [u8]);
}

/// Thread-local generator from `rand`, reseeded from the OS.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngSource;

impl RandomByteSource for ThreadRngSource {
    fn fill(&mut self, buf: &mut [u8]) {
        rand::rng().fill_bytes(buf);
    }
}
