//! Running checksums for the container trailers.
//!
//! - **CRC-32 (ISO 3309)**: gzip trailer, gzip header CRC (low 16 bits)
//! - **Adler-32 (RFC 1950)**: zlib trailer
//!
//! CRC-32 uses the slicing-by-8 technique for inputs of 16 bytes or more,
//! processing 8 bytes per step with 8 pre-computed tables. Shorter inputs use
//! the single-table byte loop.

/// Reflected CRC-32 polynomial.
const CRC32_POLY: u32 = 0xEDB88320;

/// CRC-32 slicing-by-8 lookup tables. Table 0 is the classic byte table.
const CRC32_TABLES: [[u32; 256]; 8] = {
    let mut tables = [[0u32; 256]; 8];

    let mut i = 0usize;
    while i < 256 {
        let mut crc = i as u32;
        let mut j = 0;
        while j < 8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ CRC32_POLY;
            } else {
                crc >>= 1;
            }
            j += 1;
        }
        tables[0][i] = crc;
        i += 1;
    }

    let mut t = 1;
    while t < 8 {
        let mut i = 0usize;
        while i < 256 {
            let prev = tables[t - 1][i];
            tables[t][i] = tables[0][(prev & 0xFF) as usize] ^ (prev >> 8);
            i += 1;
        }
        t += 1;
    }

    tables
};

/// Largest prime smaller than 65536.
const ADLER_MOD: u32 = 65521;

/// Bytes that can be summed before `b` may overflow a u32.
const ADLER_NMAX: usize = 5552;

/// A running checksum over uncompressed data.
///
/// Implemented by [`Crc32`] and [`Adler32`] so the framing layer can thread
/// either through the same output path.
pub trait Checksum {
    /// Feed more data.
    fn update(&mut self, data: &[u8]);

    /// Current checksum of everything fed so far.
    fn value(&self) -> u32;
}

/// CRC-32 calculator (ISO 3309), as used by gzip.
///
/// - Polynomial: 0x04C11DB7 (reflected: 0xEDB88320)
/// - Initial value / final XOR: 0xFFFFFFFF
///
/// # Example
///
/// ```
/// use oxiflate_core::checksum::Crc32;
///
/// let mut crc = Crc32::new();
/// crc.update(b"Hello, World!");
/// assert_eq!(crc.finalize(), 0xEC4AC3D0);
/// ```
#[derive(Debug, Clone)]
pub struct Crc32 {
    crc: u32,
}

impl Crc32 {
    /// Create a new CRC-32 calculator.
    pub fn new() -> Self {
        Self { crc: 0xFFFFFFFF }
    }

    /// Update the CRC with more data.
    #[inline]
    pub fn update(&mut self, data: &[u8]) {
        if data.len() >= 16 {
            crc32_slice8(&mut self.crc, data);
        } else {
            crc32_bytes(&mut self.crc, data);
        }
    }

    /// Current CRC value (without consuming the calculator).
    #[inline]
    pub fn value(&self) -> u32 {
        self.crc ^ 0xFFFFFFFF
    }

    /// Finalize and return the CRC value.
    #[inline]
    pub fn finalize(self) -> u32 {
        self.crc ^ 0xFFFFFFFF
    }

    /// Compute CRC-32 for a slice in one call.
    pub fn compute(data: &[u8]) -> u32 {
        let mut crc = Self::new();
        crc.update(data);
        crc.finalize()
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

impl Checksum for Crc32 {
    fn update(&mut self, data: &[u8]) {
        Crc32::update(self, data);
    }

    fn value(&self) -> u32 {
        Crc32::value(self)
    }
}

#[inline]
fn crc32_bytes(crc: &mut u32, data: &[u8]) {
    for &byte in data {
        let index = ((*crc ^ byte as u32) & 0xFF) as usize;
        *crc = CRC32_TABLES[0][index] ^ (*crc >> 8);
    }
}

#[inline]
fn crc32_slice8(crc: &mut u32, data: &[u8]) {
    let mut c = *crc;
    let mut chunks = data.chunks_exact(8);

    for bytes in &mut chunks {
        let lo = c ^ u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        c = CRC32_TABLES[7][(lo & 0xFF) as usize]
            ^ CRC32_TABLES[6][((lo >> 8) & 0xFF) as usize]
            ^ CRC32_TABLES[5][((lo >> 16) & 0xFF) as usize]
            ^ CRC32_TABLES[4][(lo >> 24) as usize]
            ^ CRC32_TABLES[3][bytes[4] as usize]
            ^ CRC32_TABLES[2][bytes[5] as usize]
            ^ CRC32_TABLES[1][bytes[6] as usize]
            ^ CRC32_TABLES[0][bytes[7] as usize];
    }

    crc32_bytes(&mut c, chunks.remainder());
    *crc = c;
}

/// Adler-32 checksum calculator, as used by zlib.
///
/// Faster than CRC-32 but weaker on short inputs.
///
/// # Example
///
/// ```
/// use oxiflate_core::checksum::Adler32;
///
/// assert_eq!(Adler32::checksum(b"Wikipedia"), 0x11E60398);
/// ```
#[derive(Debug, Clone)]
pub struct Adler32 {
    a: u32,
    b: u32,
}

impl Adler32 {
    /// Create a new Adler-32 calculator.
    pub fn new() -> Self {
        Self { a: 1, b: 0 }
    }

    /// Update the checksum with more data.
    pub fn update(&mut self, data: &[u8]) {
        let mut a = self.a;
        let mut b = self.b;

        // Reduce every NMAX bytes so `b` cannot overflow.
        for chunk in data.chunks(ADLER_NMAX) {
            for &byte in chunk {
                a += byte as u32;
                b += a;
            }
            a %= ADLER_MOD;
            b %= ADLER_MOD;
        }

        self.a = a;
        self.b = b;
    }

    /// Current checksum value.
    pub fn finish(&self) -> u32 {
        (self.b << 16) | self.a
    }

    /// Compute Adler-32 checksum of data in one shot.
    pub fn checksum(data: &[u8]) -> u32 {
        let mut adler = Self::new();
        adler.update(data);
        adler.finish()
    }
}

impl Default for Adler32 {
    fn default() -> Self {
        Self::new()
    }
}

impl Checksum for Adler32 {
    fn update(&mut self, data: &[u8]) {
        Adler32::update(self, data);
    }

    fn value(&self) -> u32 {
        self.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc32_empty() {
        assert_eq!(Crc32::compute(b""), 0x00000000);
    }

    #[test]
    fn test_crc32_check() {
        // Standard CRC-32 check value for "123456789"
        assert_eq!(Crc32::compute(b"123456789"), 0xCBF43926);
    }

    #[test]
    fn test_crc32_incremental() {
        let mut crc = Crc32::new();
        crc.update(b"Hello");
        crc.update(b", ");
        crc.update(b"World!");
        assert_eq!(crc.finalize(), 0xEC4AC3D0);
    }

    #[test]
    fn test_crc32_table_correctness() {
        assert_eq!(CRC32_TABLES[0][0], 0x00000000);
        assert_eq!(CRC32_TABLES[0][1], 0x77073096);
        assert_eq!(CRC32_TABLES[0][255], 0x2D02EF8D);
    }

    #[test]
    fn test_crc32_slice8_matches_bytewise() {
        for size in [1, 7, 8, 15, 16, 17, 31, 32, 63, 64, 127, 128, 255, 256, 1000] {
            let data: Vec<u8> = (0..size).map(|i| (i * 31 + 7) as u8).collect();

            let mut sliced = 0xFFFFFFFF;
            crc32_slice8(&mut sliced, &data);
            let mut bytewise = 0xFFFFFFFF;
            crc32_bytes(&mut bytewise, &data);

            assert_eq!(sliced, bytewise, "size {}", size);
        }
    }

    #[test]
    fn test_adler32_empty() {
        assert_eq!(Adler32::checksum(&[]), 1);
    }

    #[test]
    fn test_adler32_hello() {
        assert_eq!(Adler32::checksum(b"Hello"), 0x058C01F5);
    }

    #[test]
    fn test_adler32_incremental() {
        let data = b"Hello, World!";
        let mut adler = Adler32::new();
        adler.update(&data[..6]);
        adler.update(&data[6..]);
        assert_eq!(adler.finish(), Adler32::checksum(data));
    }

    #[test]
    fn test_adler32_large() {
        // Longer than NMAX with maximal byte values.
        let data = vec![0xFFu8; 20000];
        let mut split = Adler32::new();
        for chunk in data.chunks(777) {
            split.update(chunk);
        }
        assert_eq!(split.finish(), Adler32::checksum(&data));

        let mut a: u64 = 1;
        let mut b: u64 = 0;
        for &byte in &data {
            a = (a + byte as u64) % ADLER_MOD as u64;
            b = (b + a) % ADLER_MOD as u64;
        }
        assert_eq!(Adler32::checksum(&data), ((b << 16) | a) as u32);
    }

    #[test]
    fn test_checksum_trait_objects() {
        let mut sums: Vec<Box<dyn Checksum>> = vec![Box::new(Crc32::new()), Box::new(Adler32::new())];
        for sum in &mut sums {
            sum.update(b"123456789");
        }
        assert_eq!(sums[0].value(), 0xCBF43926);
        assert_eq!(sums[1].value(), 0x091E01DE);
    }
}
