//! The main memory of the LS-8.

use std::fmt;

/// Number of addressable memory cells.
pub const MEMORY_SIZE: usize = 256;

/// Flat, byte-addressable random access memory.
///
/// Every `u8` is a valid address, so reads and writes cannot fail.
#[derive(Clone)]
pub struct Ram {
    cells: [u8; MEMORY_SIZE],
}

impl Ram {
    pub fn new() -> Ram {
        Ram {
            cells: [0; MEMORY_SIZE],
        }
    }

    /// Returns the byte stored at `address`.
    pub fn read(&self, address: u8) -> u8 {
        self.cells[address as usize]
    }

    /// Overwrites the byte stored at `address`.
    pub fn write(&mut self, address: u8, value: u8) {
        self.cells[address as usize] = value;
    }

    /// Copies `image` into memory starting from address 0.
    ///
    /// Bytes past the end of the memory are ignored; callers check the size beforehand.
    pub fn load(&mut self, image: &[u8]) {
        for (cell, byte) in self.cells.iter_mut().zip(image) {
            *cell = *byte;
        }
    }
}

impl Default for Ram {
    fn default() -> Ram {
        Ram::new()
    }
}

impl fmt::Debug for Ram {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // Only the non-zero cells, a full dump is mostly noise.
        f.debug_map()
            .entries(self.cells.iter().enumerate().filter(|(_, v)| **v != 0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_write() {
        let mut ram = Ram::new();

        ram.write(0xFF, 42);
        ram.write(0x00, 7);

        assert_eq!(ram.read(0xFF), 42);
        assert_eq!(ram.read(0x00), 7);
        assert_eq!(ram.read(0x80), 0);
    }

    #[test]
    fn test_load() {
        let mut ram = Ram::new();
        ram.write(3, 9);
        ram.load(&[1, 2, 3]);

        assert_eq!(ram.read(0), 1);
        assert_eq!(ram.read(2), 3);
        assert_eq!(ram.read(3), 9);
    }
}
