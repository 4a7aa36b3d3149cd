//! Synthetic ROM images for unit tests.

use crate::Cartridge;

/// A minimal iNES v1 image: one 16KB PRG page (CHR RAM), horizontal
/// mirroring, mapper 0. `prg` lands at $8000 and the reset vector points
/// at it.
pub(crate) fn nrom_image(prg: &[u8]) -> Vec<u8> {
    assert!(prg.len() <= 0x4000);

    let mut image = vec![0u8; 0x10 + 0x4000];
    image[..4].copy_from_slice(&[b'N', b'E', b'S', 0x1a]);
    image[4] = 1; // PRG pages
    image[5] = 0; // CHR pages -> CHR RAM

    image[0x10..0x10 + prg.len()].copy_from_slice(prg);
    // reset vector: $8000 (PRG offset $3ffc, mirrored into both windows)
    image[0x10 + 0x3ffc] = 0x00;
    image[0x10 + 0x3ffd] = 0x80;

    image
}

pub(crate) fn nrom_cart(prg: &[u8]) -> Cartridge {
    Cartridge::load(&nrom_image(prg)).unwrap()
}
