//! Packed color words
//!
//! A color word is `0xEERRGGBB`: the high byte is the emissive intensity, the
//! low three bytes are RGB. Palette entries and voxel insertions all use this
//! layout, and the renderer reads it back unchanged.

/// Mask selecting the RGB part of a color word
pub const RGB_MASK: u32 = 0x00FF_FFFF;

/// Emissive intensity used for light sources created by the loader
pub const FULL_EMISSIVE: u8 = 0xFF;

/// Pure white, fully emissive
pub const WHITE_LIGHT: u32 = pack_emissive(255, 255, 255, FULL_EMISSIVE);

/// Pack RGB888 into a non-emissive color word
pub const fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Pack RGB888 plus emissive intensity into a color word
pub const fn pack_emissive(r: u8, g: u8, b: u8, emissive: u8) -> u32 {
    ((emissive as u32) << 24) | pack_rgb(r, g, b)
}

/// Unpack the RGB888 components of a color word
pub fn unpack_rgb(color: u32) -> (u8, u8, u8) {
    (
        ((color >> 16) & 0xFF) as u8,
        ((color >> 8) & 0xFF) as u8,
        (color & 0xFF) as u8,
    )
}

/// Emissive intensity (high byte)
pub const fn emissive(color: u32) -> u8 {
    (color >> 24) as u8
}

/// Check if a color word marks a light source
pub const fn is_emissive(color: u32) -> bool {
    emissive(color) != 0
}

/// Replace the emissive byte of a color word
pub const fn with_emissive(color: u32, emissive: u8) -> u32 {
    (color & RGB_MASK) | ((emissive as u32) << 24)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_layout() {
        assert_eq!(pack_rgb(0xFF, 0x80, 0x00), 0x00FF_8000);
        assert_eq!(pack_emissive(1, 2, 3, 4), 0x0401_0203);
        assert_eq!(WHITE_LIGHT, 0xFFFF_FFFF);
    }

    #[test]
    fn test_unpack() {
        assert_eq!(unpack_rgb(0x7F12_3456), (0x12, 0x34, 0x56));
    }

    #[test]
    fn test_emissive_byte() {
        let c = pack_rgb(10, 20, 30);
        assert!(!is_emissive(c));

        let lit = with_emissive(c, 0x40);
        assert!(is_emissive(lit));
        assert_eq!(emissive(lit), 0x40);
        assert_eq!(lit & RGB_MASK, c);
        assert_eq!(with_emissive(lit, 0), c);
    }
}
