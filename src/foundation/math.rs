pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Round a pixel measure to an integer, never below `min`.
pub(crate) fn round_px_at_least(v: f64, min: f64) -> f64 {
    v.round().max(min)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
