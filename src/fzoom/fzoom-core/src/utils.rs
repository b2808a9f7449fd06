// Move `current` by a signed `delta`, saturating inside [0, dimension - 1]
pub fn step_clamped(current: u32, delta: i64, dimension: u32) -> u32 {
    if dimension == 0 {
        return 0;
    }
    let max = i64::from(dimension - 1);
    i64::from(current).saturating_add(delta).clamp(0, max) as u32
}

// Round a BMP row length up to the next multiple of `alignment`
pub fn padded_row_len(width: u32, alignment: u32) -> u32 {
    match width % alignment {
        0 => width,
        rem => width + (alignment - rem),
    }
}
