/// Revenue split in basis points (1/100 of a percent).
#[derive(Debug, Clone, Copy)]
pub struct Split {
    pub partner_bps: u32,
    pub platform_bps: u32,
}

pub const DEFAULT_SPLIT: Split = Split {
    partner_bps: 9000,
    platform_bps: 1000,
};

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Partner share is rounded to cents; the platform takes the exact remainder
/// so the two always sum to the rounded input amount.
pub fn calc_split(amount_usdc: f64, split: Split) -> (f64, f64) {
    let partner = round2(amount_usdc * split.partner_bps as f64 / 10_000.0);
    let platform = round2(amount_usdc - partner);
    (partner, platform)
}
