//! Loudness level (phon) and loudness statistics

/// Loudness at which the two branches of the phon conversion meet (sone)
const BRANCH_SONE: f64 = 1.0;

/// Loudness level of 1 sone (phon)
const BRANCH_PHON: f64 = 40.0;

/// Convert loudness (sone) to loudness level (phon)
///
/// Above 1 sone every doubling of loudness adds 10 phon; below it the
/// ISO 532-1 power-law approximation applies. Negative input counts as zero.
pub fn sone_to_phon(sone: f64) -> f64 {
    let sone = sone.max(0.0);
    if sone < BRANCH_SONE {
        BRANCH_PHON * (sone + 0.0005).powf(0.35)
    } else {
        BRANCH_PHON + 10.0 * sone.log2()
    }
}

/// Convert loudness level (phon) back to loudness (sone)
///
/// Levels below the loudness level of silence map to zero.
pub fn phon_to_sone(phon: f64) -> f64 {
    if phon < BRANCH_PHON {
        ((phon.max(0.0) / BRANCH_PHON).powf(1.0 / 0.35) - 0.0005).max(0.0)
    } else {
        2.0_f64.powf((phon - BRANCH_PHON) / 10.0)
    }
}

/// Linear-interpolated percentile of `values` (`percent` in 0..=100)
///
/// Returns `None` for an empty slice or a percentage outside 0..=100.
pub fn percentile(values: &[f64], percent: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=100.0).contains(&percent) {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = percent / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Loudness exceeded during `percent` % of the time
pub fn exceeded_percentile(values: &[f64], percent: f64) -> Option<f64> {
    if !(0.0..=100.0).contains(&percent) {
        return None;
    }
    percentile(values, 100.0 - percent)
}
