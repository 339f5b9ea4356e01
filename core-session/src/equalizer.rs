//! Equalizer band mapping.
//!
//! Pure translation from a requested center frequency and dB gain to the
//! nearest supported engine band and a clamped millibel gain. The engine's
//! band table arrives through the capability query on
//! [`PlaybackPort`](bridge_traits::PlaybackPort), so the mapper is testable
//! without hardware.

use bridge_traits::{EqualizerBand, EqualizerCapabilities, GainRange};

use crate::error::{Result, SessionError};

/// A resolved engine band assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandSetting {
    /// Engine band index to apply the gain to.
    pub band: u16,
    /// Gain in millibels, clamped to the engine's range.
    pub gain_mb: i16,
}

/// Choose the band whose center frequency is closest to `requested_hz`.
///
/// Ties break to the first minimum in scan order, i.e. the lowest band
/// index. An empty band table is a precondition violation and is reported as
/// [`SessionError::EmptyBandTable`].
pub fn select_band(requested_hz: u32, bands: &[EqualizerBand]) -> Result<u16> {
    bands
        .iter()
        .min_by_key(|band| (i64::from(band.center_hz) - i64::from(requested_hz)).abs())
        .map(|band| band.index)
        .ok_or(SessionError::EmptyBandTable)
}

/// Convert a dB gain to millibels and clamp it to the engine's range.
pub fn clamp_gain_mb(gain_db: i16, range: GainRange) -> i16 {
    (i32::from(gain_db) * 100).clamp(i32::from(range.min_mb), i32::from(range.max_mb)) as i16
}

/// Resolve a band request against the engine's capabilities.
pub fn map_band(
    requested_hz: u32,
    gain_db: i16,
    caps: &EqualizerCapabilities,
) -> Result<BandSetting> {
    let band = select_band(requested_hz, &caps.bands)?;
    Ok(BandSetting {
        band,
        gain_mb: clamp_gain_mb(gain_db, caps.gain_range),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps() -> EqualizerCapabilities {
        EqualizerCapabilities {
            bands: [60, 230, 910, 3600, 14_000]
                .iter()
                .enumerate()
                .map(|(i, &hz)| EqualizerBand {
                    index: i as u16,
                    center_hz: hz,
                })
                .collect(),
            gain_range: GainRange {
                min_mb: -1500,
                max_mb: 1500,
            },
        }
    }

    #[test]
    fn request_for_1000_hz_selects_the_910_band() {
        assert_eq!(select_band(1000, &caps().bands).unwrap(), 2);
    }

    #[test]
    fn exact_center_frequency_selects_its_band() {
        assert_eq!(select_band(14_000, &caps().bands).unwrap(), 4);
    }

    #[test]
    fn ties_break_to_the_lowest_band_index() {
        let bands = vec![
            EqualizerBand {
                index: 0,
                center_hz: 100,
            },
            EqualizerBand {
                index: 1,
                center_hz: 300,
            },
        ];
        // 200 Hz is equidistant from both centers.
        assert_eq!(select_band(200, &bands).unwrap(), 0);
    }

    #[test]
    fn empty_band_table_is_reported() {
        assert!(matches!(
            select_band(1000, &[]),
            Err(SessionError::EmptyBandTable)
        ));
    }

    #[test]
    fn gain_is_clamped_to_the_device_range() {
        let range = GainRange {
            min_mb: -1500,
            max_mb: 1500,
        };
        assert_eq!(clamp_gain_mb(20, range), 1500);
        assert_eq!(clamp_gain_mb(-20, range), -1500);
        assert_eq!(clamp_gain_mb(7, range), 700);
    }

    #[test]
    fn map_band_composes_selection_and_clamping() {
        let setting = map_band(1000, 20, &caps()).unwrap();
        assert_eq!(setting.band, 2);
        assert_eq!(setting.gain_mb, 1500);
    }
}
