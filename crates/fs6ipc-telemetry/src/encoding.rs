//! Legacy numeric encodings.
//!
//! Every function here is pure and bit-exact with what FS6IPC clients expect.
//! Float-to-integer conversions truncate toward zero; rounding, where the
//! legacy layout asks for it, is round-half-to-even.

/// 2^32, one full turn in the 32-bit binary angle format.
const TURN_32: f64 = 65536.0 * 65536.0;

/// Latitude fixed-point scale: 10001750 m per 90 degrees, times 2^32.
pub const LAT_SCALE: f64 = 10_001_750.0 * 65536.0 * 65536.0;

/// Longitude fixed-point scale: 2^64 per 360 degrees.
pub const LON_SCALE: f64 = (65536.0 * 65536.0 * 65536.0 * 65536.0) / 360.0;

/// Truncate a float toward zero, saturating at the i64 range (NaN gives 0).
pub fn trunc(value: f64) -> i64 {
    value as i64
}

/// 32-bit unsigned binary angle, 2^32 == 360 degrees. Wraps like the legacy
/// `& 0xFFFFFFFF` mask.
pub fn angle32(deg: f64) -> u32 {
    trunc(deg * TURN_32 / 360.0) as u32
}

/// Signed view of [`angle32`], used by pitch and bank.
pub fn signed_angle32(deg: f64) -> i32 {
    angle32(deg) as i32
}

/// Heading normalised into `[0, 360)` before encoding.
pub fn heading32(deg: f64) -> u32 {
    angle32(deg.rem_euclid(360.0))
}

/// 16-bit direction, 65536 == 360 degrees.
pub fn direction16(deg: f64) -> u16 {
    trunc(deg.rem_euclid(360.0) / 360.0 * 65536.0) as u16
}

/// Altitude in metres as 32.32 fixed point.
pub fn altitude(metres: f64) -> i64 {
    trunc(metres * TURN_32)
}

/// Airspeed in knots * 128, masked to 32 bits.
pub fn knots128(knots: f64) -> u32 {
    trunc(knots * 128.0) as u32
}

/// Vertical speed in m/s * 256, two's complement in 32 bits.
pub fn vertical_speed256(mps: f64) -> u32 {
    trunc(mps * 256.0) as u32
}

/// Latitude clamped to `[-90, 90]` as signed 64-bit fixed point.
pub fn latitude(deg: f64) -> i64 {
    let deg = deg.clamp(-90.0, 90.0);
    trunc((deg / 90.0) * LAT_SCALE)
}

/// Longitude normalised into `[-180, 180)` as signed 64-bit fixed point.
///
/// Periodic with period 360 degrees; non-finite input encodes 0.
pub fn longitude(deg: f64) -> i64 {
    if !deg.is_finite() {
        return 0;
    }
    let mut deg = (deg + 180.0).rem_euclid(360.0) - 180.0;
    if deg >= 180.0 {
        deg -= 360.0;
    }
    trunc(deg * LON_SCALE)
}

/// Four nibble-packed decimal digits of `value` clamped to `[0, 9999]`.
///
/// With `octal` set each digit is additionally clamped to 7, as transponder
/// codes only use digits 0-7.
pub fn bcd4(value: i64, octal: bool) -> u16 {
    let mut rest = value.clamp(0, 9999) as u16;
    let mut packed = 0u16;
    for shift in [0u16, 4, 8, 12] {
        let mut digit = rest % 10;
        if octal {
            digit = digit.min(7);
        }
        packed |= digit << shift;
        rest /= 10;
    }
    packed
}

/// COM frequency in MHz as 4 BCD digits with the leading "1" implied.
///
/// The frequency is snapped to the 0.025 MHz grid first, so 8.33 kHz
/// channels land on their 25 kHz neighbours. `123.80` encodes `0x2380`.
pub fn com_frequency(mhz: f64) -> u16 {
    if mhz <= 0.0 || !mhz.is_finite() {
        return 0;
    }
    let snapped = (mhz * 40.0).round_ties_even() / 40.0;
    let mut number = trunc((snapped * 100.0).round_ties_even());
    if number >= 10_000 {
        number -= 10_000;
    }
    bcd4(number.clamp(0, 9999), false)
}

/// Ground elevation as `(metres * 256, whole metres)`, each clamped to its slot.
pub fn ground_altitude(metres: f64) -> (i32, i16) {
    let coarse = trunc(metres * 256.0).clamp(i64::from(i32::MIN), i64::from(i32::MAX));
    let fine = trunc(metres.round_ties_even()).clamp(i64::from(i16::MIN), i64::from(i16::MAX));
    (coarse as i32, fine as i16)
}

/// Scale a `[0, 1]` ratio onto `0..=full`, clamping the ratio first.
pub fn ratio_units(ratio: f64, full: f64) -> i64 {
    trunc(ratio.clamp(0.0, 1.0) * full)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn angle_quarter_turns() {
        assert_eq!(angle32(0.0), 0);
        assert_eq!(angle32(90.0), 0x4000_0000);
        assert_eq!(angle32(180.0), 0x8000_0000);
        assert_eq!(angle32(-90.0), 0xC000_0000);
        assert_eq!(signed_angle32(-90.0), -0x4000_0000);
    }

    #[test]
    fn heading_wraps_into_one_turn() {
        assert_eq!(heading32(360.0), 0);
        assert_eq!(heading32(-90.0), 0xC000_0000);
        assert_eq!(heading32(450.0), 0x4000_0000);
    }

    #[test]
    fn direction16_wraps() {
        assert_eq!(direction16(0.0), 0);
        assert_eq!(direction16(180.0), 0x8000);
        assert_eq!(direction16(-90.0), 0xC000);
    }

    #[test]
    fn speed_scales() {
        assert_eq!(knots128(100.0), 12_800);
        assert_eq!(knots128(320.0), 40_960);
        assert_eq!(vertical_speed256(1.0), 256);
        assert_eq!(vertical_speed256(-1.0), 0xFFFF_FF00);
    }

    #[test]
    fn latitude_clamps_to_poles() {
        assert_eq!(latitude(0.0), 0);
        assert_eq!(latitude(90.0), LAT_SCALE as i64);
        assert_eq!(latitude(120.0), latitude(90.0));
        assert_eq!(latitude(-95.0), -(LAT_SCALE as i64));
    }

    #[test]
    fn longitude_wraps_antimeridian() {
        assert_eq!(longitude(200.0), longitude(200.0 - 360.0));
        assert_eq!(longitude(180.0), longitude(-180.0));
        assert!(longitude(-180.0) < longitude(-179.0));
        assert_eq!(longitude(90.0), (90.0 * LON_SCALE) as i64);
        assert_eq!(longitude(f64::NAN), 0);
    }

    #[test]
    fn bcd_packs_digits() {
        assert_eq!(bcd4(1234, false), 0x1234);
        assert_eq!(bcd4(7, false), 0x0007);
        assert_eq!(bcd4(12_345, false), 0x9999);
        assert_eq!(bcd4(-3, false), 0x0000);
    }

    #[test]
    fn bcd_octal_clamps_each_digit() {
        assert_eq!(bcd4(7000, true), 0x7000);
        assert_eq!(bcd4(1289, true), 0x1277);
        assert_eq!(bcd4(9999, true), 0x7777);
    }

    #[test]
    fn com_frequency_strips_leading_one() {
        assert_eq!(com_frequency(123.80), 0x2380);
        assert_eq!(com_frequency(118.0), 0x1800);
        assert_eq!(com_frequency(121.5), 0x2150);
        assert_eq!(com_frequency(0.0), 0);
        assert_eq!(com_frequency(-1.0), 0);
    }

    #[test]
    fn com_frequency_snaps_to_25_khz_grid() {
        // 8.33 kHz channel 118.005 lies on the 118.000 grid point.
        assert_eq!(com_frequency(118.005), 0x1800);
        assert_eq!(com_frequency(124.851), 0x2485);
        assert_eq!(com_frequency(132.0), 0x3200);
    }

    #[test]
    fn ground_altitude_parts() {
        assert_eq!(ground_altitude(100.0), (25_600, 100));
        assert_eq!(ground_altitude(2.5), (640, 2));
        assert_eq!(ground_altitude(1e12), (i32::MAX, i16::MAX));
    }

    #[test]
    fn ratio_units_clamp() {
        assert_eq!(ratio_units(0.5, 16383.0), 8191);
        assert_eq!(ratio_units(2.0, 16383.0), 16383);
        assert_eq!(ratio_units(-1.0, 16383.0), 0);
    }

    proptest! {
        #[test]
        fn longitude_is_periodic(quarter_degrees in -4320i32..4320) {
            let deg = f64::from(quarter_degrees) / 4.0;
            prop_assert_eq!(longitude(deg), longitude(deg - 360.0));
            prop_assert_eq!(longitude(deg), longitude(deg + 720.0));
        }

        #[test]
        fn octal_bcd_nibbles_never_exceed_seven(value in 0i64..10_000) {
            let packed = bcd4(value, true);
            for shift in [0u16, 4, 8, 12] {
                prop_assert!((packed >> shift) & 0xF <= 7);
            }
        }
    }
}
