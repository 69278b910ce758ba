//! The legacy offset catalogue.
//!
//! Each [`Field`] maps one [`FlightSample`] quantity to a fixed offset and
//! slot type. Integer values are written through
//! [`AddressSpace::write_int`], so anything outside the slot range saturates
//! instead of wrapping.

use fs6ipc_memory::AddressSpace;

use crate::encoding::{
    altitude, bcd4, com_frequency, direction16, ground_altitude, heading32, knots128, latitude,
    longitude, ratio_units, signed_angle32, trunc, vertical_speed256,
};
use crate::sample::{FlightSample, FUEL_LBS_PER_GAL, LBS_PER_SLUG, MAX_SPOILER_DEFLECTION_DEG};

/// Storage type of a catalogue slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    U8,
    U16,
    S16,
    U32,
    S32,
    S64,
    F64,
}

impl Slot {
    /// Width in bytes.
    pub fn width(self) -> usize {
        match self {
            Slot::U8 => 1,
            Slot::U16 | Slot::S16 => 2,
            Slot::U32 | Slot::S32 => 4,
            Slot::S64 | Slot::F64 => 8,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(self, Slot::S16 | Slot::S32 | Slot::S64)
    }
}

/// Encoded value for one refresh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Int(i128),
    Float(f64),
    /// Leave the slot as it is.
    Skip,
}

macro_rules! int_value {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Value::Int(i128::from(value))
            }
        })*
    };
}

int_value!(u8, u16, i16, u32, i32, i64, bool);

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

type Encode = Box<dyn Fn(&FlightSample) -> Value + Send + Sync>;

/// One offset of the catalogue.
pub struct Field {
    pub offset: usize,
    pub slot: Slot,
    pub name: &'static str,
    encode: Encode,
}

impl Field {
    pub fn new<F>(offset: usize, slot: Slot, name: &'static str, encode: F) -> Self
    where
        F: Fn(&FlightSample) -> Value + Send + Sync + 'static,
    {
        Self {
            offset,
            slot,
            name,
            encode: Box::new(encode),
        }
    }

    /// Encode this field from `sample`.
    pub fn encode(&self, sample: &FlightSample) -> Value {
        (self.encode)(sample)
    }

    /// Encode and store into `memory`. Float values bound for integer slots
    /// are truncated toward zero first.
    pub fn store(&self, sample: &FlightSample, memory: &mut AddressSpace) -> fs6ipc_memory::Result<()> {
        match (self.encode(sample), self.slot) {
            (Value::Skip, _) => Ok(()),
            (Value::Float(v), Slot::F64) => memory.write_f64(self.offset, v),
            (Value::Int(v), Slot::F64) => memory.write_f64(self.offset, v as f64),
            (Value::Float(v), slot) => {
                memory.write_int(self.offset, i128::from(trunc(v)), slot.width(), slot.is_signed())
            }
            (Value::Int(v), slot) => memory.write_int(self.offset, v, slot.width(), slot.is_signed()),
        }
    }
}

impl std::fmt::Debug for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("offset", &format_args!("0x{:04X}", self.offset))
            .field("slot", &self.slot)
            .field("name", &self.name)
            .finish()
    }
}

/// Engine slot offsets: combustion, N2, N1, fuel flow, oil temp, oil pressure.
const ENGINE_OFFSETS: [[usize; 6]; 4] = [
    [0x0894, 0x0896, 0x0898, 0x090A, 0x08B8, 0x08BA],
    [0x092C, 0x092E, 0x0930, 0x0942, 0x0950, 0x0952],
    [0x09C4, 0x09C6, 0x09C8, 0x09DA, 0x09E8, 0x09EA],
    [0x0A5C, 0x0A5E, 0x0A60, 0x0A72, 0x0A80, 0x0A82],
];

const ENGINE_NAMES: [[&str; 6]; 4] = [
    ["eng1_combustion", "eng1_n2", "eng1_n1", "eng1_fuel_flow", "eng1_oil_temp", "eng1_oil_pressure"],
    ["eng2_combustion", "eng2_n2", "eng2_n1", "eng2_fuel_flow", "eng2_oil_temp", "eng2_oil_pressure"],
    ["eng3_combustion", "eng3_n2", "eng3_n1", "eng3_fuel_flow", "eng3_oil_temp", "eng3_oil_pressure"],
    ["eng4_combustion", "eng4_n2", "eng4_n1", "eng4_fuel_flow", "eng4_oil_temp", "eng4_oil_pressure"],
];

/// Deploy offsets for left main, right main and nose gear.
const GEAR_DEPLOY_OFFSETS: [(usize, &str); 3] = [
    (0x0C34, "gear_left_deploy"),
    (0x0C30, "gear_right_deploy"),
    (0x0C38, "gear_nose_deploy"),
];

fn rounded(value: f64) -> i64 {
    trunc(value + 0.5)
}

fn rpm_units(pct: f64) -> i64 {
    trunc(pct.clamp(0.0, 110.0) / 100.0 * 16384.0)
}

fn pounds_256(lbs: f64) -> i64 {
    rounded(lbs.clamp(0.0, f64::from(u32::MAX) / 256.0) * 256.0)
}

fn pressure_16(value: f64, max: f64) -> i64 {
    rounded(value.clamp(0.0, max) * 16.0)
}

/// The full catalogue in refresh order.
pub fn default_catalogue() -> Vec<Field> {
    let mut fields = vec![
        // handshake
        Field::new(0x3304, Slot::U32, "fsuipc_version", |s| s.identity.version_word().into()),
        Field::new(0x3308, Slot::U16, "fs_version", |s| s.identity.fs_version.into()),
        Field::new(0x330A, Slot::U16, "handshake_marker", |_| 0xFADEu16.into()),
        Field::new(0x333C, Slot::U16, "fs_flags", |_| (1u16 << 1).into()),
        Field::new(0x3364, Slot::U8, "ready_flag", |_| 0u8.into()),
        // position and attitude
        Field::new(0x0560, Slot::S64, "latitude", |s| latitude(s.latitude_deg).into()),
        Field::new(0x0568, Slot::S64, "longitude", |s| longitude(s.longitude_deg).into()),
        Field::new(0x0570, Slot::S64, "altitude", |s| altitude(s.elevation_m).into()),
        Field::new(0x3324, Slot::S32, "indicated_altitude_ft", |s| {
            trunc(s.indicated_altitude_ft).into()
        }),
        // legacy pitch is positive nose down, bank positive left
        Field::new(0x0578, Slot::S32, "pitch", |s| signed_angle32(-s.pitch_deg).into()),
        Field::new(0x057C, Slot::S32, "bank", |s| signed_angle32(-s.roll_deg).into()),
        Field::new(0x0580, Slot::U32, "heading_mag", |s| heading32(s.heading_mag_deg).into()),
        Field::new(0x02A0, Slot::S16, "magnetic_variation", |s| {
            trunc(s.magnetic_variation_deg / 360.0 * 65536.0).into()
        }),
        // speeds
        Field::new(0x02B4, Slot::U32, "ground_speed", |s| trunc(s.ground_speed_mps * 65536.0).into()),
        Field::new(0x02B8, Slot::U32, "true_airspeed", |s| knots128(s.true_airspeed_kts).into()),
        Field::new(0x02BC, Slot::U32, "indicated_airspeed", |s| {
            knots128(s.indicated_airspeed_kts).into()
        }),
        Field::new(0x02C4, Slot::U32, "barber_pole", |_| knots128(320.0).into()),
        Field::new(0x02C8, Slot::U32, "vertical_speed", |s| {
            vertical_speed256(s.vertical_speed_mps).into()
        }),
        // ground contact and warnings
        Field::new(0x030C, Slot::S32, "landing_rate", |s| s.landing_rate.raw().into()),
        Field::new(0x0366, Slot::U8, "on_ground", |s| s.on_ground.into()),
        Field::new(0x0840, Slot::U16, "crashed", |s| s.crashed.into()),
        Field::new(0x036C, Slot::U8, "stall_warning", |s| s.stall_warning.into()),
        Field::new(0x036D, Slot::U8, "overspeed_warning", |s| s.overspeed_warning.into()),
        Field::new(0x0262, Slot::U16, "paused", |s| s.paused.into()),
        Field::new(0x0264, Slot::U16, "paused_mirror", |s| s.paused.into()),
        Field::new(0x0020, Slot::S32, "ground_altitude", |s| {
            ground_altitude(s.ground_elevation_m).0.into()
        }),
        Field::new(0x0B4C, Slot::S16, "ground_altitude_m", |s| {
            ground_altitude(s.ground_elevation_m).1.into()
        }),
        Field::new(0x31E4, Slot::U32, "radio_altitude", |s| {
            rounded(s.height_agl_m.max(0.0) * 65536.0).into()
        }),
        Field::new(0x0C1A, Slot::U16, "sim_rate", |s| rounded(s.sim_rate * 256.0).into()),
        // lights
        Field::new(0x0280, Slot::U8, "nav_lights", |s| s.lights.nav.into()),
        Field::new(0x0281, Slot::U8, "beacon_strobe", |s| {
            (s.lights.beacon || s.lights.strobe).into()
        }),
        Field::new(0x028C, Slot::U8, "landing_lights", |s| s.lights.landing.into()),
        Field::new(0x0D0C, Slot::U16, "lights", |s| s.lights.bits().into()),
        // controls
        Field::new(0x0BC8, Slot::U16, "parking_brake", |s| {
            ratio_units(s.parking_brake_ratio, 32767.0).into()
        }),
        Field::new(0x0BDC, Slot::U32, "flaps_lever", |s| ratio_units(s.flap_ratio, 16383.0).into()),
        Field::new(0x0BE0, Slot::U32, "flaps_left", |s| ratio_units(s.flap_ratio, 16383.0).into()),
        Field::new(0x0BE4, Slot::U32, "flaps_right", |s| ratio_units(s.flap_ratio, 16383.0).into()),
        Field::new(0x0BD0, Slot::U32, "spoiler_lever", |s| {
            ratio_units(s.spoiler_ratio, 16383.0).into()
        }),
        Field::new(0x0BD4, Slot::U32, "spoiler_left", |s| {
            ratio_units(s.spoiler_left_deg / MAX_SPOILER_DEFLECTION_DEG, 16383.0).into()
        }),
        Field::new(0x0BD8, Slot::U32, "spoiler_right", |s| {
            ratio_units(s.spoiler_right_deg / MAX_SPOILER_DEFLECTION_DEG, 16383.0).into()
        }),
        Field::new(0x0BCC, Slot::U32, "spoiler_arm", |s| {
            (if s.spoiler_armed { 4800u32 } else { 0 }).into()
        }),
        // gear
        Field::new(0x0BE8, Slot::U16, "gear_handle", |s| s.gear_handle_down.into()),
        Field::new(0x060C, Slot::U16, "gear_retractable", |s| s.gear_retractable.into()),
        Field::new(0x060E, Slot::U16, "gear_retractable_mirror", |s| s.gear_retractable.into()),
    ];

    for (idx, (offset, name)) in GEAR_DEPLOY_OFFSETS.into_iter().enumerate() {
        fields.push(Field::new(offset, Slot::U16, name, move |s| {
            ratio_units(s.gear_deploy[idx], 16383.0).into()
        }));
    }
    fields.push(Field::new(0x0C3C, Slot::U16, "gear_all_down", |s| {
        let all_down = s.gear_deploy.iter().all(|r| r.clamp(0.0, 1.0) >= 0.99);
        (if all_down { 16383u16 } else { 0 }).into()
    }));

    for (idx, (offsets, names)) in ENGINE_OFFSETS.into_iter().zip(ENGINE_NAMES).enumerate() {
        let [combustion, n2, n1, fuel_flow, oil_temp, oil_pressure] = offsets;
        fields.push(Field::new(n2, Slot::U16, names[1], move |s| {
            let engine = &s.engines[idx];
            (if engine.running { rpm_units(engine.n2_pct) } else { 0xFFFF }).into()
        }));
        fields.push(Field::new(n1, Slot::U16, names[2], move |s| {
            let engine = &s.engines[idx];
            (if engine.running { rpm_units(engine.n1_pct) } else { 0xFFFF }).into()
        }));
        fields.push(Field::new(combustion, Slot::U16, names[0], move |s| {
            s.engines[idx].running.into()
        }));
        fields.push(Field::new(fuel_flow, Slot::U32, names[3], move |s| {
            trunc((s.engines[idx].fuel_flow_gph * FUEL_LBS_PER_GAL).clamp(0.0, 65535.0)).into()
        }));
        fields.push(Field::new(oil_temp, Slot::U16, names[4], move |s| {
            let fahrenheit = (s.engines[idx].oil_temp_c * 9.0 / 5.0 + 32.0).clamp(-273.0, 999.0);
            trunc(fahrenheit / 140.0 * 16384.0).into()
        }));
        fields.push(Field::new(oil_pressure, Slot::U16, names[5], move |s| {
            trunc(s.engines[idx].oil_pressure_psi.clamp(0.0, 220.0) / 55.0 * 16384.0).into()
        }));
    }

    fields.extend([
        Field::new(0x0AEC, Slot::U16, "engine_count", |s| s.engine_count.into()),
        // fuel
        Field::new(0x0B7C, Slot::U32, "fuel_left_level", |s| {
            ratio_units(s.fuel_fraction(), 128.0 * 65536.0).into()
        }),
        Field::new(0x0B94, Slot::U32, "fuel_right_level", |s| {
            ratio_units(s.fuel_fraction(), 128.0 * 65536.0).into()
        }),
        Field::new(0x0B74, Slot::U32, "fuel_center_level", |_| 0u32.into()),
        Field::new(0x0B80, Slot::U32, "fuel_left_capacity", |s| {
            rounded(s.tank_capacity_gal().clamp(0.0, f64::from(u32::MAX))).into()
        }),
        Field::new(0x0B98, Slot::U32, "fuel_right_capacity", |s| {
            rounded(s.tank_capacity_gal().clamp(0.0, f64::from(u32::MAX))).into()
        }),
        Field::new(0x0B78, Slot::U32, "fuel_center_capacity", |_| 0u32.into()),
        Field::new(0x0AF4, Slot::U16, "fuel_weight_per_gal", |_| {
            rounded(FUEL_LBS_PER_GAL * 256.0).into()
        }),
        // weights
        Field::new(0x30C0, Slot::F64, "gross_weight_lbs", |s| s.total_weight_lbs().into()),
        Field::new(0x30C8, Slot::F64, "gross_weight_slugs", |s| {
            let lbs = s.total_weight_lbs();
            (if lbs > 0.0 { lbs / LBS_PER_SLUG } else { 0.0 }).into()
        }),
        Field::new(0x3BFC, Slot::U32, "zero_fuel_weight", |s| {
            pounds_256(s.zero_fuel_weight_lbs()).into()
        }),
        Field::new(0x1334, Slot::U32, "max_gross_weight", |s| match s.max_gross_lbs() {
            Some(lbs) => pounds_256(lbs).into(),
            None => Value::Skip,
        }),
        Field::new(0x1260, Slot::F64, "max_gross_weight_lbs", |s| match s.max_gross_lbs() {
            Some(lbs) => lbs.into(),
            None => Value::Skip,
        }),
        // cabin
        Field::new(0x3414, Slot::U8, "seatbelt_sign", |s| s.seatbelt_sign.into()),
        Field::new(0x3415, Slot::U8, "no_smoking_sign", |s| s.no_smoking_sign.into()),
        // transponder
        Field::new(0x0354, Slot::U16, "transponder_code", |s| {
            bcd4(s.transponder_code, true).into()
        }),
        Field::new(0x0328, Slot::U8, "transponder_mode", |s| s.transponder_mode.into()),
        Field::new(0x0B46, Slot::U8, "transponder_mode_mirror", |s| s.transponder_mode.into()),
        Field::new(0x7B91, Slot::U8, "transponder_mode_ext", |s| s.transponder_mode.into()),
        // radios
        Field::new(0x034E, Slot::U16, "com1_active", |s| com_frequency(s.com1_active_mhz).into()),
        Field::new(0x311A, Slot::U16, "com1_standby", |s| com_frequency(s.com1_standby_mhz).into()),
        Field::new(0x3118, Slot::U16, "com2_active", |s| com_frequency(s.com2_active_mhz).into()),
        Field::new(0x311C, Slot::U16, "com2_standby", |s| com_frequency(s.com2_standby_mhz).into()),
        // electrical
        Field::new(0x2E80, Slot::U32, "avionics_master", |s| s.avionics_on.into()),
        Field::new(0x281C, Slot::U32, "battery_master", |s| s.battery_on.into()),
        // altimeters
        Field::new(0x0330, Slot::U16, "altimeter_hpa", |s| pressure_16(s.baro_hpa, 2000.0).into()),
        Field::new(0x0332, Slot::U16, "altimeter_inhg", |s| pressure_16(s.baro_inhg, 60.0).into()),
        Field::new(0x3542, Slot::U16, "standby_altimeter_hpa", |s| {
            pressure_16(s.standby_baro_hpa, 2000.0).into()
        }),
        Field::new(0x3544, Slot::S32, "standby_altitude_ft", |s| {
            trunc(s.standby_altitude_ft).into()
        }),
        // g-force
        Field::new(0x11BA, Slot::S16, "g_force", |s| trunc(s.g_force * 625.0).into()),
        Field::new(0x11B8, Slot::S16, "g_force_mirror", |s| trunc(s.g_force * 625.0).into()),
        // wind
        Field::new(0x0E90, Slot::U16, "wind_speed", |s| rounded(s.wind_speed_kts).into()),
        Field::new(0x0E92, Slot::U16, "wind_direction", |s| direction16(s.wind_direction_true).into()),
        Field::new(0x0EEE, Slot::U16, "surface_layer_ceiling", |s| {
            rounded(s.surface_layer_ceiling_m.min(65535.0)).into()
        }),
        Field::new(0x0EF0, Slot::U16, "surface_wind_speed", |s| {
            rounded(s.surface_wind_speed_kts).into()
        }),
        Field::new(0x0EF2, Slot::U16, "surface_wind_direction", |s| {
            direction16(s.surface_wind_direction_mag).into()
        }),
    ]);

    fields
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use fs6ipc_memory::DEFAULT_CAPACITY;

    use super::*;
    use crate::identity::HandshakeIdentity;
    use crate::sample::LandingRateLatch;
    use crate::source::StaticSource;

    fn sample(src: &StaticSource) -> FlightSample {
        let mut latch = LandingRateLatch::default();
        FlightSample::collect(src, HandshakeIdentity::default(), &mut latch)
    }

    fn field(name: &str) -> Field {
        default_catalogue()
            .into_iter()
            .find(|f| f.name == name)
            .unwrap_or_else(|| panic!("catalogue should contain {name}"))
    }

    #[test]
    fn every_field_fits_the_default_space() {
        for f in default_catalogue() {
            assert!(
                f.offset + f.slot.width() <= DEFAULT_CAPACITY,
                "{} at 0x{:04X} overruns",
                f.name,
                f.offset
            );
        }
    }

    #[test]
    fn fields_do_not_overlap() {
        let mut used = HashSet::new();
        for f in default_catalogue() {
            for byte in f.offset..f.offset + f.slot.width() {
                assert!(used.insert(byte), "{} overlaps at 0x{byte:04X}", f.name);
            }
        }
    }

    #[test]
    fn names_are_unique() {
        let catalogue = default_catalogue();
        let names: HashSet<_> = catalogue.iter().map(|f| f.name).collect();
        assert_eq!(names.len(), catalogue.len());
    }

    #[test]
    fn stopped_engine_reports_sentinel() {
        let s = sample(&StaticSource::new());
        assert_eq!(field("eng1_n1").encode(&s), Value::Int(0xFFFF));
        assert_eq!(field("eng1_combustion").encode(&s), Value::Int(0));
    }

    #[test]
    fn running_engine_scales_rpm() {
        let mut src = StaticSource::new();
        src.set_array("sim/flightmodel/engine/ENGN_running", vec![0.0, 1.0])
            .set_array("sim/flightmodel/engine/ENGN_N1_", vec![0.0, 50.0]);
        let s = sample(&src);
        assert_eq!(field("eng2_n1").encode(&s), Value::Int(8192));
        assert_eq!(field("eng2_combustion").encode(&s), Value::Int(1));
        assert_eq!(field("eng1_n1").encode(&s), Value::Int(0xFFFF));
    }

    #[test]
    fn max_gross_is_skipped_when_unreported() {
        let s = sample(&StaticSource::new());
        assert_eq!(field("max_gross_weight").encode(&s), Value::Skip);

        let mut mem = AddressSpace::new();
        mem.write_u32(0x1334, 77).unwrap();
        field("max_gross_weight").store(&s, &mut mem).unwrap();
        assert_eq!(mem.read(0x1334, 4).unwrap(), 77u32.to_le_bytes().to_vec());
    }

    #[test]
    fn store_saturates_to_slot() {
        let mut src = StaticSource::new();
        src.set("sim/flightmodel/position/groundspeed", -5.0);
        let s = sample(&src);
        let mut mem = AddressSpace::new();
        mem.write_u32(0x02B4, 1234).unwrap();
        field("ground_speed").store(&s, &mut mem).unwrap();
        assert_eq!(mem.read(0x02B4, 4).unwrap(), vec![0, 0, 0, 0]);
    }

    #[test]
    fn transponder_code_is_octal_bcd() {
        let mut src = StaticSource::new();
        src.set("sim/cockpit2/radios/actuators/transponder_code", 7700.0);
        assert_eq!(field("transponder_code").encode(&sample(&src)), Value::Int(0x7700));
    }

    #[test]
    fn barometer_default_is_standard() {
        let s = sample(&StaticSource::new());
        // 29.92 inHg * 16 + 0.5
        assert_eq!(field("altimeter_inhg").encode(&s), Value::Int(479));
        // 1013.2 hPa * 16 + 0.5
        assert_eq!(field("altimeter_hpa").encode(&s), Value::Int(16211));
    }

    #[test]
    fn gear_all_down_requires_every_leg() {
        let mut src = StaticSource::new();
        src.set_array("sim/flightmodel/parts/gear_deploy", vec![1.0, 1.0, 0.5]);
        assert_eq!(field("gear_all_down").encode(&sample(&src)), Value::Int(0));
        src.set_array("sim/flightmodel/parts/gear_deploy", vec![1.0, 0.995, 1.0]);
        assert_eq!(field("gear_all_down").encode(&sample(&src)), Value::Int(16383));
    }
}
