//! One consistent read of simulator state per refresh.
//!
//! Everything the catalogue encodes is pulled here first, so that derived
//! values (flags, weights, fallbacks) are computed exactly once and in a fixed
//! order. The only state carried across refreshes is the [`LandingRateLatch`].

use tracing::{debug, trace};

use crate::encoding::trunc;
use crate::identity::HandshakeIdentity;
use crate::source::{ScalarKind, SimDataSource};

pub const MPS_TO_KNOTS: f64 = 1.943844;
pub const FPM_TO_MPS: f64 = 0.00508;
pub const KG_TO_LBS: f64 = 2.20462262185;
pub const FUEL_LBS_PER_GAL: f64 = 6.7;
pub const LBS_PER_SLUG: f64 = 32.174049;
pub const HPA_PER_INHG: f64 = 33.8638866667;
pub const MAX_SPOILER_DEFLECTION_DEG: f64 = 60.0;

/// Height above ground under which a landing-rate sample is captured.
pub const LANDING_CAPTURE_AGL_M: f64 = 2.0;
/// Captured landing rate at or below this counts as a crash.
pub const HARD_LANDING_FPM: f64 = -2500.0;
/// Fuel capacities below this are treated as unreported.
pub const MIN_FUEL_CAPACITY_KG: f64 = 1.0;
/// Capacity substituted when the reported one is unusable.
pub const FALLBACK_FUEL_CAPACITY_KG: f64 = 3000.0;

/// Number of engine slots in the legacy layout.
pub const ENGINE_SLOTS: usize = 4;

enum SignSource {
    /// Boolean switch; on maps to mode 2.
    Switch(&'static str),
    /// Three-position mode, clamped to 0..=2.
    Mode(&'static str),
}

const SEATBELT_SOURCES: &[SignSource] = &[
    SignSource::Switch("laminar/B738/toggle_seatbelt_sign"),
    SignSource::Switch("AirbusFBW/SeatBeltSignsOn"),
    SignSource::Mode("XCrafts/ERJ/overhead/seat_belts"),
    SignSource::Switch("ff/seatsigns_on"),
    SignSource::Switch("sim/cockpit2/annunciators/seatbelt_on"),
    SignSource::Mode("sim/cockpit2/switches/fasten_seat_belts"),
];

const NO_SMOKING_SOURCES: &[SignSource] = &[
    SignSource::Switch("laminar/B738/toggle_smoking_sign"),
    SignSource::Switch("AirbusFBW/NoSmokingSignsOn"),
    SignSource::Mode("XCrafts/ERJ/overhead/no_smoking"),
    SignSource::Switch("sim/cockpit2/annunciators/smoking_on"),
    SignSource::Mode("sim/cockpit2/switches/no_smoking"),
];

/// Radio sources as `(name, scale to MHz)`, first positive value wins.
const COM1_ACTIVE: &[(&str, f64)] = &[("sim/cockpit2/radios/actuators/com1_frequency_hz_833", 0.001)];
const COM1_STANDBY: &[(&str, f64)] =
    &[("sim/cockpit2/radios/actuators/com1_standby_frequency_hz_833", 0.001)];
const COM2_ACTIVE: &[(&str, f64)] = &[("sim/cockpit2/radios/actuators/com2_frequency_hz_833", 0.001)];
const COM2_STANDBY: &[(&str, f64)] =
    &[("sim/cockpit2/radios/actuators/com2_standby_frequency_hz_833", 0.001)];

/// Landing-rate hysteresis.
///
/// While airborne the latch follows live vertical speed. On the first refresh
/// that is on the ground below [`LANDING_CAPTURE_AGL_M`] it captures that
/// sample and freezes; it only re-arms after the aircraft is airborne again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LandingRateLatch {
    raw: i64,
    frozen: bool,
}

impl LandingRateLatch {
    /// Feed one refresh worth of state. Returns true when a landing was captured.
    pub fn update(&mut self, on_ground: bool, height_agl_m: f64, vertical_speed_mps: f64) -> bool {
        if !on_ground {
            self.frozen = false;
            self.raw = trunc(vertical_speed_mps * 256.0);
            return false;
        }
        if !self.frozen && height_agl_m < LANDING_CAPTURE_AGL_M {
            self.raw = trunc(vertical_speed_mps * 256.0);
            self.frozen = true;
            return true;
        }
        false
    }

    /// Vertical speed in m/s * 256.
    pub fn raw(&self) -> i64 {
        self.raw
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Rate in feet per minute.
    pub fn feet_per_minute(&self) -> f64 {
        (self.raw as f64 / 256.0) * 60.0 * 3.28084
    }
}

/// Per-engine readings.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EngineSample {
    pub running: bool,
    pub n1_pct: f64,
    pub n2_pct: f64,
    pub fuel_flow_gph: f64,
    pub oil_temp_c: f64,
    pub oil_pressure_psi: f64,
}

/// Exterior light switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lights {
    pub nav: bool,
    pub beacon: bool,
    pub strobe: bool,
    pub landing: bool,
    pub taxi: bool,
    pub panel: bool,
}

impl Lights {
    /// Legacy `0x0D0C` bitfield. Recognition, wing, logo and cabin mirror nav.
    pub fn bits(&self) -> u16 {
        let nav = u16::from(self.nav);
        nav | u16::from(self.beacon) << 1
            | u16::from(self.landing) << 2
            | u16::from(self.taxi) << 3
            | u16::from(self.strobe) << 4
            | u16::from(self.panel) << 5
            | nav << 6
            | nav << 7
            | nav << 8
            | nav << 9
    }
}

/// Everything the catalogue needs from one refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightSample {
    pub identity: HandshakeIdentity,

    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub elevation_m: f64,
    pub indicated_altitude_ft: f64,
    pub pitch_deg: f64,
    pub roll_deg: f64,
    pub heading_mag_deg: f64,
    pub magnetic_variation_deg: f64,

    pub ground_speed_mps: f64,
    pub true_airspeed_kts: f64,
    pub indicated_airspeed_kts: f64,
    pub vertical_speed_mps: f64,

    pub on_ground: bool,
    pub height_agl_m: f64,
    pub ground_elevation_m: f64,
    pub landing_rate: LandingRateLatch,
    pub over_g: bool,
    pub on_ground_failure: bool,
    pub crashed: bool,
    pub stall_warning: bool,
    pub overspeed_warning: bool,
    pub paused: bool,
    pub sim_rate: f64,

    pub lights: Lights,
    pub parking_brake_ratio: f64,
    pub flap_ratio: f64,
    pub spoiler_ratio: f64,
    pub spoiler_left_deg: f64,
    pub spoiler_right_deg: f64,
    pub spoiler_armed: bool,

    pub gear_handle_down: bool,
    pub gear_retractable: bool,
    /// Deploy ratios in source order: left main, right main, nose.
    pub gear_deploy: [f64; 3],

    pub engines: [EngineSample; ENGINE_SLOTS],
    pub engine_count: i64,

    pub fuel_total_kg: f64,
    pub fuel_capacity_kg: f64,
    pub zero_fuel_weight_kg: f64,
    pub max_gross_kg: f64,

    pub seatbelt_sign: u8,
    pub no_smoking_sign: u8,
    pub transponder_code: i64,
    pub transponder_mode: u8,
    pub com1_active_mhz: f64,
    pub com1_standby_mhz: f64,
    pub com2_active_mhz: f64,
    pub com2_standby_mhz: f64,
    pub avionics_on: bool,
    pub battery_on: bool,

    pub baro_hpa: f64,
    pub baro_inhg: f64,
    pub standby_baro_hpa: f64,
    pub standby_altitude_ft: f64,
    pub g_force: f64,

    pub wind_speed_kts: f64,
    pub wind_direction_true: f64,
    pub surface_wind_speed_kts: f64,
    pub surface_wind_direction_mag: f64,
    pub surface_layer_ceiling_m: f64,
}

impl FlightSample {
    /// Pull one sample from `src`, advancing the landing-rate latch.
    pub fn collect<S: SimDataSource + ?Sized>(
        src: &S,
        identity: HandshakeIdentity,
        latch: &mut LandingRateLatch,
    ) -> Self {
        let latitude_deg = src.read_scalar("sim/flightmodel/position/latitude", ScalarKind::Double, 0.0);
        let longitude_deg = src.read_scalar("sim/flightmodel/position/longitude", ScalarKind::Double, 0.0);
        let elevation_m = src.read_scalar("sim/flightmodel/position/elevation", ScalarKind::Double, 0.0);
        let indicated_altitude_ft = src.read_first(
            &[
                "sim/cockpit2/gauges/indicators/altitude_ft_pilot",
                "sim/cockpit/altimeter/indicated-altitude",
            ],
            ScalarKind::Float,
            0.0,
        );
        let pitch_deg = float(src, "sim/flightmodel/position/theta");
        let roll_deg = float(src, "sim/flightmodel/position/phi");
        let mut heading_mag_deg = float(src, "sim/cockpit/autopilot/heading_mag");
        if heading_mag_deg == 0.0 {
            heading_mag_deg = float(src, "sim/flightmodel/position/psi");
        }

        let ground_speed_mps = float(src, "sim/flightmodel/position/groundspeed");
        let true_airspeed_kts = float(src, "sim/flightmodel/position/true_airspeed") * MPS_TO_KNOTS;
        let mut indicated_airspeed_kts = float(src, "sim/cockpit2/gauges/indicators/airspeed_kts_pilot");
        if indicated_airspeed_kts <= 0.0 {
            let ias_mps = float(src, "sim/flightmodel/position/indicated_airspeed");
            indicated_airspeed_kts = (ias_mps * MPS_TO_KNOTS).max(0.0);
        }
        let vertical_speed_mps = float(src, "sim/flightmodel/position/vh_ind_fpm") * FPM_TO_MPS;

        let gear_contact = ints(src, "sim/flightmodel2/gear/on_ground", 3);
        let main_contact = int(src, "sim/flightmodel/parts/on_ground_main");
        let on_ground = gear_contact.iter().any(|v| *v != 0) || main_contact != 0;
        let on_ground_failure = int(src, "sim/flightmodel/failures/onground_any") != 0;
        trace!(gear = ?gear_contact, main = main_contact, on_ground, "ground contact");
        let height_agl_m = float(src, "sim/flightmodel/position/y_agl");

        if latch.update(on_ground, height_agl_m, vertical_speed_mps) {
            debug!(fpm = latch.feet_per_minute(), "landing rate captured");
        }

        // Flag order is fixed: crash, stall, overspeed.
        let over_g = int(src, "sim/flightmodel/failures/over_g") != 0;
        let hard_landing = latch.is_frozen() && latch.feet_per_minute() <= HARD_LANDING_FPM;
        let crashed = (over_g && on_ground_failure) || hard_landing;

        let stall_ratio = float(src, "sim/flightmodel2/misc/stall_warning_ratio").clamp(0.0, 1.0);
        let stall_annunciator = opt_int(src, "sim/cockpit2/annunciators/stall_warning");
        let mut stall_warning = stall_ratio > 0.05;
        if matches!(stall_annunciator, Some(v) if v > 0) {
            stall_warning = true;
        }
        let overspeed_ratio = float(src, "sim/flightmodel2/misc/overspeed_warning_ratio").clamp(0.0, 1.0);
        let overspeed_pref = opt_int(src, "sim/operation/prefs/warn_overspeed");
        let mut overspeed_warning = overspeed_ratio > 0.05;
        if matches!(overspeed_pref, Some(v) if v > 0) {
            overspeed_warning = true;
        }

        let paused = int(src, "sim/time/paused") != 0;
        let ground_elevation_m = elevation_m - height_agl_m;

        let sim_rate = match opt_float(src, "sim/time/sim_speed_actual") {
            Some(rate) if rate > 0.0 => rate,
            _ => src.read_first(&["sim/time/sim_speed", "sim/time/sim_rate"], ScalarKind::Float, 1.0),
        }
        .clamp(0.1, 64.0);

        let beacon = int(src, "sim/cockpit2/switches/beacon_on") != 0;
        let lights = Lights {
            nav: int(src, "sim/cockpit2/switches/navigation_lights_on") != 0,
            beacon,
            strobe: int(src, "sim/cockpit2/switches/strobe_lights_on") != 0,
            landing: int(src, "sim/cockpit2/switches/landing_lights_on") != 0,
            taxi: int(src, "sim/cockpit2/switches/taxi_light_on") != 0,
            panel: float(src, "sim/cockpit2/switches/panel_brightness_ratio_all") > 0.1,
        };
        trace!(?lights, "lights");

        let parking_brake_ratio = float(src, "sim/flightmodel/controls/parkbrake").clamp(0.0, 1.0);
        let flap_ratio = float(src, "sim/flightmodel/controls/flaprat").clamp(0.0, 1.0);
        let spoiler_ratio = float(src, "sim/flightmodel/controls/sbrkrat").clamp(0.0, 1.0);
        let deflections = src.read_array("sim/flightmodel2/controls/spoiler_deflection_deg", 20);
        let spoiler_left_deg = average_deflection(&deflections, 0, 10);
        let spoiler_right_deg = average_deflection(&deflections, 10, 10);
        let spoiler_armed = int(src, "sim/cockpit2/switches/speedbrake_arm") != 0;

        let gear_handle_down = int(src, "sim/cockpit2/controls/gear_handle_down") != 0;
        let gear_retractable = float(src, "sim/aircraft/gear/acf_gear_retract") >= 1.0;
        let deploy = src.read_array("sim/flightmodel/parts/gear_deploy", 3);
        let gear_deploy = [deploy[0], deploy[1], deploy[2]];

        let engines = collect_engines(src);
        let mut engine_count = int(src, "sim/aircraft/prop/acf_num_engines");
        if engine_count <= 0 {
            engine_count = ENGINE_SLOTS as i64;
        }
        let engine_count = engine_count.clamp(1, ENGINE_SLOTS as i64);

        let fuel_total_kg = float(src, "sim/flightmodel/weight/m_fuel_total").max(0.0);
        let mut fuel_capacity_kg = src.read_first(&["sim/aircraft/weight/acf_m_fuel_tot"], ScalarKind::Float, 0.0);
        if fuel_capacity_kg <= MIN_FUEL_CAPACITY_KG {
            fuel_capacity_kg = FALLBACK_FUEL_CAPACITY_KG;
        }
        let empty_kg = src
            .read_first(
                &["sim/flightmodel/weight/m_fixed", "sim/aircraft/weight/acf_m_empty"],
                ScalarKind::Float,
                0.0,
            )
            .max(0.0);
        let total_kg = opt_float(src, "sim/flightmodel/weight/m_total").unwrap_or(0.0).max(0.0);
        let payload_kg = (total_kg - fuel_total_kg - empty_kg).max(0.0);
        let max_gross_kg = src.read_first(
            &["sim/flightmodel/weight/m_max", "sim/aircraft/weight/acf_m_max"],
            ScalarKind::Float,
            0.0,
        );

        let seatbelt_sign = cabin_sign(src, SEATBELT_SOURCES);
        let no_smoking_sign = cabin_sign(src, NO_SMOKING_SOURCES);

        let transponder_code = src.read_first(
            &[
                "sim/cockpit2/radios/actuators/transponder_code",
                "sim/cockpit/radios/transponder_code",
            ],
            ScalarKind::Int,
            0.0,
        ) as i64;
        let raw_mode = src.read_first(
            &[
                "sim/cockpit/radios/transponder_mode",
                "sim/cockpit2/radios/actuators/transponder_mode",
            ],
            ScalarKind::Int,
            0.0,
        ) as i64;
        let transponder_mode = match raw_mode.clamp(0, 4) {
            0 => 0, // off
            1 => 1, // standby
            2 => 3, // on
            _ => 4, // altitude reporting
        };

        let avionics_on = ints(src, "sim/cockpit2/switches/avionics_power_on", 2)
            .iter()
            .any(|v| *v != 0)
            || int(src, "sim/cockpit/electrical/avionics_on") != 0;
        let battery_on = ints(src, "sim/cockpit2/electrical/battery_on", 4)
            .iter()
            .any(|v| *v != 0)
            || int(src, "sim/cockpit/electrical/battery_on") != 0;

        let baro_inhg = src.read_first(
            &[
                "sim/cockpit2/gauges/actuators/barometer_setting_in_hg_pilot",
                "sim/cockpit/misc/barometer_setting",
            ],
            ScalarKind::Float,
            29.92,
        );
        let baro_hpa = src.read_first(
            &["sim/cockpit2/gauges/actuators/barometer_setting_hpa_pilot"],
            ScalarKind::Float,
            baro_inhg * HPA_PER_INHG,
        );
        let standby_baro_hpa =
            opt_float(src, "sim/cockpit2/gauges/actuators/barometer_setting_hpa_copilot").unwrap_or(baro_hpa);
        let standby_altitude_ft =
            opt_float(src, "sim/cockpit2/gauges/indicators/altitude_ft_copilot").unwrap_or(indicated_altitude_ft);

        let g_force = float(src, "sim/flightmodel2/misc/gforce_normal").clamp(-8.0, 8.0);

        let magnetic_variation_deg = float(src, "sim/flightmodel/position/magnetic_variation");
        let wind_speed_kts = (float(src, "sim/weather/aircraft/wind_now_speed_msc") * MPS_TO_KNOTS).clamp(0.0, 65535.0);
        let wind_direction_true = float(src, "sim/weather/aircraft/wind_now_direction_degt");
        let region_speed = first(&src.read_array("sim/weather/region/wind_speed_kt", 1));
        let region_direction = first(&src.read_array("sim/weather/region/wind_direction_degt", 1));
        let region_top_msl = first(&src.read_array("sim/weather/region/wind_altitude_msl_m", 1));
        let surface_wind_speed_kts = if region_speed > 0.0 { region_speed } else { wind_speed_kts }.clamp(0.0, 65535.0);
        let surface_direction_true = if region_direction != 0.0 {
            region_direction
        } else {
            wind_direction_true
        };
        // Positive variation is east.
        let surface_wind_direction_mag = surface_direction_true - magnetic_variation_deg;
        let surface_layer_ceiling_m = (region_top_msl - ground_elevation_m).max(0.0);

        Self {
            identity,
            latitude_deg,
            longitude_deg,
            elevation_m,
            indicated_altitude_ft,
            pitch_deg,
            roll_deg,
            heading_mag_deg,
            magnetic_variation_deg,
            ground_speed_mps,
            true_airspeed_kts,
            indicated_airspeed_kts,
            vertical_speed_mps,
            on_ground,
            height_agl_m,
            ground_elevation_m,
            landing_rate: *latch,
            over_g,
            on_ground_failure,
            crashed,
            stall_warning,
            overspeed_warning,
            paused,
            sim_rate,
            lights,
            parking_brake_ratio,
            flap_ratio,
            spoiler_ratio,
            spoiler_left_deg,
            spoiler_right_deg,
            spoiler_armed,
            gear_handle_down,
            gear_retractable,
            gear_deploy,
            engines,
            engine_count,
            fuel_total_kg,
            fuel_capacity_kg,
            zero_fuel_weight_kg: empty_kg + payload_kg,
            max_gross_kg,
            seatbelt_sign,
            no_smoking_sign,
            transponder_code: transponder_code.clamp(0, 7777),
            transponder_mode,
            com1_active_mhz: radio_frequency(src, COM1_ACTIVE),
            com1_standby_mhz: radio_frequency(src, COM1_STANDBY),
            com2_active_mhz: radio_frequency(src, COM2_ACTIVE),
            com2_standby_mhz: radio_frequency(src, COM2_STANDBY),
            avionics_on,
            battery_on,
            baro_hpa,
            baro_inhg,
            standby_baro_hpa,
            standby_altitude_ft,
            g_force,
            wind_speed_kts,
            wind_direction_true,
            surface_wind_speed_kts,
            surface_wind_direction_mag,
            surface_layer_ceiling_m,
        }
    }

    /// Fuel on board as a fraction of capacity.
    pub fn fuel_fraction(&self) -> f64 {
        (self.fuel_total_kg / self.fuel_capacity_kg).clamp(0.0, 1.0)
    }

    /// Capacity of each main tank in US gallons (capacity split evenly L/R).
    pub fn tank_capacity_gal(&self) -> f64 {
        self.fuel_capacity_kg * KG_TO_LBS / FUEL_LBS_PER_GAL / 2.0
    }

    pub fn zero_fuel_weight_lbs(&self) -> f64 {
        self.zero_fuel_weight_kg * KG_TO_LBS
    }

    pub fn total_weight_lbs(&self) -> f64 {
        self.zero_fuel_weight_lbs() + self.fuel_total_kg * KG_TO_LBS
    }

    /// Maximum gross weight, `None` when the aircraft does not report one.
    pub fn max_gross_lbs(&self) -> Option<f64> {
        (self.max_gross_kg > 0.0).then(|| self.max_gross_kg * KG_TO_LBS)
    }
}

fn float<S: SimDataSource + ?Sized>(src: &S, name: &str) -> f64 {
    src.read_scalar(name, ScalarKind::Float, 0.0)
}

fn int<S: SimDataSource + ?Sized>(src: &S, name: &str) -> i64 {
    src.read_scalar(name, ScalarKind::Int, 0.0) as i64
}

fn opt_int<S: SimDataSource + ?Sized>(src: &S, name: &str) -> Option<i64> {
    src.scalar(name, ScalarKind::Int).map(|v| v as i64)
}

fn opt_float<S: SimDataSource + ?Sized>(src: &S, name: &str) -> Option<f64> {
    src.scalar(name, ScalarKind::Float)
}

fn ints<S: SimDataSource + ?Sized>(src: &S, name: &str, count: usize) -> Vec<i64> {
    src.read_array(name, count).into_iter().map(|v| v as i64).collect()
}

fn first(values: &[f64]) -> f64 {
    values.first().copied().unwrap_or(0.0)
}

fn average_deflection(values: &[f64], start: usize, count: usize) -> f64 {
    let end = (start + count).min(values.len());
    if start >= end {
        return 0.0;
    }
    let window = &values[start..end];
    window.iter().map(|v| v.max(0.0)).sum::<f64>() / window.len() as f64
}

fn collect_engines<S: SimDataSource + ?Sized>(src: &S) -> [EngineSample; ENGINE_SLOTS] {
    let n1 = src.read_array("sim/flightmodel/engine/ENGN_N1_", ENGINE_SLOTS);
    let n2 = src.read_array("sim/flightmodel/engine/ENGN_N2_", ENGINE_SLOTS);
    let running = ints(src, "sim/flightmodel/engine/ENGN_running", ENGINE_SLOTS);
    let fuel_flow = src.read_array("sim/flightmodel/misc/fuel_flow_gph", ENGINE_SLOTS);
    let oil_temp = src.read_array("sim/flightmodel/engine/ENGN_oilt", ENGINE_SLOTS);
    let oil_pressure = src.read_array("sim/flightmodel/engine/oil_pressure_psi", ENGINE_SLOTS);

    std::array::from_fn(|idx| EngineSample {
        running: running[idx] != 0,
        n1_pct: n1[idx],
        n2_pct: n2[idx],
        fuel_flow_gph: fuel_flow[idx],
        oil_temp_c: oil_temp[idx],
        oil_pressure_psi: oil_pressure[idx],
    })
}

fn cabin_sign<S: SimDataSource + ?Sized>(src: &S, sources: &[SignSource]) -> u8 {
    for source in sources {
        match source {
            SignSource::Switch(name) => {
                let state = opt_int(src, name)
                    .or_else(|| opt_float(src, name).map(|v| i64::from(v >= 0.5)));
                if let Some(state) = state {
                    return if state != 0 { 2 } else { 0 };
                }
            }
            SignSource::Mode(name) => {
                if let Some(mode) = opt_int(src, name) {
                    return mode.clamp(0, 2) as u8;
                }
            }
        }
    }
    0
}

fn radio_frequency<S: SimDataSource + ?Sized>(src: &S, sources: &[(&str, f64)]) -> f64 {
    for (name, scale) in sources {
        let value = opt_int(src, name)
            .map(|v| v as f64)
            .or_else(|| opt_float(src, name));
        if let Some(value) = value {
            let mhz = value * scale;
            if mhz > 0.0 {
                return mhz;
            }
        }
    }
    0.0
}
