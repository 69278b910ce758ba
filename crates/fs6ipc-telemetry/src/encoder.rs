use fs6ipc_memory::AddressSpace;
use tracing::{debug, info, trace};

use crate::catalogue::{default_catalogue, Field, Value};
use crate::error::{Result, TelemetryError};
use crate::identity::HandshakeIdentity;
use crate::sample::{FlightSample, LandingRateLatch};
use crate::source::SimDataSource;

/// Writes simulator telemetry into an [`AddressSpace`].
///
/// Owned by the executor and refreshed once per served request, on the same
/// thread that then scans the request block, so a client never observes a
/// half-updated catalogue.
pub struct TelemetryEncoder<S> {
    source: S,
    identity: HandshakeIdentity,
    catalogue: Vec<Field>,
    latch: LandingRateLatch,
    last_transponder: Option<(Value, Value)>,
    handshake_logged: bool,
}

impl<S: SimDataSource> TelemetryEncoder<S> {
    pub fn new(source: S, identity: HandshakeIdentity) -> Self {
        Self {
            source,
            identity,
            catalogue: default_catalogue(),
            latch: LandingRateLatch::default(),
            last_transponder: None,
            handshake_logged: false,
        }
    }

    /// Sample the source once and write every catalogue field.
    ///
    /// Stops at the first field that does not fit `memory`; fields written
    /// before it keep their new values.
    pub fn refresh(&mut self, memory: &mut AddressSpace) -> Result<()> {
        let sample = FlightSample::collect(&self.source, self.identity, &mut self.latch);

        for field in &self.catalogue {
            field
                .store(&sample, memory)
                .map_err(|source| TelemetryError::Field {
                    field: field.name,
                    offset: field.offset,
                    source,
                })?;
        }

        if !self.handshake_logged {
            info!(
                version = %self.identity.version_label(),
                build = self.identity.build_letter,
                fs_version = self.identity.fs_version,
                raw = format_args!("0x{:08X}", self.identity.version_word()),
                "FSUIPC handshake"
            );
            self.handshake_logged = true;
        }

        self.log_transitions(&sample);
        trace!(
            lat = sample.latitude_deg,
            lon = sample.longitude_deg,
            on_ground = sample.on_ground,
            "telemetry refreshed"
        );
        Ok(())
    }

    fn log_transitions(&mut self, sample: &FlightSample) {
        let transponder = (
            self.encode_named("transponder_code", sample),
            self.encode_named("transponder_mode", sample),
        );
        if self.last_transponder != Some(transponder) {
            debug!(
                code = sample.transponder_code,
                mode = sample.transponder_mode,
                "transponder changed"
            );
            self.last_transponder = Some(transponder);
        }

        if sample.crashed {
            debug!(
                over_g = sample.over_g,
                on_ground_failure = sample.on_ground_failure,
                landing_rate_fpm = sample.landing_rate.feet_per_minute(),
                "crash detected"
            );
        }
    }

    fn encode_named(&self, name: &str, sample: &FlightSample) -> Value {
        self.catalogue
            .iter()
            .find(|f| f.name == name)
            .map_or(Value::Skip, |f| f.encode(sample))
    }

    pub fn identity(&self) -> HandshakeIdentity {
        self.identity
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access to the source, e.g. to feed a [`StaticSource`] new values.
    ///
    /// [`StaticSource`]: crate::StaticSource
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn catalogue(&self) -> &[Field] {
        &self.catalogue
    }

    /// Current landing-rate latch state.
    pub fn landing_rate(&self) -> LandingRateLatch {
        self.latch
    }
}

impl<S> std::fmt::Debug for TelemetryEncoder<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryEncoder")
            .field("identity", &self.identity)
            .field("fields", &self.catalogue.len())
            .field("latch", &self.latch)
            .finish_non_exhaustive()
    }
}
