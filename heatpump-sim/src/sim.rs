//! Simulation run loop
//!
//! Drives a controller against the simulated unit on a virtual clock, one
//! polling interval per step.

use heatpump_core::climate::ClimateCall;
use heatpump_core::traits::SetpointStorage;
use heatpump_core::{HeatPumpController, TickOutcome};
use log::{info, warn};

use crate::config::SimConfig;
use crate::room::SimulatedHeatPump;

const MS_PER_MINUTE: u64 = 60_000;

/// Counters collected over a run
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    pub ticks: u32,
    pub power_on_actuations: u32,
    pub power_off_actuations: u32,
    pub throttled_ticks: u32,
    pub failed_actuations: u32,
    pub min_room_c: f32,
    pub max_room_c: f32,
    pub final_room_c: f32,
}

/// One simulated controller and room
pub struct Simulation<S> {
    controller: HeatPumpController<SimulatedHeatPump, S>,
    config: SimConfig,
    now_ms: u64,
    requested: bool,
}

impl<S: SetpointStorage> Simulation<S> {
    pub fn new(config: SimConfig, storage: S) -> anyhow::Result<Self> {
        let device = SimulatedHeatPump::new(config.room, config.unit);
        let controller = HeatPumpController::new(device, storage, &config.controller, 0)
            .map_err(|e| anyhow::anyhow!("controller rejected configuration: {}", e))?;
        Ok(Self {
            controller,
            config,
            now_ms: 0,
            requested: false,
        })
    }

    pub fn controller(&self) -> &HeatPumpController<SimulatedHeatPump, S> {
        &self.controller
    }

    /// Send the scenario request once the unit has reported
    fn request_scenario(&mut self) {
        if self.requested || !self.controller.engine().is_ready() {
            return;
        }
        let scenario = &self.config.scenario;
        let call = ClimateCall::new()
            .with_mode(scenario.mode)
            .with_target_temperature(scenario.target_c);
        match self.controller.control(&call, self.now_ms) {
            Ok(state) => {
                info!(
                    "Requested {:?} at {} C, action {:?}",
                    state.mode, scenario.target_c, state.action
                );
                self.requested = true;
            }
            // Retried next poll
            Err(e) => warn!("Scenario request failed: {}", e),
        }
    }

    /// Run for `minutes` of simulated time
    pub fn run(&mut self, minutes: u32) -> Summary {
        let interval_ms = u64::from(self.config.controller.poll_interval_ms);
        let end_ms = self.now_ms + u64::from(minutes) * MS_PER_MINUTE;
        let start_c = self.controller.device().room().temperature();
        let mut summary = Summary {
            min_room_c: start_c,
            max_room_c: start_c,
            final_room_c: start_c,
            ..Default::default()
        };

        while self.now_ms < end_ms {
            self.controller.device_mut().advance(interval_ms);
            self.now_ms += interval_ms;
            let room_c = self.controller.device().room().temperature();

            let minute_boundary = self.now_ms % MS_PER_MINUTE < interval_ms;
            if self.config.scenario.remote_sensor && minute_boundary {
                self.controller.ping(self.now_ms);
                if let Err(e) = self.controller.set_remote_temperature(room_c, self.now_ms) {
                    warn!("Remote temperature not sent: {}", e);
                }
            }

            let outcome = self.controller.poll(self.now_ms);
            self.request_scenario();

            summary.ticks += 1;
            match outcome {
                TickOutcome::Actuated { power_on: true, .. } => summary.power_on_actuations += 1,
                TickOutcome::Actuated { power_on: false, .. } => summary.power_off_actuations += 1,
                TickOutcome::Throttled { .. } => summary.throttled_ticks += 1,
                TickOutcome::ActuationFailed(_) => summary.failed_actuations += 1,
                _ => {}
            }
            summary.min_room_c = summary.min_room_c.min(room_c);
            summary.max_room_c = summary.max_room_c.max(room_c);
            summary.final_room_c = room_c;

            if minute_boundary {
                let state = self.controller.state();
                let unit = self.controller.device().applied();
                info!(
                    "t={}min room={:.2} target={:?} action={:?} unit power={} setpoint={} remote={:?} outcome={:?}",
                    self.now_ms / MS_PER_MINUTE,
                    room_c,
                    state.target_temperature,
                    state.action,
                    unit.power,
                    unit.temperature,
                    self.controller.device().remote_temperature(),
                    outcome
                );
            }
        }
        summary
    }
}
