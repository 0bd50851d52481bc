//! PID controller
//!
//! Discrete-time PID producing a corrected setpoint from room temperature
//! feedback. The integral accumulator is clamped to the output bounds
//! (anti-windup) and the derivative acts on the measurement, so a target
//! change never causes a derivative kick.

use core::fmt::Write;

use heapless::String;

use super::math::{clamp, round_up_to_decimals};

/// Decimal places kept when converting the sample time to seconds
const SAMPLE_TIME_DECIMALS: u32 = 6;

/// Capacity of the diagnostic dump
pub const DUMP_CAPACITY: usize = 256;

/// PID controller with clamped output and integral
#[derive(Debug, Clone)]
pub struct PidController {
    /// Raw gains in user units
    p: f32,
    i: f32,
    d: f32,
    /// Gains scaled by the sample time
    kp: f32,
    ki: f32,
    kd: f32,
    sample_time_ms: u32,
    target: f32,
    output_min: f32,
    output_max: f32,
    output: f32,
    output_sum: f32,
    last_input: Option<f32>,
}

impl PidController {
    /// Create a controller
    ///
    /// `sample_time_ms` is the interval between [`update`] calls. Bounds with
    /// `output_min > output_max` are ignored, leaving the output unbounded.
    ///
    /// [`update`]: PidController::update
    pub fn new(
        p: f32,
        i: f32,
        d: f32,
        sample_time_ms: u32,
        target: f32,
        output_min: f32,
        output_max: f32,
    ) -> Self {
        let mut pid = Self {
            p,
            i,
            d,
            kp: 0.0,
            ki: 0.0,
            kd: 0.0,
            sample_time_ms,
            target,
            output_min: f32::NEG_INFINITY,
            output_max: f32::INFINITY,
            output: 0.0,
            output_sum: 0.0,
            last_input: None,
        };
        pid.set_tunings();
        pid.set_output_limits(output_min, output_max);
        pid.set_target(target);
        pid
    }

    /// Derive the scaled gains from the raw gains and sample time
    fn set_tunings(&mut self) {
        let sample_time_s = self.sample_time_ms as f32 / 1000.0;
        let sample_time_s = round_up_to_decimals(sample_time_s, SAMPLE_TIME_DECIMALS);
        self.kp = self.p;
        self.ki = self.i * sample_time_s;
        // Zero sample time leaves the derivative disabled rather than infinite
        self.kd = if sample_time_s > 0.0 {
            self.d / sample_time_s
        } else {
            0.0
        };
    }

    /// Change the sample time and re-derive the scaled gains
    ///
    /// Must follow any change of the polling interval, otherwise the
    /// effective integral and derivative gains drift.
    pub fn set_sample_time(&mut self, sample_time_ms: u32) {
        self.sample_time_ms = sample_time_ms;
        self.set_tunings();
    }

    fn apply_output_limits(&self, value: f32) -> f32 {
        clamp(value, self.output_min, self.output_max)
    }

    /// Compute the next output from a measurement
    pub fn update(&mut self, input: f32) -> f32 {
        let last_input = *self.last_input.get_or_insert(input);

        if self.output_sum.is_nan() {
            self.output_sum = 0.0;
        }

        let error = self.target - input;
        let input_delta = input - last_input;

        self.output_sum = self.apply_output_limits(self.output_sum + self.ki * error);

        let output = self.kp * error + self.output_sum - self.kd * input_delta;
        self.output = self.apply_output_limits(output);

        self.last_input = Some(input);
        self.output
    }

    /// Change the target, discarding integral and derivative history
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
        self.reset_state();
    }

    /// Clear the integral accumulator and last input
    pub fn reset_state(&mut self) {
        self.output_sum = self.apply_output_limits(0.0);
        self.last_input = None;
    }

    /// Change the output bounds
    ///
    /// Ignored if `min > max`. The current output and integral are
    /// re-clamped to the new bounds.
    pub fn set_output_limits(&mut self, min: f32, max: f32) {
        if min > max {
            warn!("PID output limits rejected: min {} > max {}", min, max);
            return;
        }
        self.output_min = min;
        self.output_max = max;
        self.output = self.apply_output_limits(self.output);
        self.output_sum = self.apply_output_limits(self.output_sum);
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn output_min(&self) -> f32 {
        self.output_min
    }

    pub fn output_max(&self) -> f32 {
        self.output_max
    }

    /// Last computed output
    pub fn output(&self) -> f32 {
        self.output
    }

    /// Accumulated integral term
    pub fn output_sum(&self) -> f32 {
        self.output_sum
    }

    pub fn last_input(&self) -> Option<f32> {
        self.last_input
    }

    pub fn sample_time_ms(&self) -> u32 {
        self.sample_time_ms
    }

    /// Scaled gains `(kp, ki, kd)`
    pub fn gains(&self) -> (f32, f32, f32) {
        (self.kp, self.ki, self.kd)
    }

    /// Diagnostic text for operators
    ///
    /// Truncated if it does not fit [`DUMP_CAPACITY`].
    pub fn dump_config(&self) -> String<DUMP_CAPACITY> {
        let mut out = String::new();
        let _ = write!(
            out,
            "PID: p={} i={} d={} target={} sample_time={}ms \
             output_min={} output_max={} output_sum={} last_input={}",
            self.p,
            self.i,
            self.d,
            self.target,
            self.sample_time_ms,
            self.output_min,
            self.output_max,
            self.output_sum,
            self.last_input.unwrap_or(-1.0),
        );
        out
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn output_and_integral_stay_clamped(
            p in -10.0f32..10.0,
            i in -10.0f32..10.0,
            d in -10.0f32..10.0,
            target in 10.0f32..35.0,
            inputs in proptest::collection::vec(-20.0f32..60.0, 1..50),
        ) {
            let mut pid = PidController::new(p, i, d, 500, target, 16.0, 31.0);
            for input in inputs {
                let output = pid.update(input);
                prop_assert!((16.0..=31.0).contains(&output));
                prop_assert!((16.0..=31.0).contains(&pid.output_sum()));
            }
        }

        #[test]
        fn new_limits_reclamp_state(
            target in 0.0f32..50.0,
            input in 0.0f32..50.0,
            lo in -20.0f32..20.0,
            span in 0.0f32..20.0,
        ) {
            let mut pid = PidController::new(2.0, 0.5, 0.1, 1000, target, -100.0, 100.0);
            pid.update(input);
            pid.set_output_limits(lo, lo + span);
            prop_assert!(pid.output() >= lo && pid.output() <= lo + span);
            prop_assert!(pid.output_sum() >= lo && pid.output_sum() <= lo + span);
        }
    }
}
