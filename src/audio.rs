//! Placeholder tone generator using Web Audio API
//!
//! Short sine blips; no samples, no mixing.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

/// Length of a single tone in seconds
pub const TONE_DURATION: f64 = 0.3;
/// Peak gain of a tone
const TONE_VOLUME: f32 = 0.5;

pub struct ToneGenerator {
    ctx: Option<AudioContext>,
}

impl Default for ToneGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ToneGenerator {
    pub fn new() -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self { ctx }
    }

    /// Play a sine tone at `freq` Hz
    pub fn play(&self, freq: f32) {
        let Some(ctx) = &self.ctx else { return };

        // Browsers keep the context suspended until a user gesture
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        let Some((osc, gain)) = Self::create_osc(ctx, freq) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(TONE_VOLUME, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + TONE_DURATION)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + TONE_DURATION).ok();
    }

    /// Sine oscillator routed through a gain node to the speakers
    fn create_osc(ctx: &AudioContext, freq: f32) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(OscillatorType::Sine);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }
}
