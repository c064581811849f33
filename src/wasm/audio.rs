use std::cell::RefCell;

use web_sys::{AudioContext, BiquadFilterType, OscillatorType};

use crate::error::Result;
use crate::xylophone::NOTE_SECONDS;

/// Wooden-sounding hover note. The audio context is created on first use,
/// which browsers only allow after a user gesture.
#[derive(Default)]
pub struct Chime {
    context: RefCell<Option<AudioContext>>,
}

impl Chime {
    pub fn new() -> Self {
        Self::default()
    }

    fn context(&self) -> Result<AudioContext> {
        if let Some(ctx) = self.context.borrow().as_ref() {
            return Ok(ctx.clone());
        }
        let ctx = AudioContext::new()?;
        *self.context.borrow_mut() = Some(ctx.clone());
        Ok(ctx)
    }

    pub fn play(&self, frequency: f64) -> Result<()> {
        let ctx = self.context()?;
        let now = ctx.current_time();
        let end = now + NOTE_SECONDS;

        let body = ctx.create_oscillator()?;
        body.set_type(OscillatorType::Triangle);
        body.frequency().set_value_at_time(frequency as f32, now)?;

        // Slight detune thickens the tone.
        let shimmer = ctx.create_oscillator()?;
        shimmer.set_type(OscillatorType::Triangle);
        shimmer.frequency().set_value_at_time((frequency * 1.01) as f32, now)?;

        let gain = ctx.create_gain()?;
        gain.gain().set_value_at_time(0.0, now)?;
        gain.gain().linear_ramp_to_value_at_time(0.15, now + 0.02)?;
        gain.gain().exponential_ramp_to_value_at_time(0.001, end)?;

        let filter = ctx.create_biquad_filter()?;
        filter.set_type(BiquadFilterType::Lowpass);
        filter.frequency().set_value_at_time(1200.0, now)?;
        filter.q().set_value_at_time(0.5, now)?;

        body.connect_with_audio_node(&filter)?;
        shimmer.connect_with_audio_node(&filter)?;
        filter.connect_with_audio_node(&gain)?;
        gain.connect_with_audio_node(&ctx.destination())?;

        for osc in [&body, &shimmer] {
            osc.start_with_when(now)?;
            osc.stop_with_when(end)?;
        }
        Ok(())
    }
}
