//! Notification light.
//!
//! The device is an injected capability: whoever needs to drive it is handed
//! a `Box<dyn Light>`. [`LightController`] enforces the acquire/release
//! discipline: the effect of the phase being left is switched off before the
//! next phase's effect is started, so two effects are never active at once.

use std::fmt;
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};

use crate::error::LightError;
use crate::meeting::MeetingPhase;
use crate::timer::SessionPhase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Green,
    Amber,
    Blue,
}

impl Color {
    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Green => "green",
            Color::Amber => "amber",
            Color::Blue => "blue",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "mode", content = "color", rename_all = "lowercase")]
pub enum LightIntent {
    Solid(Color),
    Pulse(Color),
}

/// What the light should show for the two machines together. A running
/// meeting wins over the session.
pub fn effective_intent(session: SessionPhase, meeting: MeetingPhase) -> Option<LightIntent> {
    meeting.light_intent().or_else(|| session.light_intent())
}

/// A notification light device.
pub trait Light: Send {
    fn set_solid(&mut self, color: Color) -> Result<(), LightError>;

    fn set_pulsing(&mut self, color: Color, rate_ms: u64) -> Result<(), LightError>;

    fn off(&mut self) -> Result<(), LightError>;

    /// Check the device answers. Called once at startup.
    fn probe(&mut self) -> Result<(), LightError> {
        self.off()
    }
}

/// No device attached.
#[derive(Debug, Default)]
pub struct NullLight;

impl Light for NullLight {
    fn set_solid(&mut self, _color: Color) -> Result<(), LightError> {
        Ok(())
    }

    fn set_pulsing(&mut self, _color: Color, _rate_ms: u64) -> Result<(), LightError> {
        Ok(())
    }

    fn off(&mut self) -> Result<(), LightError> {
        Ok(())
    }
}

/// Emits each effect as a structured log event instead of driving hardware.
#[derive(Debug, Default)]
pub struct LogLight;

impl Light for LogLight {
    fn set_solid(&mut self, color: Color) -> Result<(), LightError> {
        tracing::info!(%color, "light solid");
        Ok(())
    }

    fn set_pulsing(&mut self, color: Color, rate_ms: u64) -> Result<(), LightError> {
        tracing::info!(%color, rate_ms, "light pulsing");
        Ok(())
    }

    fn off(&mut self) -> Result<(), LightError> {
        tracing::info!("light off");
        Ok(())
    }
}

/// Drives the light through an external program, invoked as
/// `<program> solid <color>`, `<program> pulse <color> <rate_ms>` or
/// `<program> off`. A spawn failure or non-zero exit counts as a
/// disconnected device.
#[derive(Debug, Clone)]
pub struct CommandLight {
    program: String,
}

impl CommandLight {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn invoke(&self, args: &[&str]) -> Result<(), LightError> {
        let status = Command::new(&self.program)
            .args(args)
            .stdout(Stdio::null())
            .status()
            .map_err(|e| LightError::DeviceDisconnected(format!("{}: {e}", self.program)))?;
        if status.success() {
            Ok(())
        } else {
            Err(LightError::DeviceDisconnected(format!(
                "{} {} exited with {status}",
                self.program,
                args.join(" ")
            )))
        }
    }
}

impl Light for CommandLight {
    fn set_solid(&mut self, color: Color) -> Result<(), LightError> {
        self.invoke(&["solid", color.as_str()])
    }

    fn set_pulsing(&mut self, color: Color, rate_ms: u64) -> Result<(), LightError> {
        let rate = rate_ms.to_string();
        self.invoke(&["pulse", color.as_str(), &rate])
    }

    fn off(&mut self) -> Result<(), LightError> {
        self.invoke(&["off"])
    }
}

/// Owns the device and the currently active effect.
pub struct LightController {
    light: Box<dyn Light>,
    pulse_rate_ms: u64,
    active: Option<LightIntent>,
    connected: bool,
}

impl LightController {
    /// Take the device, checking that it answers.
    pub fn acquire(mut light: Box<dyn Light>, pulse_rate_ms: u64) -> Result<Self, LightError> {
        light.probe()?;
        Ok(Self {
            light,
            pulse_rate_ms,
            active: None,
            connected: true,
        })
    }

    pub fn active(&self) -> Option<LightIntent> {
        self.active
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Release the current effect, then start `intent`.
    pub fn show(&mut self, intent: Option<LightIntent>) {
        self.release();
        let Some(intent) = intent else {
            return;
        };
        let result = match intent {
            LightIntent::Solid(color) => self.light.set_solid(color),
            LightIntent::Pulse(color) => self.light.set_pulsing(color, self.pulse_rate_ms),
        };
        self.record(result);
        self.active = Some(intent);
    }

    /// Switch off whatever is showing.
    pub fn release(&mut self) {
        if self.active.take().is_some() {
            let result = self.light.off();
            self.record(result);
        }
    }

    fn record(&mut self, result: Result<(), LightError>) {
        match result {
            Ok(()) if !self.connected => {
                tracing::info!("light device reconnected");
                self.connected = true;
            }
            Ok(()) => {}
            Err(e) if self.connected => {
                tracing::warn!(error = %e, "light effects disabled until the device answers");
                self.connected = false;
            }
            Err(e) => tracing::debug!(error = %e, "light still unavailable"),
        }
    }
}
