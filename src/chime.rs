use std::io::Write;

use tracing::{info, warn};

/// Terminal bell standing in for an explosion sound.
///
/// Stays silent until unlocked by the first key press or click, and rings
/// at most once per frame however many explosions happened.
#[derive(Debug, Default)]
pub struct Chime {
    enabled: bool,
    unlocked: bool,
    pending: bool,
}

impl Chime {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Self::default()
        }
    }

    pub fn unlock(&mut self) {
        if self.enabled && !self.unlocked {
            self.unlocked = true;
            info!("audio unlocked");
        }
    }

    pub fn on_explosion(&mut self) {
        if self.enabled && self.unlocked {
            self.pending = true;
        }
    }

    /// Writes the bell if one is due. Failures are logged and dropped.
    pub fn ring<W: Write>(&mut self, out: &mut W) {
        if !std::mem::take(&mut self.pending) {
            return;
        }
        if let Err(err) = out.write_all(b"\x07") {
            warn!(%err, "could not ring bell");
        }
    }
}
