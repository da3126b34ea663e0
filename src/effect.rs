use crossterm::event::Event;
use std::io::{self, Write};

/// Something the terminal loop can drive: fixed-step updates, a full
/// redraw per frame, and the input events that are not quit keys.
pub trait Effect {
    fn update(&mut self, dt: f32);
    fn render<W: Write>(&mut self, out: &mut W) -> io::Result<()>;
    fn handle_event(&mut self, _event: &Event) {}
}
