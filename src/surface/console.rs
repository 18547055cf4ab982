// src/surface/console.rs

//! Terminal host surface.
//!
//! Renders the overlay into a raw-mode terminal using truecolor SGR
//! sequences. One character cell carries two vertically stacked pixels via
//! the upper-half-block glyph (foreground colors the top pixel, background
//! the bottom), so the drawable area is `cols x rows * 2` pixels. The
//! viewport is polled with `ioctl(TIOCGWINSZ)` and size changes surface as
//! `SurfaceEvent::Resized`.

use anyhow::{bail, Context, Result};
use libc::{winsize, F_GETFL, F_SETFL, O_NONBLOCK, STDIN_FILENO, TIOCGWINSZ};
use log::{debug, error, info, trace, warn};
use std::io::{self, stdin, stdout, Read, Write};
use std::mem;
use std::os::unix::io::RawFd;
use termios::{tcsetattr, Termios, ECHO, ICANON, ISIG, TCSANOW, VMIN, VTIME};

use crate::color::Color;
use crate::frame::PixelBuffer;
use crate::surface::{Surface, SurfaceDimensions, SurfaceEvent};

const CURSOR_HIDE: &str = "\x1b[?25l";
const CURSOR_SHOW: &str = "\x1b[?25h";
const CLEAR_SCREEN_AND_HOME: &str = "\x1b[2J\x1b[H";
const SGR_RESET: &str = "\x1b[0m";
const HALF_BLOCK: char = '\u{2580}';

const DEFAULT_WIDTH_CELLS: u16 = 80;
const DEFAULT_HEIGHT_CELLS: u16 = 24;

pub struct ConsoleSurface {
    original_termios: Option<Termios>,
    width_cells: u16,
    height_cells: u16,
    /// RGB backing store, `width_cells x height_cells * 2`, row-major.
    pixels: Vec<[u8; 3]>,
    global_alpha: f32,
    closed: bool,
    input_buffer: [u8; 64],
}

impl ConsoleSurface {
    /// Set up the terminal: raw mode, non-blocking stdin, hidden cursor.
    ///
    /// A terminal that refuses raw mode is tolerated (keys will echo); a
    /// terminal whose size cannot be queried is not.
    pub fn new() -> Result<Self> {
        info!("Creating new ConsoleSurface.");
        let original_termios = match Termios::from_fd(STDIN_FILENO) {
            Ok(ts) => Some(ts),
            Err(e) => {
                warn!(
                    "Failed to get initial termios: {}. Proceeding without raw mode.",
                    e
                );
                None
            }
        };

        if let Some(ref ots) = original_termios {
            let mut raw_termios = *ots;
            raw_termios.c_lflag &= !(ECHO | ICANON | ISIG);
            raw_termios.c_cc[VMIN] = 0;
            raw_termios.c_cc[VTIME] = 0;
            tcsetattr(STDIN_FILENO, TCSANOW, &raw_termios)
                .context("ConsoleSurface: Failed to set raw terminal attributes")?;
            debug!("ConsoleSurface: Terminal set to raw mode.");
        }

        // Non-blocking stdin so event polling never stalls a tick.
        // SAFETY: plain fcntl flag manipulation on a valid fd.
        unsafe {
            let flags = libc::fcntl(STDIN_FILENO, F_GETFL);
            if flags == -1 || libc::fcntl(STDIN_FILENO, F_SETFL, flags | O_NONBLOCK) == -1 {
                warn!(
                    "ConsoleSurface: Failed to set stdin non-blocking: {}",
                    io::Error::last_os_error()
                );
            }
        }

        print!("{}{}", CURSOR_HIDE, CLEAR_SCREEN_AND_HOME);
        stdout()
            .flush()
            .context("ConsoleSurface: Failed to flush stdout for setup")?;

        let (width_cells, height_cells) = get_terminal_size_cells(STDIN_FILENO)
            .context("ConsoleSurface: Failed to get initial terminal size")?;
        info!(
            "ConsoleSurface: Initial terminal size: {}x{} cells ({}x{} px).",
            width_cells,
            height_cells,
            width_cells,
            height_cells as u32 * 2
        );

        let pixels = vec![[0u8; 3]; width_cells as usize * height_cells as usize * 2];
        Ok(ConsoleSurface {
            original_termios,
            width_cells,
            height_cells,
            pixels,
            global_alpha: 1.0,
            closed: false,
            input_buffer: [0u8; 64],
        })
    }

    fn resize_store(&mut self, width_cells: u16, height_cells: u16) {
        self.width_cells = width_cells;
        self.height_cells = height_cells;
        self.pixels.clear();
        self.pixels
            .resize(width_cells as usize * height_cells as usize * 2, [0u8; 3]);
    }
}

impl Surface for ConsoleSurface {
    fn dimensions(&self) -> SurfaceDimensions {
        SurfaceDimensions::new(self.width_cells as u32, self.height_cells as u32 * 2)
    }

    fn acquire(&mut self) -> Result<()> {
        if self.closed {
            bail!("console surface has been shut down");
        }
        Ok(())
    }

    fn poll_events(&mut self) -> Result<Vec<SurfaceEvent>> {
        let mut events = Vec::new();

        match get_terminal_size_cells(STDIN_FILENO) {
            Ok((width_cells, height_cells)) => {
                if width_cells != self.width_cells || height_cells != self.height_cells {
                    info!(
                        "ConsoleSurface: Terminal resized from {}x{} to {}x{} cells.",
                        self.width_cells, self.height_cells, width_cells, height_cells
                    );
                    self.resize_store(width_cells, height_cells);
                    let dims = self.dimensions();
                    events.push(SurfaceEvent::Resized {
                        width: dims.width,
                        height: dims.height,
                    });
                }
            }
            Err(e) => {
                warn!(
                    "ConsoleSurface: Failed to get terminal size: {}. Using last known.",
                    e
                );
            }
        }

        match stdin().read(&mut self.input_buffer) {
            Ok(0) => {
                info!("ConsoleSurface: EOF on stdin. Requesting close.");
                events.push(SurfaceEvent::CloseRequested);
            }
            Ok(bytes_read) => {
                for &byte in &self.input_buffer[..bytes_read] {
                    // q, ESC, Ctrl-C, Ctrl-D all mean "take the overlay down".
                    if matches!(byte, b'q' | b'Q' | 0x1b | 0x03 | 0x04) {
                        debug!("ConsoleSurface: quit byte {:#04x} received.", byte);
                        events.push(SurfaceEvent::CloseRequested);
                    }
                }
            }
            Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                trace!("ConsoleSurface: stdin read WouldBlock.");
            }
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {
                trace!("ConsoleSurface: stdin read Interrupted.");
            }
            Err(e) => {
                return Err(e).context("ConsoleSurface: Error reading from stdin");
            }
        }
        Ok(events)
    }

    fn fill_all(&mut self, color: Color) -> Result<()> {
        let rgb = color.to_rgb();
        self.pixels.fill(rgb);
        Ok(())
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.global_alpha = alpha.clamp(0.0, 1.0);
    }

    fn composite(&mut self, frame: &PixelBuffer) -> Result<()> {
        let surface_width = self.width_cells as usize;
        let surface_height = self.height_cells as usize * 2;
        let width = (frame.width() as usize).min(surface_width);
        let height = (frame.height() as usize).min(surface_height);

        let bytes = frame.as_bytes();
        for y in 0..height {
            for x in 0..width {
                let src = &bytes[(y * frame.width() as usize + x) * 4..][..4];
                let alpha = self.global_alpha * (src[3] as f32 / 255.0);
                let dst = &mut self.pixels[y * surface_width + x];
                dst[0] = blend_channel(dst[0], src[0], alpha);
                dst[1] = blend_channel(dst[1], src[1], alpha);
                dst[2] = blend_channel(dst[2], src[2], alpha);
            }
        }
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        let width = self.width_cells as usize;
        let mut out = String::with_capacity(self.pixels.len() * 10 + 16);
        let mut last_pair: Option<([u8; 3], [u8; 3])> = None;

        for row in 0..self.height_cells as usize {
            out.push_str(&format!("\x1b[{};1H", row + 1));
            for col in 0..width {
                let top = self.pixels[row * 2 * width + col];
                let bottom = self.pixels[(row * 2 + 1) * width + col];
                if last_pair != Some((top, bottom)) {
                    out.push_str(&format!(
                        "\x1b[38;2;{};{};{}m\x1b[48;2;{};{};{}m",
                        top[0], top[1], top[2], bottom[0], bottom[1], bottom[2]
                    ));
                    last_pair = Some((top, bottom));
                }
                out.push(HALF_BLOCK);
            }
        }
        out.push_str(SGR_RESET);

        let mut stdout = stdout().lock();
        stdout
            .write_all(out.as_bytes())
            .context("ConsoleSurface: Failed to write frame")?;
        stdout
            .flush()
            .context("ConsoleSurface: Failed to flush frame")
    }

    fn cleanup(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        info!("ConsoleSurface: Cleaning up...");
        self.closed = true;
        print!("{}{}{}", SGR_RESET, CLEAR_SCREEN_AND_HOME, CURSOR_SHOW);
        stdout()
            .flush()
            .context("ConsoleSurface: Failed to flush for cleanup")?;
        if let Some(original_termios) = self.original_termios.take() {
            debug!("ConsoleSurface: Restoring original terminal attributes.");
            tcsetattr(STDIN_FILENO, TCSANOW, &original_termios)
                .context("ConsoleSurface: Failed to restore original terminal attributes")?;
        }
        info!("ConsoleSurface: Cleanup complete.");
        Ok(())
    }
}

/// Blend one channel of `src` over `dst` at `alpha` in [0, 1].
fn blend_channel(dst: u8, src: u8, alpha: f32) -> u8 {
    (dst as f32 + (src as f32 - dst as f32) * alpha).round() as u8
}

fn get_terminal_size_cells(fd: RawFd) -> Result<(u16, u16)> {
    // SAFETY: TIOCGWINSZ only writes the winsize struct we hand it.
    unsafe {
        let mut winsz: winsize = mem::zeroed();
        if libc::ioctl(fd, TIOCGWINSZ, &mut winsz) == -1 {
            return Err(anyhow::Error::from(io::Error::last_os_error())
                .context("ConsoleSurface: ioctl(TIOCGWINSZ) failed"));
        }
        let cols = if winsz.ws_col == 0 {
            DEFAULT_WIDTH_CELLS
        } else {
            winsz.ws_col
        };
        let rows = if winsz.ws_row == 0 {
            DEFAULT_HEIGHT_CELLS
        } else {
            winsz.ws_row
        };
        Ok((cols, rows))
    }
}

impl Drop for ConsoleSurface {
    fn drop(&mut self) {
        if let Err(e) = self.cleanup() {
            error!("ConsoleSurface: Error during cleanup in drop: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_channel_endpoints() {
        assert_eq!(blend_channel(10, 200, 0.0), 10);
        assert_eq!(blend_channel(10, 200, 1.0), 200);
    }

    #[test]
    fn blend_channel_interpolates() {
        assert_eq!(blend_channel(0, 100, 0.5), 50);
        // A faint overlay barely shifts the background.
        assert_eq!(blend_channel(255, 205, 0.05), 253);
    }
}
