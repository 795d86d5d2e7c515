//! ssd1309-hw-interface
//!
//! Command-line front end for a 128×64 SSD1309 OLED wired to a Raspberry Pi
//! SPI bus. Each invocation:
//!
//! 1. Opens `/dev/spidevB.D` and claims the D/C and RES# GPIO lines.
//! 2. Pulses reset and sends the controller initialisation sequence.
//! 3. Draws one shape, image or block of text into a blank frame buffer.
//! 4. Flushes the frame to the panel.
//! 5. Writes `response.json` into the system temp directory so a calling
//!    process can pick up the outcome (and the text height, for `text`).

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use display_interface_spi::SPIInterface;
use embedded_graphics::pixelcolor::BinaryColor;
use linux_embedded_hal::{
    gpio_cdev::{Chip, LineRequestFlags},
    spidev::{SpiModeFlags, SpidevOptions},
    CdevPin, Delay, SpidevDevice,
};
use log::{error, info};
use serde::Serialize;

use ssd1309_display_rs::{Ssd1309, TextStyle};

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

/// Draw on an SSD1309 OLED over SPI
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// SPI bus number (`/dev/spidev<BUS>.<DEVICE>`)
    #[arg(long, default_value_t = 0)]
    spi_bus: u8,

    /// SPI chip-select / device number
    #[arg(long, default_value_t = 0)]
    spi_device: u8,

    /// SPI clock in Hz
    #[arg(long, default_value_t = 8_000_000)]
    spi_speed_hz: u32,

    /// GPIO character device holding the control lines
    #[arg(long, default_value = "/dev/gpiochip0")]
    gpio_chip: PathBuf,

    /// GPIO line offset of the data/command select pin
    #[arg(long, default_value_t = 25)]
    dc_gpio: u32,

    /// GPIO line offset of the reset pin
    #[arg(long, default_value_t = 27)]
    reset_gpio: u32,

    /// Panel contrast, sent after initialisation when given
    #[arg(long)]
    contrast: Option<u8>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Blank the panel
    Clear,
    /// Draw word-wrapped text with a TrueType font
    Text {
        /// Text to draw
        text: String,
        /// Path to a .ttf/.otf font file
        #[arg(long)]
        font: PathBuf,
        #[arg(long, default_value_t = 12)]
        font_size: u32,
        /// Wrap at this absolute x coordinate (0 disables wrapping)
        #[arg(long, default_value_t = 0)]
        wrap_width: u32,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        x: i32,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        y: i32,
        /// Only report the height; leave the panel untouched
        #[arg(long)]
        measure_only: bool,
    },
    /// Stamp an image's opaque pixels onto the panel
    Image {
        path: PathBuf,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        x: i32,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        y: i32,
        #[arg(long, default_value_t = 1.0)]
        scale: f32,
    },
    /// Fill a rectangle, both corners included
    Box {
        #[arg(allow_negative_numbers = true)]
        x1: i32,
        #[arg(allow_negative_numbers = true)]
        y1: i32,
        #[arg(allow_negative_numbers = true)]
        x2: i32,
        #[arg(allow_negative_numbers = true)]
        y2: i32,
        /// Clear the pixels instead of lighting them
        #[arg(long)]
        off: bool,
    },
    /// Draw a straight line
    Line {
        #[arg(allow_negative_numbers = true)]
        x1: i32,
        #[arg(allow_negative_numbers = true)]
        y1: i32,
        #[arg(allow_negative_numbers = true)]
        x2: i32,
        #[arg(allow_negative_numbers = true)]
        y2: i32,
        #[arg(long, default_value_t = 1)]
        thickness: i32,
        #[arg(long)]
        off: bool,
    },
    /// Fill a disk
    Circle {
        #[arg(allow_negative_numbers = true)]
        cx: i32,
        #[arg(allow_negative_numbers = true)]
        cy: i32,
        #[arg(allow_negative_numbers = true)]
        diameter: i32,
        #[arg(long)]
        off: bool,
    },
}

fn color(off: bool) -> BinaryColor {
    if off {
        BinaryColor::Off
    } else {
        BinaryColor::On
    }
}

// ---------------------------------------------------------------------------
// Response file
// ---------------------------------------------------------------------------

/// Outcome written to `<temp dir>/response.json`.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum Response {
    Ok {
        #[serde(skip_serializing_if = "Option::is_none")]
        height: Option<u32>,
    },
    Error {
        message: String,
    },
}

impl Response {
    fn from_outcome(outcome: &Result<Option<u32>>) -> Self {
        match outcome {
            Ok(height) => Response::Ok { height: *height },
            Err(e) => Response::Error {
                message: format!("{:#}", e),
            },
        }
    }
}

fn write_response(response: &Response) -> Result<PathBuf> {
    let path = std::env::temp_dir().join("response.json");
    let json = serde_json::to_string(response).context("serialising response")?;
    fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

// ---------------------------------------------------------------------------
// Hardware
// ---------------------------------------------------------------------------

type Panel = Ssd1309<SPIInterface<SpidevDevice, CdevPin>, CdevPin>;

fn output_pin(chip: &mut Chip, offset: u32, consumer: &str) -> Result<CdevPin> {
    let handle = chip
        .get_line(offset)
        .with_context(|| format!("getting GPIO line {}", offset))?
        .request(LineRequestFlags::OUTPUT, 0, consumer)
        .with_context(|| format!("requesting GPIO line {}", offset))?;
    CdevPin::new(handle).with_context(|| format!("creating pin for GPIO line {}", offset))
}

fn open_panel(args: &Args) -> Result<Panel> {
    let spi_path = format!("/dev/spidev{}.{}", args.spi_bus, args.spi_device);
    let mut spi = SpidevDevice::open(&spi_path).with_context(|| format!("opening {}", spi_path))?;
    let options = SpidevOptions::new()
        .bits_per_word(8)
        .max_speed_hz(args.spi_speed_hz)
        .mode(SpiModeFlags::SPI_MODE_0)
        .build();
    spi.configure(&options).context("configuring SPI")?;

    let mut chip = Chip::new(&args.gpio_chip)
        .with_context(|| format!("opening {}", args.gpio_chip.display()))?;
    let dc = output_pin(&mut chip, args.dc_gpio, "ssd1309-dc")?;
    let rst = output_pin(&mut chip, args.reset_gpio, "ssd1309-rst")?;

    let mut panel = Ssd1309::new(SPIInterface::new(spi, dc), rst);
    panel.reset(&mut Delay {}).context("resetting panel")?;
    panel.init().context("initialising panel")?;
    if let Some(contrast) = args.contrast {
        panel.set_contrast(contrast).context("setting contrast")?;
    }
    info!("SSD1309 ready on {}", spi_path);
    Ok(panel)
}

/// Run one drawing command against an initialised panel and flush it.
///
/// Returns the text height for `text`, `None` otherwise.
fn execute(panel: &mut Panel, command: &Command) -> Result<Option<u32>> {
    let mut height = None;
    match command {
        Command::Clear => panel.clear_buffer(),
        Command::Text {
            text,
            font,
            font_size,
            wrap_width,
            x,
            y,
            measure_only,
        } => {
            let style = TextStyle::new(font, *font_size).with_wrap_width(*wrap_width);
            height = Some(panel.draw_text(text, *x, *y, &style, *measure_only)?);
        }
        Command::Image { path, x, y, scale } => panel
            .draw_image(path, *x, *y, *scale)
            .with_context(|| format!("drawing {}", path.display()))?,
        Command::Box { x1, y1, x2, y2, off } => panel.draw_box(*x1, *y1, *x2, *y2, color(*off)),
        Command::Line {
            x1,
            y1,
            x2,
            y2,
            thickness,
            off,
        } => panel.draw_line(*x1, *y1, *x2, *y2, color(*off), *thickness),
        Command::Circle {
            cx,
            cy,
            diameter,
            off,
        } => panel.draw_circle(*cx, *cy, *diameter, color(*off)),
    }
    panel.flush().context("flushing frame")?;
    Ok(height)
}

fn run(args: &Args) -> Result<Option<u32>> {
    let mut panel = open_panel(args)?;
    execute(&mut panel, &args.command)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let outcome = run(&args);
    if let Err(e) = &outcome {
        error!("{:#}", e);
    }

    match write_response(&Response::from_outcome(&outcome)) {
        Ok(path) => log::debug!("response written to {}", path.display()),
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::FAILURE;
        }
    }

    if outcome.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
