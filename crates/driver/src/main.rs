mod error;
mod layout;
mod self_test;
mod settings;

use crate::error::DriverError;
use crate::layout::{LayoutOptions, StandaloneLayout};
use crate::self_test::self_test;
use crate::settings::Settings;
use clap::Parser;
use config::Config;
use log::{debug, info};
use midir::os::unix::VirtualOutput;
use midir::{MidiInput, MidiOutput, MidiOutputConnection, PortInfoError};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};
use twister_library::output::MidiOut;
use twister_library::{ControlSurface, SurfaceContext};

/// Longest the loop sleeps without input, so the update tick keeps running.
const MAX_WAIT: Duration = Duration::from_millis(10);

enum Event {
    Midi(Vec<u8>),
    Quit,
}

#[derive(Parser, Debug)]
#[clap(
    name = "MIDI Fighter Twister standalone driver",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
)]
struct Args {
    #[clap(short, long, help = "Config file (see example_config.toml)")]
    config: Option<String>,

    #[clap(short, long, help = "List MIDI ports and exit")]
    list_ports: bool,

    #[clap(short, long, help = "Run the light show and exit")]
    self_test: bool,
}

/// Writes every queued message to `port`.
pub(crate) fn send_all(port: &mut MidiOutputConnection, out: &MidiOut) -> Result<(), DriverError> {
    for msg in out.drain() {
        port.send(&msg.bytes())?;
    }
    Ok(())
}

/// First port whose name contains `pattern`.
fn find_port<P: Clone>(
    ports: &[P],
    port_name: impl Fn(&P) -> Result<String, PortInfoError>,
    pattern: &str,
    direction: &'static str,
) -> Result<(P, String), DriverError> {
    for port in ports {
        let name = port_name(port)?;
        if name.contains(pattern) {
            return Ok((port.clone(), name));
        }
    }

    Err(DriverError::PortNotFound {
        direction,
        pattern: pattern.to_string(),
    })
}

fn list_ports(midi_in: &MidiInput, midi_out: &MidiOutput) -> Result<(), DriverError> {
    println!("Inputs:");
    for (i, port) in midi_in.ports().iter().enumerate() {
        println!("  {i}: {}", midi_in.port_name(port)?);
    }
    println!("Outputs:");
    for (i, port) in midi_out.ports().iter().enumerate() {
        println!("  {i}: {}", midi_out.port_name(port)?);
    }
    Ok(())
}

fn main() -> Result<(), DriverError> {
    env_logger::init();
    let args = Args::parse();

    let mut cfg = Config::builder();

    if let Some(config_fn) = args.config {
        cfg = cfg.add_source(config::File::with_name(config_fn.as_str()));
    }

    let settings: Settings = cfg.build()?.try_deserialize()?;
    settings.validate().map_err(DriverError::InvalidSettings)?;

    info!("Running with settings: {settings:?}");

    let midi_in = MidiInput::new(&format!("{} In", settings.client_name))?;
    let midi_out = MidiOutput::new(&settings.client_name)?;

    if args.list_ports {
        return list_ports(&midi_in, &midi_out);
    }

    let (in_port, in_name) = find_port(
        &midi_in.ports(),
        |p| midi_in.port_name(p),
        &settings.device_port,
        "input",
    )?;
    let (out_port, out_name) = find_port(
        &midi_out.ports(),
        |p| midi_out.port_name(p),
        &settings.device_port,
        "output",
    )?;

    let (tx, rx) = mpsc::channel();
    let quit = tx.clone();
    ctrlc::set_handler(move || {
        let _ = quit.send(Event::Quit);
    })?;

    // Dropping the connection closes the port.
    let _input = midi_in.connect(
        &in_port,
        "twister-in",
        move |_timestamp, message, _| {
            let _ = tx.send(Event::Midi(message.to_vec()));
        },
        (),
    )?;
    info!("Reading from '{in_name}'");

    let mut device = midi_out.connect(&out_port, "twister-out")?;
    info!("Writing to '{out_name}'");

    let mut surface = ControlSurface::new(SurfaceContext::default());

    if settings.self_test || args.self_test {
        self_test(&surface, &mut device)?;
    }
    if args.self_test {
        return Ok(());
    }

    let mut published = MidiOutput::new(&settings.client_name)?
        .create_virtual(&settings.virtual_port_name)?;
    info!("Publishing knob values on '{}'", settings.virtual_port_name);

    let bank_buttons = settings.bank_button_side().map_err(DriverError::InvalidSettings)?;
    let hold_animation = settings.hold_animation().map_err(DriverError::InvalidSettings)?;

    surface.set_sensitivity_all(settings.sensitivity);
    surface.set_fine_sensitivity_all(settings.fine_sensitivity);
    surface.set_popups_enabled(settings.bank_popups);
    surface.bind_bank_buttons(bank_buttons);

    let layout = StandaloneLayout::build(
        &mut surface,
        &LayoutOptions {
            hold_animation,
            knob_colors: settings.knob_colors.clone(),
            bank_buttons,
            knobs_per_bank: settings.knobs_per_bank,
        },
    );
    surface.activate();

    let result = main_loop(&mut surface, &layout, &rx, &mut device, &mut published);

    info!("Turning the lights off");
    surface.lights_off();
    send_all(&mut device, surface.out())?;

    result
}

fn main_loop(
    surface: &mut ControlSurface,
    layout: &StandaloneLayout,
    rx: &Receiver<Event>,
    device: &mut MidiOutputConnection,
    published: &mut MidiOutputConnection,
) -> Result<(), DriverError> {
    loop {
        let now = Instant::now();
        let wait = surface
            .next_deadline()
            .map_or(MAX_WAIT, |deadline| deadline.saturating_duration_since(now).min(MAX_WAIT));

        let keep_running = match rx.recv_timeout(wait) {
            Ok(event) => handle_event(surface, event, Instant::now()),
            Err(RecvTimeoutError::Timeout) => true,
            Err(RecvTimeoutError::Disconnected) => false,
        };
        if !keep_running {
            return Ok(());
        }

        surface.poll_timers(Instant::now());
        surface.update_hardware();
        send_all(device, surface.out())?;
        send_all(published, layout.published())?;
    }
}

/// Feeds one event to the surface. False once the driver should stop.
fn handle_event(surface: &mut ControlSurface, event: Event, now: Instant) -> bool {
    match event {
        Event::Midi(message) => {
            if !surface.handle_midi(now, &message) {
                debug!("Ignored message from the Twister: {message:02X?}");
            }
            true
        }
        Event::Quit => {
            info!("Quitting");
            false
        }
    }
}
