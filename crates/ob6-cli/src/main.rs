//! ob6 - OB-6 SysEx tool
//!
//! Inspects dumps saved from an OB-6 and builds the requests, dumps and
//! parameter changes a host would send to it. Messages are printed as hex or
//! written as `.syx` files; no MIDI ports are opened.

mod config;
mod error;
mod output;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};

use ob6_sysex::patch::{friendly_bank_name, NUMBER_OF_PROGRAMS};
use ob6_sysex::{
    DetectionState, DeviceIdentity, Dump, DumpRequest, MidiChannel, MidiMessage, Ob6,
    ProgramNumber, SynthProtocol,
};

use crate::config::{Config, OutputFormat};

#[derive(Parser)]
#[command(name = "ob6")]
#[command(author, version, about = "OB-6 SysEx tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (default: ~/.config/ob6/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Device channel (1-16 or omni), overrides the config file
    #[arg(long, global = true)]
    channel: Option<MidiChannel>,

    /// Global settings dump (.syx) to read the device state from
    #[arg(long, global = true)]
    settings_dump: Option<PathBuf>,

    /// Output format, overrides the config file
    #[arg(long, value_enum, global = true)]
    format: Option<OutputFormat>,

    /// Output file for syx format
    #[arg(short, long, global = true)]
    out: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode every message in a .syx file
    Inspect { file: PathBuf },
    /// Build a dump request
    Request {
        #[command(subcommand)]
        target: RequestTarget,
    },
    /// List the global settings the OB-6 exposes
    Settings,
    /// Build the messages that change one global setting
    Set { setting: String, value: String },
    /// Move the device to another MIDI channel
    Channel {
        #[arg(value_name = "CHANNEL")]
        target: MidiChannel,
    },
    /// Switch MIDI control on or off
    MidiControl { state: Switch },
    /// Switch local control on or off
    LocalControl { state: Switch },
    /// Re-send the patches of a .syx file, optionally to another place
    Store {
        file: PathBuf,
        /// Place (0-999) of the first patch, the rest follow it; without it
        /// patches go where they came from
        #[arg(long, value_parser = clap::value_parser!(u16).range(0..1000))]
        place: Option<u16>,
        /// Rename the patches
        #[arg(long)]
        name: Option<String>,
    },
    /// Create a default configuration file
    Init,
    /// Show the configuration file path
    ConfigPath,
}

#[derive(Subcommand)]
enum RequestTarget {
    /// Global settings (also used to detect the device)
    Global,
    /// The current edit buffer
    EditBuffer,
    /// A stored program
    Program {
        #[arg(value_parser = clap::value_parser!(u16).range(0..1000))]
        number: u16,
    },
    /// An alternate tuning
    Tuning {
        #[arg(value_parser = clap::value_parser!(u8).range(0..128))]
        slot: u8,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Switch {
    On,
    Off,
}

impl Switch {
    fn enabled(self) -> bool {
        matches!(self, Switch::On)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match &cli.command {
        Commands::Init => {
            let path = match &cli.config {
                Some(path) => {
                    Config::write_default_config(path)?;
                    path.clone()
                }
                None => Config::create_default_config_file()?,
            };
            println!("Created default config at: {}", path.display());
            return Ok(());
        }
        Commands::ConfigPath => {
            let path = match &cli.config {
                Some(path) => path.clone(),
                None => Config::config_path()?,
            };
            println!("{}", path.display());
            return Ok(());
        }
        _ => {}
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load_or_default(),
    };
    if let Some(format) = cli.format {
        config.output.format = format;
    }

    let ob6 = Ob6::new().with_tuning_device_id(config.device.tuning_device_id);

    let messages = match &cli.command {
        Commands::Inspect { file } => return inspect(&ob6, file),
        Commands::Settings => {
            list_settings(&ob6);
            return Ok(());
        }
        Commands::Request { target } => {
            let request = match target {
                RequestTarget::Global => DumpRequest::GlobalSettings,
                RequestTarget::EditBuffer => DumpRequest::EditBuffer,
                RequestTarget::Program { number } => DumpRequest::Program(program_place(*number)?),
                RequestTarget::Tuning { slot } => DumpRequest::AlternateTuning { slot: *slot },
            };
            vec![ob6.build_request(request)]
        }
        Commands::Set { setting, value } => {
            let identity = device_identity(&cli, &config, &ob6)?;
            let definition = ob6.settings_catalog().lookup_key(setting)?;
            let parsed = definition.domain.parse_value(value).with_context(|| {
                format!("{} takes {}", definition.name, definition.domain)
            })?;
            ob6.message_builder()
                .build_setting_change(definition, &parsed, identity.channel)?
        }
        Commands::Channel { target } => {
            let identity = device_identity(&cli, &config, &ob6)?;
            let update = ob6.synchronizer().change_channel(&identity, *target)?;
            log::info!("Device will listen on channel {}", update.identity.channel);
            update.messages
        }
        Commands::MidiControl { state } => {
            let identity = device_identity(&cli, &config, &ob6)?;
            ob6.synchronizer()
                .set_midi_control(&identity, state.enabled())?
                .messages
        }
        Commands::LocalControl { state } => {
            let identity = device_identity(&cli, &config, &ob6)?;
            ob6.synchronizer()
                .set_local_control(&identity, state.enabled())?
                .messages
        }
        Commands::Store { file, place, name } => store(&ob6, file, *place, name.as_deref())?,
        Commands::Init | Commands::ConfigPath => return Ok(()),
    };

    output::emit(&messages, &config.output, cli.out.as_deref())?;
    Ok(())
}

fn read_sysex_file(path: &Path) -> Result<Vec<Vec<u8>>> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let messages = ob6_sysex::midi::split_sysex_stream(&bytes);
    log::debug!("{}: {} SysEx messages", path.display(), messages.len());
    Ok(messages)
}

/// The identity commands are built against: detected from `--settings-dump`
/// when given, otherwise taken from the configuration.
fn device_identity(cli: &Cli, config: &Config, ob6: &Ob6) -> Result<DeviceIdentity> {
    let mut identity = match &cli.settings_dump {
        Some(path) => {
            let sync = ob6.synchronizer();
            let mut state = DetectionState::Unidentified;
            for message in read_sysex_file(path)? {
                state = sync.on_sysex(state, &message).state;
            }
            match state {
                DetectionState::Identified(identity) => identity,
                DetectionState::Unidentified => {
                    bail!("{} holds no usable global settings dump", path.display())
                }
            }
        }
        None => DeviceIdentity {
            channel: config.device.midi_channel()?,
            local_control: true,
            midi_control: true,
        },
    };
    if let Some(channel) = cli.channel {
        identity.channel = channel;
    }
    Ok(identity)
}

fn inspect(ob6: &Ob6, file: &Path) -> Result<()> {
    let messages = read_sysex_file(file)?;
    if messages.is_empty() {
        println!("No SysEx messages in {}", file.display());
        return Ok(());
    }

    let catalog = ob6.settings_catalog();
    for (i, message) in messages.iter().enumerate() {
        print!("#{:<3} ", i + 1);
        match ob6.classify(message) {
            Ok(Some(Dump::Program(patch))) => {
                match patch.place() {
                    Some(place) => println!(
                        "Program {} (bank {}): {}",
                        place,
                        friendly_bank_name(place.bank()),
                        patch.name()
                    ),
                    None => println!("Program: {}", patch.name()),
                }
            }
            Ok(Some(Dump::EditBuffer(patch))) => println!("Edit buffer: {}", patch.name()),
            Ok(Some(Dump::GlobalSettings(settings))) => {
                println!("Global settings");
                for category in catalog.categories() {
                    println!("  [{}]", category);
                    for definition in catalog.in_category(category) {
                        match settings.value(catalog, definition.id) {
                            Ok(value) => println!("    {:<22} {}", definition.name, value),
                            Err(e) => println!("    {:<22} ({})", definition.name, e),
                        }
                    }
                }
            }
            Ok(Some(Dump::AlternateTuning(tuning))) => {
                println!("Alternate tuning {}: {}", tuning.program, tuning.name)
            }
            Ok(None) => println!("Unrecognized message ({} bytes)", message.len()),
            Err(e) => println!("{}", e),
        }
    }
    Ok(())
}

fn list_settings(ob6: &Ob6) {
    let catalog = ob6.settings_catalog();
    println!("{} global settings", ob6.name());
    for category in catalog.categories() {
        println!();
        println!("[{}]", category);
        for definition in catalog.in_category(category) {
            println!("  {:<20} {:<22} {}", definition.id.key(), definition.name, definition.domain);

            let settable = definition.settable_values();
            if settable.is_empty() {
                println!("  {:<20} panel only", "");
            } else if settable != definition.reportable_values() {
                let labels: Vec<String> = settable
                    .iter()
                    .filter_map(|raw| definition.domain.decode(*raw))
                    .map(|value| value.to_string())
                    .collect();
                println!("  {:<20} remote: {}", "", labels.join(", "));
            }
        }
    }
}

fn program_place(number: u16) -> Result<ProgramNumber> {
    ProgramNumber::from_zero_based(number).with_context(|| {
        format!("no program {}, places run from 0 to {}", number, NUMBER_OF_PROGRAMS - 1)
    })
}

fn store(
    ob6: &Ob6,
    file: &Path,
    place: Option<u16>,
    name: Option<&str>,
) -> Result<Vec<MidiMessage>> {
    let start = place.map(program_place).transpose()?;
    restore_patches(ob6, &read_sysex_file(file)?, start, name)
        .with_context(|| format!("storing {}", file.display()))
}

/// Dumps for every patch in `messages`. With a `start` place the first patch
/// goes there and each following one to the next place.
fn restore_patches(
    ob6: &Ob6,
    messages: &[Vec<u8>],
    start: Option<ProgramNumber>,
    name: Option<&str>,
) -> Result<Vec<MidiMessage>> {
    let mut dumps = Vec::new();
    for message in messages {
        let Some(dump) = ob6.classify(message)? else {
            continue;
        };
        let Some(patch) = dump.patch() else {
            log::info!("Skipping {}", dump.kind());
            continue;
        };
        let mut patch = match name {
            Some(name) => patch.renamed(name),
            None => patch.clone(),
        };
        if let Some(start) = start {
            let place = start.offset_by(dumps.len()).with_context(|| {
                format!(
                    "patch {} would land past program {}",
                    dumps.len() + 1,
                    NUMBER_OF_PROGRAMS - 1
                )
            })?;
            patch = patch.with_place(place);
        }
        dumps.push(ob6.build_dump(&patch));
    }
    if dumps.is_empty() {
        bail!("no patches found");
    }
    Ok(dumps)
}
