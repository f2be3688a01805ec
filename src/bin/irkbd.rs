// irkbd CLI
// Relay an infrared remote to a USB HID keyboard gadget or a uinput device

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use strum::IntoEnumIterator;

use irkbd_core::input::{Decoder, LircDecoder, MonotonicClock, ScriptDecoder};
use irkbd_core::output::{GadgetSink, HidEmitter, ReportEmitter, VirtualDevice};
use irkbd_core::{Config, Keymap, Layout, OutputBackend, Relay, TranslationEngine};

/// Infrared remote to USB keyboard bridge
#[derive(Parser, Debug)]
#[command(name = "irkbd")]
#[command(version)]
#[command(about = "Infrared remote to USB keyboard bridge", long_about = None)]
struct Args {
    /// TOML configuration file (default: ~/.config/irkbd/config.toml)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Built-in layout, overriding the config file ("none" for custom only)
    #[arg(short, long, value_name = "LAYOUT")]
    layout: Option<String>,

    /// lirc device to read scancodes from
    #[arg(short, long, value_name = "DEVICE")]
    input: Option<PathBuf>,

    /// HID gadget device for the hidg backend
    #[arg(short, long, value_name = "DEVICE")]
    output: Option<PathBuf>,

    /// Output backend: hidg or uinput
    #[arg(short, long, value_name = "BACKEND")]
    backend: Option<OutputBackend>,

    /// Replay a recorded event script instead of reading a lirc device
    #[arg(long, value_name = "SCRIPT")]
    replay: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Validate config and exit
    #[arg(long)]
    check_config: bool,

    /// List built-in layouts
    #[arg(long)]
    list_layouts: bool,

    /// Print the resolved keymap and exit
    #[arg(long)]
    dump_keymap: bool,
}

/// Main application state
struct Application {
    config: Config,
    keymap: Keymap,
    args: Args,
    /// Flag to signal the relay to stop
    running: Arc<AtomicBool>,
}

impl Application {
    /// Load the config and apply command-line overrides
    fn new(args: Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Config::from_toml_path(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => Config::load_default()?,
        };

        if let Some(name) = &args.layout {
            config.layout = Config::parse_layout(name)?;
        }
        if let Some(input) = &args.input {
            config.input_device = input.clone();
        }
        if let Some(output) = &args.output {
            config.output_device = output.clone();
        }
        if let Some(backend) = args.backend {
            config.output_backend = backend;
        }

        let keymap = config.to_keymap()?;
        if keymap.is_empty() {
            bail!("keymap is empty: choose a layout or add [[mapping]] entries");
        }

        Ok(Self {
            config,
            keymap,
            args,
            running: Arc::new(AtomicBool::new(true)),
        })
    }

    fn list_layouts() {
        for layout in Layout::iter() {
            let marker = if layout == Layout::default() { " (default)" } else { "" };
            println!("{:<14} {}{}", layout.to_string(), layout.description(), marker);
        }
    }

    fn validate(&self) {
        println!(
            "Configuration is valid: keymap '{}' with {} codes",
            self.keymap.name(),
            self.keymap.len()
        );
    }

    fn dump_keymap(&self) {
        println!("# {}", self.keymap.name());
        for mapping in self.keymap.entries() {
            println!("{}", mapping);
        }
        for dup in self.keymap.duplicates() {
            println!("# shadowed: {}", dup);
        }
    }

    fn open_decoder(&self, clock: MonotonicClock) -> Result<Box<dyn Decoder>> {
        if let Some(script_path) = &self.args.replay {
            let script = std::fs::read_to_string(script_path)
                .with_context(|| format!("reading {}", script_path.display()))?;
            let decoder = ScriptDecoder::from_script(clock, &script)?.paced(true);
            log::info!(
                "Replaying {} events from {}",
                decoder.remaining(),
                script_path.display()
            );
            return Ok(Box::new(decoder));
        }

        let decoder = LircDecoder::open(&self.config.input_device, clock)
            .with_context(|| format!("opening {}", self.config.input_device.display()))?
            .repeat_window(self.config.timing.release_timeout_ms);
        Ok(Box::new(decoder))
    }

    fn open_emitter(&self) -> Result<Box<dyn HidEmitter>> {
        match self.config.output_backend {
            OutputBackend::Hidg => {
                let sink = GadgetSink::open(&self.config.output_device)?;
                Ok(Box::new(ReportEmitter::new(sink)))
            }
            OutputBackend::Uinput => Ok(Box::new(VirtualDevice::new()?)),
        }
    }

    fn install_signal_handler(&self) -> Result<()> {
        use signal_hook::consts::{SIGINT, SIGTERM};
        use signal_hook::iterator::Signals;

        let mut signals = Signals::new([SIGINT, SIGTERM]).context("installing signal handler")?;
        let running = self.running.clone();

        std::thread::spawn(move || {
            if let Some(signal) = signals.forever().next() {
                log::info!("Received signal {}, shutting down", signal);
                running.store(false, Ordering::SeqCst);
            }
        });
        Ok(())
    }

    /// Run the relay until interrupted
    fn run(self) -> Result<()> {
        let clock = MonotonicClock::new();
        let decoder = self.open_decoder(clock)?;
        let emitter = self.open_emitter()?;
        self.install_signal_handler()?;

        let engine = TranslationEngine::new(self.keymap.clone(), self.config.timing);
        let mut relay = Relay::new(decoder, engine, emitter, clock);
        relay.run(&self.running)?;

        let stats = relay.stats();
        log::info!(
            "Stopped after {} events ({} unmapped), {} key actions, {} emit errors",
            stats.events,
            stats.unmapped,
            stats.actions,
            stats.emit_errors
        );
        Ok(())
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    // Doesn't require config
    if args.list_layouts {
        Application::list_layouts();
        return Ok(());
    }

    let app = Application::new(args)?;

    if app.args.check_config {
        app.validate();
        return Ok(());
    }
    if app.args.dump_keymap {
        app.dump_keymap();
        return Ok(());
    }

    app.run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["irkbd", "--config", "/tmp/test.toml"]);

        assert_eq!(args.config, Some(PathBuf::from("/tmp/test.toml")));
        assert!(args.layout.is_none());
        assert!(args.backend.is_none());
        assert!(!args.verbose);
        assert!(!args.check_config);
        assert!(!args.list_layouts);
        assert!(!args.dump_keymap);
    }

    #[test]
    fn test_args_with_options() {
        let args = Args::parse_from([
            "irkbd",
            "--layout",
            "mce-kodi",
            "--input",
            "/dev/lirc1",
            "--backend",
            "uinput",
            "--verbose",
        ]);

        assert_eq!(args.layout.as_deref(), Some("mce-kodi"));
        assert_eq!(args.input, Some(PathBuf::from("/dev/lirc1")));
        assert_eq!(args.backend, Some(OutputBackend::Uinput));
        assert!(args.verbose);
    }

    #[test]
    fn test_args_rejects_unknown_backend() {
        assert!(Args::try_parse_from(["irkbd", "--backend", "serial"]).is_err());
    }

    #[test]
    fn test_application_overrides() {
        let path = std::env::temp_dir().join(format!("irkbd-cli-{}.toml", std::process::id()));
        std::fs::write(&path, "layout = \"int422-kodi\"\n").unwrap();

        let args = Args::parse_from([
            "irkbd",
            "--config",
            path.to_str().unwrap(),
            "--layout",
            "mce-kodi",
            "--output",
            "/dev/hidg1",
            "--check-config",
        ]);
        let app = Application::new(args).unwrap();
        assert_eq!(app.config.layout, Some(Layout::MceKodi));
        assert_eq!(app.config.output_device, PathBuf::from("/dev/hidg1"));
        assert_eq!(app.keymap.name(), "mce-kodi");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_application_rejects_empty_keymap() {
        let path = std::env::temp_dir().join(format!("irkbd-empty-{}.toml", std::process::id()));
        std::fs::write(&path, "layout = \"none\"\n").unwrap();

        let args = Args::parse_from(["irkbd", "--config", path.to_str().unwrap()]);
        assert!(Application::new(args).is_err());
        let _ = std::fs::remove_file(&path);
    }
}
