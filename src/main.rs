use std::{path::PathBuf, process};

use clap::{Parser, ValueEnum};
use emu8::{
    chip8::ChipSet,
    definitions::{cpu, keyboard},
    devices::{DisplayCommands, KeyboardCommands},
    quirks::Quirks,
    resources::Rom,
};

/// Headless CHIP-8 runner, prints the machine state once done
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Filepath to the CHIP-8 ROM that will be executed
    #[clap(index = 1)]
    rom: PathBuf,

    /// Frames to run, each one is 8 cycles and a timer tick
    #[clap(short, long, default_value_t = 60)]
    frames: usize,

    /// Behavior variant of the interpreter
    #[clap(short, long, value_enum, default_value_t = Preset::Default)]
    quirks: Preset,

    /// PRNG seed
    #[clap(long)]
    seed: Option<u64>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Preset {
    Default,
    Cosmac,
    SuperChip,
}

impl From<Preset> for Quirks {
    fn from(preset: Preset) -> Self {
        match preset {
            Preset::Default => Quirks::default(),
            Preset::Cosmac => Quirks::cosmac(),
            Preset::SuperChip => Quirks::super_chip(),
        }
    }
}

/// Nothing is rendered, the final state gets printed instead.
struct Headless {
    frames_drawn: usize,
}

impl DisplayCommands for Headless {
    fn clear_display(&mut self) {
        self.frames_drawn += 1;
    }

    fn display(&mut self, _pixels: &[Vec<bool>]) {
        self.frames_drawn += 1;
    }
}

/// A keypad nobody touches.
struct Released([bool; keyboard::SIZE]);

impl KeyboardCommands for Released {
    fn get_keyboard(&self) -> &[bool] {
        &self.0
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let rom = match Rom::from_path(&args.rom) {
        Ok(rom) => rom,
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    };

    let quirks = Quirks::from(args.quirks);
    let mut chip = match args.seed {
        Some(seed) => ChipSet::with_seed(rom, quirks, seed),
        None => ChipSet::with_quirks(rom, quirks),
    };
    log::info!("Running '{}' with {:?}", chip.name(), quirks);

    let mut display = Headless { frames_drawn: 0 };
    let keyboard = Released([false; keyboard::SIZE]);

    for frame in 0..args.frames {
        if let Err(err) = emu8::run_frame(&mut chip, &mut display, &keyboard, cpu::CYCLES_PER_FRAME) {
            log::error!("Halted in frame {}: {}", frame, err);
            println!("{}", chip);
            eprintln!("{}", err);
            process::exit(1);
        }
    }

    log::info!("Ran {} frames, {} of them touched the screen.", args.frames, display.frames_drawn);
    println!("{}", chip);
}
