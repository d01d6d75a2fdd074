use failure::{format_err, Error};
use serde::Deserialize;
use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;
use std::path::PathBuf;
use structopt::StructOpt;

use prince_of_persia::{Game, RawInput};

/// Headless driver: load a level image and an input recording, tick the
/// simulation, and dump the end state as JSON.
#[derive(StructOpt, Debug)]
#[structopt(name = "replay")]
struct Opt {
    /// Level file (2,304 byte image).
    #[structopt(long, parse(from_os_str))]
    level: PathBuf,

    /// Which level number the file is.
    #[structopt(long, default_value = "1")]
    level_num: u8,

    /// JSON recording: an array of per-tick {x, y, btn} records.
    /// Missing means the stick stays centered.
    #[structopt(long, parse(from_os_str))]
    input: Option<PathBuf>,

    /// Ticks to simulate; a recording shorter than this idles out the
    /// remainder.
    #[structopt(long, default_value = "720")]
    ticks: usize,

    /// Run the recording twice from scratch and insist on bit-identical
    /// end states.
    #[structopt(long)]
    verify: bool,
}

#[derive(Clone, Copy, Debug, Deserialize)]
struct Step {
    #[serde(default)]
    x: i16,
    #[serde(default)]
    y: i16,
    #[serde(default)]
    btn: bool,
}

fn load_level(path: &PathBuf) -> Result<Vec<u8>, Error> {
    let mut f = File::open(path)?;
    let mut buffer = Vec::new();
    // read the whole file
    f.read_to_end(&mut buffer)?;
    Ok(buffer)
}

fn load_recording(path: &PathBuf) -> Result<Vec<Step>, Error> {
    let f = File::open(path)?;
    let steps: Vec<Step> = serde_json::from_reader(BufReader::new(f))?;
    Ok(steps)
}

fn run(level_data: &[u8], level_num: u8, steps: &[Step], ticks: usize) -> Result<String, Error> {
    let mut game = Game::new(level_data, level_num)?;
    for i in 0..ticks {
        let raw = match steps.get(i) {
            Some(step) => RawInput {
                x: step.x.signum(),
                y: step.y.signum(),
                btn: step.btn,
            },
            None => RawInput::default(),
        };
        let result = game.tick(raw);
        if let Some(next) = result.pending_level {
            log::info!("level {} finished at tick {}", next - 1, i);
            break;
        }
        if result.won {
            log::info!("won at tick {}", i);
            break;
        }
    }
    Ok(serde_json::to_string_pretty(&game.snapshot())?)
}

fn main() -> Result<(), Error> {
    env_logger::init();
    let opt = Opt::from_args();

    let level_data = load_level(&opt.level)?;
    let steps = match &opt.input {
        Some(path) => load_recording(path)?,
        None => Vec::new(),
    };

    let state = run(&level_data, opt.level_num, &steps, opt.ticks)?;
    if opt.verify {
        let again = run(&level_data, opt.level_num, &steps, opt.ticks)?;
        if state != again {
            return Err(format_err!("replay diverged between runs"));
        }
        log::info!("replay verified over {} ticks", opt.ticks);
    }

    println!("{}", state);
    Ok(())
}
