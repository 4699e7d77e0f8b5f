use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use engine::{Collision, Config, DEFAULT_BOUNDARY_WINDOW, DEFAULT_CAPACITY};

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "measurements.txt")]
    name: String,

    #[arg(long, default_value = "./data")]
    data_dir: PathBuf,

    /// Worker threads, one partition each. Defaults to the hardware thread count.
    #[arg(long)]
    workers: Option<usize>,

    /// Slots per worker key table.
    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    capacity: usize,

    /// Fail on two keys sharing a slot instead of probing past it.
    #[arg(long)]
    strict_keys: bool,

    #[arg(long, default_value_t = DEFAULT_BOUNDARY_WINDOW)]
    boundary_window: usize,

    /// Write a flamegraph SVG of the run's CPU profile to this path.
    #[arg(long, default_value = "")]
    cpuprofile: String,
}

impl Args {
    fn config(&self) -> Config {
        let mut config = Config::default()
            .with_capacity(self.capacity)
            .with_boundary_window(self.boundary_window);
        if let Some(workers) = self.workers {
            config = config.with_workers(workers);
        }
        if self.strict_keys {
            config = config.with_collision(Collision::Reject);
        }
        config
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.name.is_empty() {
        bail!("Filename param is missing");
    }

    let input_path = args.data_dir.join(&args.name);
    let config = args.config();
    log::debug!("{config:?}");

    let profiler = if args.cpuprofile.is_empty() {
        None
    } else {
        Some(pprof::ProfilerGuard::new(1000).context("starting the CPU profiler")?)
    };

    let out = engine::solve(&input_path, &config)
        .with_context(|| format!("aggregating {}", input_path.display()))?;
    let mut stdout = io::stdout().lock();
    stdout.write_all(&out).context("writing the report")?;
    stdout.flush().context("writing the report")?;

    if let Some(guard) = profiler {
        write_flamegraph(&guard, Path::new(&args.cpuprofile))?;
        log::info!("CPU profile written to {}", args.cpuprofile);
    }

    Ok(())
}

fn write_flamegraph(guard: &pprof::ProfilerGuard<'_>, path: &Path) -> Result<()> {
    let report = guard.report().build().context("building the CPU profile")?;
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    report
        .flamegraph(&mut out)
        .with_context(|| format!("writing {}", path.display()))?;
    out.flush()
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::hint::black_box;
    use std::time::{Duration, Instant};

    #[test]
    fn flags_map_to_config() {
        let args = Args::try_parse_from([
            "stationstats",
            "--workers",
            "3",
            "--capacity",
            "128",
            "--strict-keys",
        ])
        .unwrap();
        let config = args.config();
        assert_eq!(3, config.workers);
        assert_eq!(128, config.capacity);
        assert_eq!(Collision::Reject, config.collision);
        assert_eq!(DEFAULT_BOUNDARY_WINDOW, config.boundary_window);
    }

    #[test]
    fn cpu_profile_is_a_flamegraph() {
        let path = std::env::temp_dir().join(format!("stationstats-{}.svg", std::process::id()));
        let guard = pprof::ProfilerGuard::new(1000).unwrap();
        let deadline = Instant::now() + Duration::from_millis(300);
        let mut acc = 0u64;
        while Instant::now() < deadline {
            for i in 0..10_000u64 {
                acc = black_box(acc.wrapping_mul(31).wrapping_add(i));
            }
        }
        black_box(acc);

        write_flamegraph(&guard, &path).unwrap();
        let svg = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert!(svg.contains("<svg"), "not an svg: {}", &svg[..svg.len().min(200)]);
    }
}
