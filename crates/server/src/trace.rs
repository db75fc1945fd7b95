use std::io::Write;

use anyhow::{ensure, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;
use sim::{FuelRod, Reactor, ReactorConfig, ReactorState};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Scenario {
    /// Defaults, auto-control tracking the grid.
    Normal,
    /// SCRAM at 30% of the run.
    Scram,
    /// Auto-control off, fixed fission and turbine.
    Manual,
    /// Nearly spent rod at full fission; refuel at 70% of the run.
    FuelOut,
}

#[derive(Args, Debug)]
pub struct TraceArgs {
    #[arg(value_enum, long, default_value = "normal")]
    pub scenario: Scenario,

    /// Total simulated time in seconds
    #[arg(long, default_value_t = 60.0)]
    pub seconds: f64,

    /// Simulated seconds per tick
    #[arg(long, default_value_t = 0.2)]
    pub dt: f64,

    /// RNG seed for deterministic runs
    #[arg(long, default_value_t = 12345)]
    pub seed: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TraceRow {
    t_s: f64,
    #[serde(flatten)]
    state: ReactorState,
}

/// Run the model headless and write one JSON line per tick.
pub fn run(args: &TraceArgs, out: &mut impl Write) -> Result<()> {
    ensure!(args.dt > 0.0 && args.dt.is_finite(), "dt must be positive");
    ensure!(
        args.seconds >= 0.0 && args.seconds.is_finite(),
        "seconds must be a finite non-negative number"
    );

    let steps = (args.seconds / args.dt).ceil() as u64;
    let reactor = build(args)?;

    let scram_at = (steps as f64 * 0.3) as u64;
    let refuel_at = (steps as f64 * 0.7) as u64;

    for k in 0..steps {
        match args.scenario {
            Scenario::Scram if k == scram_at => reactor.scram(),
            Scenario::FuelOut if k == refuel_at => reactor.refuel(),
            _ => {}
        }

        reactor.advance(args.dt);

        let row = TraceRow {
            t_s: (k + 1) as f64 * args.dt,
            state: reactor.snapshot(),
        };
        serde_json::to_writer(&mut *out, &row)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

fn build(args: &TraceArgs) -> Result<Reactor> {
    let cfg = ReactorConfig::with_seed(args.seed);
    let mut state = ReactorState::balanced(&cfg.params, cfg.grid.initial_load);

    match args.scenario {
        Scenario::Normal | Scenario::Scram => {}
        Scenario::Manual => {
            state.is_auto_control = false;
            state.fission_rate = 40.0;
            state.turbine_output = 60.0;
        }
        Scenario::FuelOut => {
            state.is_auto_control = false;
            state.fission_rate = 100.0;
            state.fuel_rod = Some(FuelRod { condition: 1.0 });
        }
    }

    Ok(Reactor::from_state(cfg, state)?)
}
