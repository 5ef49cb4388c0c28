/*!
 * Simulator - Demo Driver
 *
 * Non-interactive driver for the fixed-partition kernel:
 * - generates a random process workload
 * - advances the simulated clock tick by tick
 * - logs the memory map, process table, and scheduler state periodically
 * - dumps final statistics as JSON
 *
 * Configuration is taken from the environment:
 *   SIM_PROCESSES  number of processes to generate (default 5)
 *   SIM_POLICY     fifo | round_robin | priority   (default round_robin)
 *   SIM_STRATEGY   first_fit | best_fit | worst_fit (default best_fit)
 *   SIM_MAX_TICKS  safety cap on simulation length  (default 200)
 *   SIM_SEED       RNG seed for a reproducible workload
 */

use std::error::Error;

use log::info;
use partition_kernel::{FitStrategy, Kernel, KernelConfig, SchedulingPolicy};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const STATUS_INTERVAL: u64 = 5;

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = KernelConfig::default();
    if let Ok(policy) = std::env::var("SIM_POLICY") {
        config.policy = SchedulingPolicy::parse(&policy)?;
    }
    if let Ok(strategy) = std::env::var("SIM_STRATEGY") {
        config.fit_strategy = FitStrategy::parse(&strategy)?;
    }

    let process_count = env_u64("SIM_PROCESSES", 5) as usize;
    let max_ticks = env_u64("SIM_MAX_TICKS", 200);

    info!("Fixed-partition kernel simulator starting");
    info!(
        "policy={} strategy={} processes={}",
        config.policy.as_str(),
        config.fit_strategy.as_str(),
        process_count
    );

    let mut kernel = Kernel::new(config)?;

    let mut rng = match std::env::var("SIM_SEED") {
        Ok(seed) => StdRng::seed_from_u64(seed.parse()?),
        Err(_) => StdRng::from_entropy(),
    };

    for i in 1..=process_count {
        let name = format!("auto-{}", i);
        let memory_size = rng.gen_range(32..160);
        let burst_time = rng.gen_range(1..=10);
        let arrival_time = rng.gen_range(0..5);
        let pid = kernel.create_process(&name, memory_size, burst_time, arrival_time)?;
        info!(
            "Generated {} PID={} memory={} burst={} arrival={}",
            name, pid, memory_size, burst_time, arrival_time
        );
    }

    while !kernel.is_idle() && kernel.now() < max_ticks {
        let now = kernel.tick();
        if now % STATUS_INTERVAL == 0 {
            print_status(&kernel);
        }
    }

    print_status(&kernel);
    info!("Simulation finished at tick {}", kernel.now());

    println!(
        "{}",
        serde_json::to_string_pretty(&kernel.memory_stats())?
    );

    Ok(())
}

fn print_status(kernel: &Kernel) {
    info!("--- Tick {} ---", kernel.now());

    info!("Memory map:");
    for p in kernel.list_partitions() {
        info!(
            "  0x{:04x}-0x{:04x} {:>4}B {:>10} owner={}",
            p.start,
            p.end,
            p.size,
            format!("{:?}", p.state),
            p.owner_pid.map_or("-".into(), |pid| pid.to_string()),
        );
    }

    info!("Processes:");
    for p in kernel.list_processes() {
        info!(
            "  PID={} {:<10} {:?} mem={} remaining={}/{} arrival={}",
            p.pid, p.name, p.state, p.memory_size, p.remaining_time, p.burst_time, p.arrival_time
        );
    }

    let sched = kernel.scheduler_status();
    info!(
        "Scheduler: policy={} ready={:?} current={:?} quantum={}/{}",
        sched.policy.as_str(),
        sched.ready_pids,
        sched.current,
        sched.remaining_quantum,
        sched.quantum
    );

    let stats = kernel.memory_stats();
    info!(
        "Memory: free={}B ({:.1}%) used={}B ({:.1}%) largest_free={}B fragmentation={:.1}%",
        stats.total_free,
        stats.free_pct,
        stats.used_bytes,
        stats.used_pct,
        stats.largest_free_block,
        stats.external_fragmentation_pct
    );
}
