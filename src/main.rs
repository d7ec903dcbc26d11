use clap::Parser;
use tokio_util::sync::CancellationToken;

pub mod config;
pub mod error;
pub mod gate;
pub mod probe;

use config::app_config::{Cli, GatePlan, load_plans};
use error::GateError;
use gate::gate::ReadinessGate;
use probe::ServiceProbe;

const EXIT_USAGE: i32 = 64;

fn usage_error(err: GateError) -> ! {
    eprintln!("readygate: {err}");
    std::process::exit(EXIT_USAGE);
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let plans = match load_plans(&cli) {
        Ok(plans) => plans,
        Err(err) => usage_error(err),
    };

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::warn!("interrupt received, aborting wait");
                cancel.cancel();
            }
        });
    }

    for plan in plans {
        let outcome = run_gate(&plan, &cancel).await;
        println!("[{}] {outcome}", plan.label);
        if !outcome.is_ready() {
            std::process::exit(outcome.exit_code());
        }
    }
}

async fn run_gate(plan: &GatePlan, cancel: &CancellationToken) -> gate::outcome::Outcome {
    let gate = match ReadinessGate::new(plan.endpoint.clone(), plan.policy.clone()) {
        Ok(gate) => gate.with_label(plan.label.clone()),
        Err(err) => usage_error(err),
    };
    let probe = match ServiceProbe::for_endpoint(
        &plan.endpoint,
        plan.policy.probe_timeout,
        plan.accepted_status_codes.clone(),
    ) {
        Ok(probe) => probe,
        Err(err) => usage_error(err),
    };
    gate.wait(&probe, cancel).await
}
