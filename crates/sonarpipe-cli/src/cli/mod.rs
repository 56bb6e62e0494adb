use clap::{Parser, Subcommand};

mod args;
mod parsers;


pub use args::{
    GlobalArgs, ProvisionArgs, ProvisionTargetArgs, ReportArgs, ReportOutputArgs, RunArgs,
    ScanArgs, ScanTargetArgs, WaitArgs,
};

#[derive(Debug, Parser)]
#[command(name = "sonarpipe")]
#[command(
    about = "Wait for, provision, scan and report on a local code-quality service",
    version
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Poll the service until it reports UP.
    Wait(WaitArgs),
    /// Wait, then ensure the project and token exist and store the token.
    Provision(ProvisionArgs),
    /// Run the scanner against the project directory.
    Scan(ScanArgs),
    /// Aggregate the latest analysis into JSON and HTML reports.
    Report(ReportArgs),
    /// Full pipeline: wait, provision, scan, report.
    Run(RunArgs),
}
