use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "rahp", version, about = "Inspect AmigaDOS hunk-format executables")]
pub struct Args {
    #[arg(long = "verbose", short = 'v')]
    pub verbose: bool,

    #[arg(long = "quiet", short = 'z')]
    pub quiet: bool,

    #[arg(value_name = "INPUT")]
    pub inputs: Vec<String>,
}
