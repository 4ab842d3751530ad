use clap::Parser;

fn main() {
    let args = rahp::cli::Args::parse();
    if let Err(err) = rahp::run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
