use {
    clap::Parser,
    env_logger::Env,
    limitwatch::{cli::Cli, run},
    log::error,
    std::process::exit,
};

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        error!("{:#}", e);
        eprintln!("Error: {e:#}");
        exit(1);
    }
}
