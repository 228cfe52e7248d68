use blockgate_cli::Args;
use clap::Parser;

fn main() {
    let args = Args::parse();

    if let Err(err) = blockgate_cli::tracing_builder(&args).build() {
        eprintln!("unable to set up tracing: {err}");
        std::process::exit(1);
    }

    match blockgate_cli::run(&args) {
        Ok(transcript) => print!("{transcript}"),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}
