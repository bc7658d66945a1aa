fn main() {
    if let Err(err) = notty::cli::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
