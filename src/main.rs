fn main() {
    if let Err(err) = salescope::run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
