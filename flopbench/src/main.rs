fn main() {
    if let Err(e) = flopbench::run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
