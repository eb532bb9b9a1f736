fn main() {
    if let Err(err) = pseudoflow::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
