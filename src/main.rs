fn main() {
    if let Err(err) = ingest::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
