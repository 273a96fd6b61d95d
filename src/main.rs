fn main() {
    if let Err(err) = timeline_declutter::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
