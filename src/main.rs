fn main() {
    if let Err(err) = channel_insights::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
