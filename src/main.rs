fn main() {
    if let Err(err) = kinchart::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
