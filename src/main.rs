fn main() {
    if let Err(err) = ringchart::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
