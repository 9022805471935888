fn main() {
    if let Err(err) = labdesk::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
