fn main() {
    if let Err(err) = slangit::cli::main() {
        eprintln!("❌ Error: {err}");
        std::process::exit(1);
    }
}
