fn main() {
    if let Err(err) = cropscope_lib::run() {
        eprintln!("cropscope: {err:#}");
        std::process::exit(1);
    }
}
