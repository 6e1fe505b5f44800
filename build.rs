fn main() {
    // Host builds run with `--no-default-features` and have no ESP-IDF sysenv.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
