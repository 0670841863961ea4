fn main() {
    lor_consistency::cli::run();
}
