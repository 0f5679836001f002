fn main() {
    cloud_path_pipeline::cli::run();
}
